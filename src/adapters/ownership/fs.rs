// Default ownership adapters backed by lstat/lchown.

use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use super::{GroupChanger, OwnershipOracle};
use crate::types::errors::{Error, Result};
use crate::types::OwnershipInfo;

#[derive(Copy, Clone, Debug, Default)]
pub struct FsOwnership;

impl OwnershipOracle for FsOwnership {
    fn owner_of(&self, path: &Path) -> Result<OwnershipInfo> {
        let md = std::fs::symlink_metadata(path)
            .map_err(|e| Error::io(&format!("lstat {}", path.display()), &e))?;
        Ok(OwnershipInfo {
            uid: md.uid(),
            gid: md.gid(),
        })
    }
}

const SETID_BITS: u32 = 0o6000;

impl GroupChanger for FsOwnership {
    /// The kernel clears setuid/setgid on a chown of a non-directory, even for
    /// root; those bits are put back so only the group changes.
    fn set_group(&self, path: &Path, gid: u32) -> Result<()> {
        let before = std::fs::symlink_metadata(path)
            .map_err(|e| Error::io(&format!("lstat {}", path.display()), &e))?;
        std::os::unix::fs::lchown(path, None, Some(gid))
            .map_err(|e| Error::io(&format!("lchown {}", path.display()), &e))?;
        let mode = before.mode() & 0o7777;
        if before.file_type().is_symlink() || mode & SETID_BITS == 0 {
            return Ok(());
        }
        let after = std::fs::symlink_metadata(path)
            .map_err(|e| Error::io(&format!("lstat {}", path.display()), &e))?;
        if after.mode() & 0o7777 != mode {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
                .map_err(|e| Error::io(&format!("chmod {}", path.display()), &e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_link_itself_and_regroups_to_current_gid() {
        let td = tempfile::tempdir().unwrap();
        let f = td.path().join("f");
        let l = td.path().join("l");
        std::fs::write(&f, b"x").unwrap();
        std::os::unix::fs::symlink("/nonexistent", &l).unwrap();

        let info = FsOwnership.owner_of(&l).unwrap();
        let md = std::fs::symlink_metadata(&l).unwrap();
        assert_eq!((info.uid, info.gid), (md.uid(), md.gid()));

        // Re-grouping to the entry's current group is always permitted for its owner.
        let gid = FsOwnership.owner_of(&f).unwrap().gid;
        FsOwnership.set_group(&f, gid).unwrap();
        FsOwnership.set_group(&l, gid).unwrap();
        assert_eq!(FsOwnership.owner_of(&f).unwrap().gid, gid);
    }

    #[test]
    fn setgid_bit_survives_regroup() {
        let td = tempfile::tempdir().unwrap();
        let f = td.path().join("helper");
        std::fs::write(&f, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&f, std::fs::Permissions::from_mode(0o2755)).unwrap();
        if std::fs::metadata(&f).unwrap().mode() & 0o7777 != 0o2755 {
            // The filesystem refused setgid for this user's group.
            return;
        }
        let gid = FsOwnership.owner_of(&f).unwrap().gid;
        FsOwnership.set_group(&f, gid).unwrap();
        assert_eq!(std::fs::metadata(&f).unwrap().mode() & 0o7777, 0o2755);
    }

    #[test]
    fn setid_bits_survive_move_to_new_group_as_root() {
        if !rustix::process::geteuid().is_root() {
            return;
        }
        let td = tempfile::tempdir().unwrap();
        let f = td.path().join("helper");
        std::fs::write(&f, b"x").unwrap();
        std::os::unix::fs::lchown(&f, None, Some(1000)).unwrap();
        std::fs::set_permissions(&f, std::fs::Permissions::from_mode(0o6755)).unwrap();

        FsOwnership.set_group(&f, 197).unwrap();
        let md = std::fs::metadata(&f).unwrap();
        assert_eq!(md.gid(), 197);
        assert_eq!(md.mode() & 0o7777, 0o6755);
    }

    #[test]
    fn missing_entry_is_an_error() {
        assert!(FsOwnership.owner_of(Path::new("/nonexistent/entry")).is_err());
        assert!(FsOwnership.set_group(Path::new("/nonexistent/entry"), 0).is_err());
    }
}
