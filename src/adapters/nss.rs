//! Name-service group lookups.
//!
//! `NssNameService` asks the system resolver (files, LDAP, sssd, ... per
//! nsswitch.conf). `FlatFileNameService` answers from one group file and is
//! used when operating on an alternate root, and in tests.
use std::path::PathBuf;

use nix::unistd::{Gid, Group};

use crate::fs::db::load_group_db;
use crate::types::errors::{Error, ErrorKind, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupEntry {
    pub name: String,
    pub gid: u32,
}

pub trait NameService: Send + Sync {
    /// Look a group up by name.
    /// # Errors
    /// Returns an error if the name-service itself fails; an unknown group is `Ok(None)`.
    fn group_by_name(&self, name: &str) -> Result<Option<GroupEntry>>;

    /// Look a group up by GID.
    /// # Errors
    /// Returns an error if the name-service itself fails; an unused GID is `Ok(None)`.
    fn group_by_gid(&self, gid: u32) -> Result<Option<GroupEntry>>;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct NssNameService;

fn nss_err(what: &str, e: nix::Error) -> Error {
    Error::new(ErrorKind::Io, format!("{what}: {e}"))
}

impl NameService for NssNameService {
    fn group_by_name(&self, name: &str) -> Result<Option<GroupEntry>> {
        let g = Group::from_name(name).map_err(|e| nss_err("getgrnam", e))?;
        Ok(g.map(|g| GroupEntry {
            name: g.name,
            gid: g.gid.as_raw(),
        }))
    }

    fn group_by_gid(&self, gid: u32) -> Result<Option<GroupEntry>> {
        let g = Group::from_gid(Gid::from_raw(gid)).map_err(|e| nss_err("getgrgid", e))?;
        Ok(g.map(|g| GroupEntry {
            name: g.name,
            gid: g.gid.as_raw(),
        }))
    }
}

/// Answers from a group file, re-read on every call so edits are visible immediately.
#[derive(Clone, Debug)]
pub struct FlatFileNameService {
    path: PathBuf,
}

impl FlatFileNameService {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl NameService for FlatFileNameService {
    fn group_by_name(&self, name: &str) -> Result<Option<GroupEntry>> {
        let db = load_group_db(&self.path)?;
        Ok(db.find(name).and_then(|r| {
            r.gid().map(|gid| GroupEntry {
                name: r.name.clone(),
                gid,
            })
        }))
    }

    fn group_by_gid(&self, gid: u32) -> Result<Option<GroupEntry>> {
        let db = load_group_db(&self.path)?;
        Ok(db.holders_of(gid).first().map(|name| GroupEntry {
            name: (*name).to_string(),
            gid,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_file_lookups() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("group");
        std::fs::write(&p, "root:x:0:\nsv_admin:x:1000:alice\nbad:x::\n").unwrap();
        let ns = FlatFileNameService::new(p.clone());

        assert_eq!(
            ns.group_by_name("sv_admin").unwrap(),
            Some(GroupEntry { name: "sv_admin".into(), gid: 1000 })
        );
        assert_eq!(ns.group_by_name("nobody").unwrap(), None);
        assert_eq!(ns.group_by_name("bad").unwrap(), None);
        assert_eq!(ns.group_by_gid(0).unwrap().map(|g| g.name), Some("root".to_string()));
        assert_eq!(ns.group_by_gid(197).unwrap(), None);

        std::fs::write(&p, "root:x:0:\nsv_admin:x:197:alice\n").unwrap();
        assert_eq!(ns.group_by_name("sv_admin").unwrap().map(|g| g.gid), Some(197));
    }

    #[test]
    fn flat_file_missing_is_an_error() {
        let ns = FlatFileNameService::new(PathBuf::from("/nonexistent/etc/group"));
        assert!(ns.group_by_name("x").is_err());
    }

    #[test]
    fn nss_resolves_gid_zero() {
        // Every Linux system maps GID 0; the name varies (root, wheel).
        let g = NssNameService.group_by_gid(0).unwrap();
        assert!(g.is_some());
    }
}
