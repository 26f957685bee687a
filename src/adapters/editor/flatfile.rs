use std::path::PathBuf;

use super::AccountEditor;
use crate::fs::db::{load_group_db, load_passwd_db, store};
use crate::types::errors::{Error, ErrorKind, Result};

/// Rewrites the flat files directly: parse into records, change the one GID
/// field, write back atomically. Used when `groupmod` is unavailable or the
/// databases live under an alternate root.
#[derive(Clone, Debug)]
pub struct FlatFileEditor {
    group_db: PathBuf,
    passwd_db: PathBuf,
}

impl FlatFileEditor {
    #[must_use]
    pub fn new(group_db: PathBuf, passwd_db: PathBuf) -> Self {
        Self {
            group_db,
            passwd_db,
        }
    }
}

impl AccountEditor for FlatFileEditor {
    fn label(&self) -> &'static str {
        "flatfile"
    }

    fn retarget(&self, group: &str, source: u32, target: u32) -> Result<()> {
        let mut groups = load_group_db(&self.group_db)?;
        let rec = groups.find_mut(group).ok_or_else(|| {
            Error::new(
                ErrorKind::Policy,
                format!("group '{group}' not in {}", self.group_db.display()),
            )
        })?;
        if rec.gid() != Some(source) {
            return Err(Error::new(
                ErrorKind::Policy,
                format!(
                    "group '{group}' has gid '{}', expected {source}",
                    rec.gid_raw()
                ),
            ));
        }
        rec.set_gid(target);
        // Read users before writing anything so a bad passwd file fails first.
        let mut users = load_passwd_db(&self.passwd_db)?;
        store(&self.group_db, &groups)?;
        if !users.retarget_primary(source, target).is_empty() {
            store(&self.passwd_db, &users)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUPS: &str = "root:x:0:\nsv_admin:x:1000:alice\nsv_web:x:1001:\n";
    const USERS: &str = "root:x:0:0:root:/root:/bin/bash\nalice:x:1000:1000:Alice:/srv/1000:/bin/sh\nbob:x:1001:1001::/home/bob:/bin/sh\n";

    fn fixture() -> (tempfile::TempDir, FlatFileEditor) {
        let td = tempfile::tempdir().unwrap();
        let g = td.path().join("group");
        let p = td.path().join("passwd");
        std::fs::write(&g, GROUPS).unwrap();
        std::fs::write(&p, USERS).unwrap();
        (td, FlatFileEditor::new(g, p))
    }

    #[test]
    fn rewrites_group_and_primary_gids_only() {
        let (td, ed) = fixture();
        ed.retarget("sv_admin", 1000, 197).unwrap();
        assert_eq!(
            std::fs::read_to_string(td.path().join("group")).unwrap(),
            "root:x:0:\nsv_admin:x:197:alice\nsv_web:x:1001:\n"
        );
        assert_eq!(
            std::fs::read_to_string(td.path().join("passwd")).unwrap(),
            "root:x:0:0:root:/root:/bin/bash\nalice:x:1000:197:Alice:/srv/1000:/bin/sh\nbob:x:1001:1001::/home/bob:/bin/sh\n"
        );
    }

    #[test]
    fn stale_source_changes_nothing() {
        let (td, ed) = fixture();
        let err = ed.retarget("sv_admin", 999, 197).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Policy);
        assert_eq!(std::fs::read_to_string(td.path().join("group")).unwrap(), GROUPS);
        assert_eq!(std::fs::read_to_string(td.path().join("passwd")).unwrap(), USERS);
    }

    #[test]
    fn unknown_group_changes_nothing() {
        let (td, ed) = fixture();
        assert!(ed.retarget("sv_missing", 1000, 197).is_err());
        assert_eq!(std::fs::read_to_string(td.path().join("group")).unwrap(), GROUPS);
    }
}
