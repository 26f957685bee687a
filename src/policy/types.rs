use std::path::PathBuf;

use crate::constants::{GROUP_DB, LOCK_FILE, MARKER_DIR, PASSWD_DB};

/// Which account editor to use; see `adapters::editor::select_editor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EditorPreference {
    #[default]
    Auto,
    Groupmod,
    FlatFile,
}

/// Where group names are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NameServiceSource {
    /// The system resolver (nsswitch).
    #[default]
    System,
    /// The configured group database file only.
    FlatFile,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paths {
    pub group_db: PathBuf,
    pub passwd_db: PathBuf,
    pub marker_dir: PathBuf,
    /// `None` disables the process lock.
    pub lock_file: Option<PathBuf>,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            group_db: PathBuf::from(GROUP_DB),
            passwd_db: PathBuf::from(PASSWD_DB),
            marker_dir: PathBuf::from(MARKER_DIR),
            lock_file: Some(PathBuf::from(LOCK_FILE)),
        }
    }
}

impl Paths {
    /// True when both account databases are the live system files.
    #[must_use]
    pub fn is_system_default(&self) -> bool {
        self.group_db.as_os_str() == GROUP_DB && self.passwd_db.as_os_str() == PASSWD_DB
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepPolicy {
    pub root: PathBuf,
    /// Stay on the root's device.
    pub one_filesystem: bool,
}

impl Default for SweepPolicy {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            one_filesystem: true,
        }
    }
}
