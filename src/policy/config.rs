use std::path::Path;

use crate::constants::DEFAULT_LOCK_TIMEOUT_MS;

use super::types::{EditorPreference, NameServiceSource, Paths, SweepPolicy};

/// Policy governs where gidremap reads and writes and which collaborators it picks.
///
/// Built in code; there is no configuration file.
#[derive(Clone, Debug)]
pub struct Policy {
    pub paths: Paths,
    pub sweep: SweepPolicy,
    pub editor: EditorPreference,
    pub name_service: NameServiceSource,
    /// Refuse to run without an effective UID of 0.
    pub require_root: bool,
    pub lock_timeout_ms: u64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            paths: Paths::default(),
            sweep: SweepPolicy::default(),
            editor: EditorPreference::Auto,
            name_service: NameServiceSource::System,
            require_root: true,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

impl Policy {
    /// Policy for a system image mounted at `root` (like `groupmod -R`).
    ///
    /// Every path is rebased under `root`, names resolve from `root/etc/group`
    /// only, and the flat-file editor is used.
    #[must_use]
    pub fn for_root(root: &Path) -> Self {
        let rebase = |p: &str| root.join(p.trim_start_matches('/'));
        let defaults = Paths::default();
        Self {
            paths: Paths {
                group_db: rebase(&defaults.group_db.to_string_lossy()),
                passwd_db: rebase(&defaults.passwd_db.to_string_lossy()),
                marker_dir: rebase(&defaults.marker_dir.to_string_lossy()),
                lock_file: defaults
                    .lock_file
                    .map(|p| rebase(&p.to_string_lossy())),
            },
            sweep: SweepPolicy {
                root: root.to_path_buf(),
                one_filesystem: true,
            },
            editor: EditorPreference::FlatFile,
            name_service: NameServiceSource::FlatFile,
            ..Self::default()
        }
    }
}
