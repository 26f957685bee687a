use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::AccountEditor;
use crate::constants::GROUPMOD_CANDIDATES;
use crate::types::errors::{Error, ErrorKind, Result};

/// Delegates to shadow-utils `groupmod -g`, which rewrites `/etc/group` and the
/// primary GID of affected `/etc/passwd` entries under its own locking.
#[derive(Clone, Debug)]
pub struct GroupmodEditor {
    program: PathBuf,
}

fn is_executable(p: &Path) -> bool {
    std::fs::metadata(p)
        .map(|md| md.is_file() && md.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

impl GroupmodEditor {
    #[must_use]
    pub fn with_program(program: PathBuf) -> Self {
        Self { program }
    }

    /// First executable `groupmod` among the well-known locations.
    #[must_use]
    pub fn probe() -> Option<Self> {
        GROUPMOD_CANDIDATES
            .iter()
            .map(Path::new)
            .find(|p| is_executable(p))
            .map(|p| Self::with_program(p.to_path_buf()))
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl AccountEditor for GroupmodEditor {
    fn label(&self) -> &'static str {
        "groupmod"
    }

    fn retarget(&self, group: &str, _source: u32, target: u32) -> Result<()> {
        let out = Command::new(&self.program)
            .arg("-g")
            .arg(target.to_string())
            .arg("--")
            .arg(group)
            .output()
            .map_err(|e| {
                Error::new(
                    ErrorKind::Command,
                    format!("spawn {}: {e}", self.program.display()),
                )
            })?;
        if out.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&out.stderr);
        Err(Error::new(
            ErrorKind::Command,
            format!(
                "{} -g {target} {group} failed ({}): {}",
                self.program.display(),
                out.status,
                stderr.trim()
            ),
        ))
    }
}
