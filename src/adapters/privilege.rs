use crate::types::errors::{Error, ErrorKind, Result};

/// Fail unless the process runs with an effective UID of 0.
/// # Errors
/// Returns a `Policy` error naming the effective UID otherwise.
pub fn ensure_root() -> Result<()> {
    let euid = rustix::process::geteuid();
    if euid.is_root() {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::Policy,
            format!("must run as root (effective uid {})", euid.as_raw()),
        ))
    }
}
