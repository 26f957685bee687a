//! Loading and storing the local flat-file account databases.
use std::path::Path;

use crate::fs::atomic::replace_preserving;
use crate::types::errors::{Error, ErrorKind, Result};
use crate::types::records::{AccountFile, GroupDb, PasswdDb, Record};

fn load<R: Record>(path: &Path) -> Result<AccountFile<R>> {
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => Error::new(
            ErrorKind::Parse,
            format!("{}: not valid UTF-8", path.display()),
        ),
        _ => Error::io(&format!("read {}", path.display()), &e),
    })?;
    Ok(AccountFile::parse(&text))
}

/// Read and parse the group database at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not UTF-8.
pub fn load_group_db(path: &Path) -> Result<GroupDb> {
    load(path)
}

/// Read and parse the user database at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not UTF-8.
pub fn load_passwd_db(path: &Path) -> Result<PasswdDb> {
    load(path)
}

/// Atomically write `db` back to `path`, keeping the file's mode and owner.
///
/// # Errors
///
/// Returns an error if the replacement cannot be staged or renamed into place.
pub fn store<R: Record>(path: &Path, db: &AccountFile<R>) -> Result<()> {
    replace_preserving(path, db.render().as_bytes())
        .map_err(|e| Error::io(&format!("write {}", path.display()), &e))
}
