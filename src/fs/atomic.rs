//! Atomic file replacement for the account databases and marker records.
//!
//! Sequence: temp file in the target's directory → copy mode/owner → fsync →
//! rename over the target → fsync(parent). A reader of the database sees either
//! the old or the new content, never a partial write.
use std::fs;
use std::io::Write;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use crate::constants::TMP_SUFFIX;

/// Fsync the parent directory of `path` for durability.
///
/// # Errors
///
/// Returns an IO error if the parent directory cannot be opened or fsynced.
pub fn fsync_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        let dir = fs::File::open(parent)?;
        dir.sync_all()?;
    }
    Ok(())
}

fn staging_file(path: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let fname = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "target".to_string());
    tempfile::Builder::new()
        .prefix(&format!(".{fname}."))
        .suffix(TMP_SUFFIX)
        .tempfile_in(parent)
}

fn commit(tmp: tempfile::NamedTempFile, path: &Path) -> std::io::Result<()> {
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    fsync_parent_dir(path)
}

/// Replace the content of an existing file, preserving its mode and ownership.
///
/// # Errors
///
/// Returns an IO error if the target is missing, the staging file cannot be
/// written, ownership cannot be copied, or the rename fails. The target is left
/// untouched on any error.
pub fn replace_preserving(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let md = fs::metadata(path)?;
    let mut tmp = staging_file(path)?;
    tmp.write_all(contents)?;
    let staged = tmp.as_file().metadata()?;
    if staged.uid() != md.uid() || staged.gid() != md.gid() {
        std::os::unix::fs::fchown(tmp.as_file(), Some(md.uid()), Some(md.gid()))?;
    }
    // After fchown: a chown clears setid bits, so mode goes last.
    tmp.as_file().set_permissions(md.permissions())?;
    commit(tmp, path)
}

/// Create or replace a file with default ownership; parent directories are created.
///
/// # Errors
///
/// Returns an IO error if the directory or file cannot be written.
pub fn write_new(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = staging_file(path)?;
    tmp.write_all(contents)?;
    commit(tmp, path)
}
