use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::LOCK_POLL_MS;
use crate::types::errors::{Error, ErrorKind, Result};
use fs2::FileExt;

use super::{LockGuard, LockManager};

/// Advisory `flock` on a well-known file; serializes gidremap runs against
/// each other only, never against other account-database editors.
#[derive(Debug)]
pub struct FileLockManager {
    path: PathBuf,
}

impl FileLockManager {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

struct FileGuard {
    file: File,
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl LockGuard for FileGuard {}

impl LockManager for FileLockManager {
    fn acquire_process_lock(&self, timeout_ms: u64) -> Result<Box<dyn LockGuard>> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::io(&format!("create {}", parent.display()), &e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| Error::io(&format!("open {}", self.path.display()), &e))?;
        let t0 = Instant::now();
        loop {
            if file.try_lock_exclusive().is_ok() {
                // Holder pid, for operators inspecting a stuck lock.
                let _ = file.set_len(0);
                let _ = writeln!(file, "{}", std::process::id());
                return Ok(Box::new(FileGuard { file }));
            }
            if t0.elapsed() >= Duration::from_millis(timeout_ms) {
                return Err(Error::new(
                    ErrorKind::Policy,
                    format!(
                        "another gidremap holds {} (waited {timeout_ms} ms)",
                        self.path.display()
                    ),
                ));
            }
            thread::sleep(Duration::from_millis(LOCK_POLL_MS));
        }
    }
}
