//! Durable pending-remap markers.
//!
//! A marker is written before the account database is edited and removed once
//! the sweep that follows has completed. A marker that survives a crash or a
//! reboot names the stale GID, so `--resume` can finish the sweep without the
//! operator having to remember it.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::MARKER_SCHEMA;
use crate::fs::atomic::write_new;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRemap {
    pub schema: String,
    pub group: String,
    pub source_gid: u32,
    pub target_gid: u32,
    /// RFC 3339
    pub created_at: String,
    pub run_id: String,
}

impl PendingRemap {
    #[must_use]
    pub fn new(group: &str, source_gid: u32, target_gid: u32, created_at: String, run_id: String) -> Self {
        Self {
            schema: MARKER_SCHEMA.to_string(),
            group: group.to_string(),
            source_gid,
            target_gid,
            created_at,
            run_id,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MarkerStore {
    dir: PathBuf,
}

impl MarkerStore {
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, group: &str) -> PathBuf {
        // Percent-escape so distinct names never share a file.
        let mut safe = String::with_capacity(group.len());
        for c in group.chars() {
            match c {
                '/' | '%' | '\0' => safe.push_str(&format!("%{:02X}", c as u32)),
                c => safe.push(c),
            }
        }
        self.dir.join(format!("{safe}.json"))
    }

    /// Durably record an in-flight remap, replacing any previous marker for the group.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the marker cannot be serialized or written.
    pub fn write(&self, m: &PendingRemap) -> std::io::Result<()> {
        let body = serde_json::to_vec_pretty(m)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        write_new(&self.path_for(&m.group), &body)
    }

    /// Load every marker, sorted by group name. A missing directory means none.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory or a marker cannot be read, or a
    /// marker does not parse.
    pub fn load_all(&self) -> std::io::Result<Vec<PendingRemap>> {
        let rd = match std::fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut out = Vec::new();
        for entry in rd {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let f = std::fs::File::open(&path)?;
            let m: PendingRemap = serde_json::from_reader(f).map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("{}: {e}", path.display()),
                )
            })?;
            out.push(m);
        }
        out.sort_by(|a, b| a.group.cmp(&b.group));
        Ok(out)
    }

    /// Remove the marker for `group`; absent markers are fine.
    ///
    /// # Errors
    ///
    /// Returns an IO error if an existing marker cannot be removed.
    pub fn clear(&self, group: &str) -> std::io::Result<()> {
        match std::fs::remove_file(self.path_for(group)) {
            Ok(()) => crate::fs::atomic::fsync_parent_dir(&self.path_for(group)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_load_clear() {
        let td = tempfile::tempdir().unwrap();
        let store = MarkerStore::new(td.path().join("markers"));
        assert!(store.load_all().unwrap().is_empty());

        let b = PendingRemap::new("sv_web", 1001, 198, "2026-10-18T00:00:00Z".into(), "r2".into());
        let a = PendingRemap::new("sv_admin", 1000, 197, "2026-10-18T00:00:00Z".into(), "r1".into());
        store.write(&b).unwrap();
        store.write(&a).unwrap();
        std::fs::write(store.dir().join("notes.txt"), b"ignored").unwrap();

        assert_eq!(store.load_all().unwrap(), vec![a.clone(), b.clone()]);

        store.clear("sv_admin").unwrap();
        store.clear("sv_admin").unwrap();
        assert_eq!(store.load_all().unwrap(), vec![b]);
    }

    #[test]
    fn corrupt_marker_is_an_error() {
        let td = tempfile::tempdir().unwrap();
        let store = MarkerStore::new(td.path().to_path_buf());
        std::fs::write(td.path().join("bad.json"), b"{not json").unwrap();
        assert!(store.load_all().is_err());
    }

    #[test]
    fn path_for_stays_inside_dir() {
        let store = MarkerStore::new(PathBuf::from("/var/lib/gidremap"));
        assert_eq!(
            store.path_for("../etc"),
            PathBuf::from("/var/lib/gidremap/..%2Fetc.json")
        );
    }

    #[test]
    fn escaped_names_do_not_collide() {
        let store = MarkerStore::new(PathBuf::from("/m"));
        let names = ["a/b", "a_b", "a%2Fb", "a%b"];
        let paths: std::collections::HashSet<_> = names.iter().map(|n| store.path_for(n)).collect();
        assert_eq!(paths.len(), names.len());
        assert_eq!(store.path_for("a_b"), PathBuf::from("/m/a_b.json"));
    }
}
