//! Shared helpers for the gidremap integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::Level;
use serde_json::Value;

use gidremap::adapters::{GroupChanger, OwnershipOracle};
use gidremap::logging::{AuditSink, FactsEmitter};
use gidremap::policy::Policy;
use gidremap::types::errors::{Error, ErrorKind, Result};
use gidremap::types::OwnershipInfo;
use gidremap::Remapper;

/// Captures facts in memory.
#[derive(Clone, Default, Debug)]
pub struct TestEmitter {
    pub events: Arc<Mutex<Vec<(String, String, String, Value)>>>,
}

impl FactsEmitter for TestEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        self.events
            .lock()
            .unwrap()
            .push((subsystem.into(), event.into(), decision.into(), fields));
    }
}

impl TestEmitter {
    /// `(decision, fields)` for every fact of one event, in emission order.
    pub fn of(&self, event: &str) -> Vec<(String, Value)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e, _, _)| e == event)
            .map(|(_, _, d, f)| (d.clone(), f.clone()))
            .collect()
    }
}

/// Captures audit lines in memory.
#[derive(Clone, Default)]
pub struct TestAudit {
    pub lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl AuditSink for TestAudit {
    fn log(&self, level: Level, msg: &str) {
        self.lines.lock().unwrap().push((level, msg.to_string()));
    }
}

impl TestAudit {
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

/// In-memory group ownership, so sweeps can be exercised without root.
/// Entries not registered report GID 0.
#[derive(Clone, Default)]
pub struct FakeOwnership {
    gids: Arc<Mutex<HashMap<PathBuf, u32>>>,
    refused: Arc<Mutex<HashSet<PathBuf>>>,
    unreadable: Arc<Mutex<HashSet<PathBuf>>>,
    pub chgrp_calls: Arc<Mutex<usize>>,
}

impl FakeOwnership {
    pub fn set(&self, path: &Path, gid: u32) {
        self.gids.lock().unwrap().insert(path.to_path_buf(), gid);
    }

    pub fn gid(&self, path: &Path) -> u32 {
        self.gids.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    /// Make `set_group` fail for `path`, as on a read-only mount.
    pub fn refuse(&self, path: &Path) {
        self.refused.lock().unwrap().insert(path.to_path_buf());
    }

    /// Make `owner_of` fail for `path`, as for an entry the walk cannot stat.
    pub fn unreadable(&self, path: &Path) {
        self.unreadable.lock().unwrap().insert(path.to_path_buf());
    }

    pub fn calls(&self) -> usize {
        *self.chgrp_calls.lock().unwrap()
    }
}

impl OwnershipOracle for FakeOwnership {
    fn owner_of(&self, path: &Path) -> Result<OwnershipInfo> {
        std::fs::symlink_metadata(path).map_err(|e| Error::io(&path.display().to_string(), &e))?;
        if self.unreadable.lock().unwrap().contains(path) {
            return Err(Error::new(
                ErrorKind::Io,
                format!("lstat {}: Permission denied", path.display()),
            ));
        }
        Ok(OwnershipInfo {
            uid: 0,
            gid: self.gid(path),
        })
    }
}

impl GroupChanger for FakeOwnership {
    fn set_group(&self, path: &Path, gid: u32) -> Result<()> {
        *self.chgrp_calls.lock().unwrap() += 1;
        if self.refused.lock().unwrap().contains(path) {
            return Err(Error::new(
                ErrorKind::Io,
                format!("lchown {}: Read-only file system", path.display()),
            ));
        }
        self.set(path, gid);
        Ok(())
    }
}

pub const GROUPS: &str = "root:x:0:\n\
sv_admin:x:1000:alice,bob\n\
sv_web:x:1001:carol\n\
wheel:x:10:alice\n";

pub const USERS: &str = "root:x:0:0:root:/root:/bin/bash\n\
alice:x:1000:1000:Alice:/srv/1000:/bin/sh\n\
bob:x:1002:1000::/home/bob:/bin/sh\n\
carol:x:1001:1001::/home/carol:/bin/sh\n";

/// A fake system image under a tempdir: `etc/group`, `etc/passwd`, and files
/// whose group ownership lives in a `FakeOwnership`.
pub struct Fixture {
    pub td: tempfile::TempDir,
    pub facts: TestEmitter,
    pub audit: TestAudit,
    pub owners: FakeOwnership,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_databases(GROUPS, USERS)
    }

    pub fn with_databases(groups: &str, users: &str) -> Self {
        let td = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(td.path().join("etc")).unwrap();
        std::fs::write(td.path().join("etc/group"), groups).unwrap();
        std::fs::write(td.path().join("etc/passwd"), users).unwrap();
        Self {
            td,
            facts: TestEmitter::default(),
            audit: TestAudit::default(),
            owners: FakeOwnership::default(),
        }
    }

    pub fn root(&self) -> &Path {
        self.td.path()
    }

    pub fn policy(&self) -> Policy {
        let mut p = Policy::for_root(self.root());
        p.require_root = false;
        p
    }

    pub fn api(&self) -> Remapper<TestEmitter, TestAudit> {
        self.api_with(self.policy())
    }

    pub fn api_with(&self, policy: Policy) -> Remapper<TestEmitter, TestAudit> {
        Remapper::new(self.facts.clone(), self.audit.clone(), policy).with_ownership(
            Box::new(self.owners.clone()),
            Box::new(self.owners.clone()),
        )
    }

    /// Create `rel` (and its parents) and record it as group-owned by `gid`.
    pub fn file(&self, rel: &str, gid: u32) -> PathBuf {
        let p = self.root().join(rel);
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(&p, rel).unwrap();
        self.owners.set(&p, gid);
        p
    }

    pub fn dir(&self, rel: &str, gid: u32) -> PathBuf {
        let p = self.root().join(rel);
        std::fs::create_dir_all(&p).unwrap();
        self.owners.set(&p, gid);
        p
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root().join(rel)).unwrap()
    }

    pub fn marker_path(&self, group: &str) -> PathBuf {
        self.root().join("var/lib/gidremap").join(format!("{group}.json"))
    }
}
