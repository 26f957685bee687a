// Facade for the remap protocol; stages live in src/api/.

use log::Level;
use serde_json::json;

use crate::adapters::{
    ensure_root, select_editor, AccountEditor, FileLockManager, FlatFileNameService, FsOwnership,
    GroupChanger, LockGuard, LockManager, NameService, NssNameService, OwnershipOracle,
};
use crate::fs::MarkerStore;
use crate::logging::audit::{new_run_id, AuditCtx, AuditMode};
use crate::logging::{ts_for_mode, AuditSink, FactsEmitter, Stage, StageLogger};
use crate::policy::{NameServiceSource, Policy};
use crate::types::{ApplyMode, RemapReport, SweepReport};

pub mod errors;
mod guard;
mod remap;
mod repair;
mod resolve;
mod retarget;
mod sweep;

pub use errors::ApiError;
pub use guard::Availability;

pub struct Remapper<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    policy: Policy,
    names: Box<dyn NameService>,
    editor: Box<dyn AccountEditor>,
    owner: Box<dyn OwnershipOracle>,
    chgrp: Box<dyn GroupChanger>,
    lock: Option<Box<dyn LockManager>>,
    markers: MarkerStore,
}

impl<E: FactsEmitter, A: AuditSink> Remapper<E, A> {
    /// Wire the production collaborators named by `policy`.
    pub fn new(facts: E, audit: A, policy: Policy) -> Self {
        let names: Box<dyn NameService> = match policy.name_service {
            NameServiceSource::System => Box::new(NssNameService),
            NameServiceSource::FlatFile => {
                Box::new(FlatFileNameService::new(policy.paths.group_db.clone()))
            }
        };
        let editor = select_editor(&policy);
        let lock = policy
            .paths
            .lock_file
            .clone()
            .map(|p| Box::new(FileLockManager::new(p)) as Box<dyn LockManager>);
        let markers = MarkerStore::new(policy.paths.marker_dir.clone());
        Self {
            facts,
            audit,
            policy,
            names,
            editor,
            owner: Box::new(FsOwnership),
            chgrp: Box::new(FsOwnership),
            lock,
            markers,
        }
    }

    pub fn with_name_service(mut self, names: Box<dyn NameService>) -> Self {
        self.names = names;
        self
    }

    pub fn with_editor(mut self, editor: Box<dyn AccountEditor>) -> Self {
        self.editor = editor;
        self
    }

    pub fn with_ownership(
        mut self,
        owner: Box<dyn OwnershipOracle>,
        chgrp: Box<dyn GroupChanger>,
    ) -> Self {
        self.owner = owner;
        self.chgrp = chgrp;
        self
    }

    pub fn with_lock_manager(mut self, lock: Option<Box<dyn LockManager>>) -> Self {
        self.lock = lock;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn editor_label(&self) -> &'static str {
        self.editor.label()
    }

    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    fn ctx(&self, group: &str, mode: ApplyMode) -> AuditCtx<'_> {
        AuditCtx::new(
            &self.facts,
            new_run_id(),
            group,
            ts_for_mode(mode),
            AuditMode {
                dry_run: mode.is_dry_run(),
                redact: mode.is_dry_run(),
            },
        )
    }

    /// Current GID of a local group.
    ///
    /// # Errors
    ///
    /// `GroupNotFound`, `NotLocalGroup`, `InvalidGid`, or `Io` when a database
    /// cannot be read.
    pub fn resolve(&self, group: &str) -> Result<u32, ApiError> {
        let ctx = self.ctx(group, ApplyMode::Commit);
        resolve::run(self, &StageLogger::new(&ctx), group)
    }

    /// Whether `target` can be given to `group`.
    ///
    /// # Errors
    ///
    /// `GidCollision` when another group holds `target`.
    pub fn check_available(&self, group: &str, target: u32) -> Result<Availability, ApiError> {
        let ctx = self.ctx(group, ApplyMode::Commit);
        guard::run(self, &StageLogger::new(&ctx), group, target)
    }

    /// Move `group` from `source` to `target` in the account databases, then verify.
    ///
    /// # Errors
    ///
    /// `DatabaseEdit` when the editor fails or the result does not show `target`.
    pub fn retarget(&self, group: &str, source: u32, target: u32) -> Result<(), ApiError> {
        let ctx = self.ctx(group, ApplyMode::Commit);
        retarget::run(self, &StageLogger::new(&ctx), group, source, target)
    }

    /// Retag every entry owned by `source` to the GID `group` currently resolves to.
    ///
    /// # Errors
    ///
    /// Only when `group` cannot be resolved; per-entry failures are counted in the report.
    pub fn sweep(&self, group: &str, source: u32, mode: ApplyMode) -> Result<SweepReport, ApiError> {
        let ctx = self.ctx(group, mode);
        sweep::run(self, &StageLogger::new(&ctx), group, source, None, mode)
    }

    /// Full remap: account databases first, then the ownership sweep.
    ///
    /// # Errors
    ///
    /// Any terminal failure; nothing is mutated when validation, resolution or
    /// the collision guard fails.
    pub fn remap(&self, group: &str, target: u32, mode: ApplyMode) -> Result<RemapReport, ApiError> {
        let ctx = self.ctx(group, mode);
        let slog = StageLogger::new(&ctx);
        self.audit.log(
            Level::Info,
            &format!("remap: moving group '{group}' to GID {target}"),
        );
        let out = self
            .preconditions(mode)
            .and_then(|_guard| remap::run(self, &slog, group, target, mode));
        self.finish(&slog, Stage::RemapSummary, out)
    }

    /// Repair only: re-sweep for entries still owned by `source`. The account
    /// databases are not touched.
    ///
    /// # Errors
    ///
    /// Privilege/locking failures, or `group` not resolving to a valid local group.
    pub fn repair(&self, group: &str, source: u32, mode: ApplyMode) -> Result<RemapReport, ApiError> {
        let ctx = self.ctx(group, mode);
        let slog = StageLogger::new(&ctx);
        self.audit.log(
            Level::Info,
            &format!("repair: retagging entries of GID {source} to group '{group}'"),
        );
        let out = self
            .preconditions(mode)
            .and_then(|_guard| repair::run(self, &slog, group, source, mode));
        self.finish(&slog, Stage::RepairSummary, out)
    }

    /// Repair every remap recorded by a pending marker, clearing each marker
    /// once its sweep completes.
    ///
    /// # Errors
    ///
    /// The first failure; later markers are still attempted.
    pub fn resume(&self, mode: ApplyMode) -> Result<Vec<RemapReport>, ApiError> {
        let _guard = self.preconditions(mode).map_err(|e| {
            self.audit.log(Level::Error, &e.to_string());
            e
        })?;
        let pending = self.markers.load_all().map_err(|e| {
            let e = ApiError::Marker(format!("{}: {e}", self.markers.dir().display()));
            self.audit.log(Level::Error, &e.to_string());
            e
        })?;
        if pending.is_empty() {
            self.audit.log(Level::Info, "resume: no pending remaps");
        }
        let mut reports = Vec::new();
        let mut first_err = None;
        for m in pending {
            self.audit.log(
                Level::Info,
                &format!(
                    "resume: group '{}' GID {} -> {} (recorded {})",
                    m.group, m.source_gid, m.target_gid, m.created_at
                ),
            );
            let ctx = self.ctx(&m.group, mode);
            let slog = StageLogger::new(&ctx);
            let out = repair::run(self, &slog, &m.group, m.source_gid, mode);
            match self.finish(&slog, Stage::RepairSummary, out) {
                Ok(r) => {
                    if r.target_gid == m.source_gid {
                        // Interrupted before the edit: only a full remap can finish it.
                        self.audit.log(
                            Level::Warn,
                            &format!(
                                "'{}' still has GID {}; re-run: gidremap {} {}",
                                m.group, m.source_gid, m.group, m.target_gid
                            ),
                        );
                    } else if let (false, Some(sweep)) = (mode.is_dry_run(), &r.sweep) {
                        self.settle_marker(&slog, &m.group, sweep);
                    }
                    reports.push(r);
                }
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    }

    /// Privilege check, then the process lock (commit only).
    fn preconditions(&self, mode: ApplyMode) -> Result<Option<Box<dyn LockGuard>>, ApiError> {
        if self.policy.require_root {
            ensure_root().map_err(|e| ApiError::Privilege(e.msg))?;
        }
        if mode.is_dry_run() {
            return Ok(None);
        }
        match &self.lock {
            Some(mgr) => mgr
                .acquire_process_lock(self.policy.lock_timeout_ms)
                .map(Some)
                .map_err(|e| ApiError::Locking(e.msg)),
            None => Ok(None),
        }
    }

    /// Drop the pending marker once a sweep left nothing behind; keep it when
    /// entries failed or could not be read so `--resume` retries them.
    pub(crate) fn settle_marker(&self, slog: &StageLogger<'_>, group: &str, sweep: &SweepReport) {
        if sweep.failed > 0 || sweep.walk_errors > 0 {
            if sweep.failed > 0 {
                self.audit.log(
                    Level::Warn,
                    &format!("{} entries still carry GID {}", sweep.failed, sweep.source_gid),
                );
            }
            if sweep.walk_errors > 0 {
                self.audit.log(
                    Level::Warn,
                    &format!(
                        "walk incomplete: {} entries could not be read",
                        sweep.walk_errors
                    ),
                );
            }
            self.audit.log(
                Level::Warn,
                &format!("keeping the pending marker for '{group}'"),
            );
            slog.stage(Stage::Marker)
                .field("action", json!("keep"))
                .field("failed", json!(sweep.failed))
                .field("walk_errors", json!(sweep.walk_errors))
                .emit_warn();
            return;
        }
        match self.markers.clear(group) {
            Ok(()) => slog
                .stage(Stage::Marker)
                .field("action", json!("clear"))
                .emit_success(),
            Err(e) => {
                // The sweep is idempotent; a stale marker only causes a no-op resume.
                self.audit.log(
                    Level::Warn,
                    &format!("could not remove pending marker for '{group}': {e}"),
                );
                slog.stage(Stage::Marker)
                    .field("action", json!("clear"))
                    .field("error", json!(e.to_string()))
                    .emit_warn();
            }
        }
    }

    fn finish(
        &self,
        slog: &StageLogger<'_>,
        stage: Stage,
        out: Result<RemapReport, ApiError>,
    ) -> Result<RemapReport, ApiError> {
        match &out {
            Ok(r) => {
                let summary = serde_json::to_value(r).unwrap_or_default();
                slog.stage(stage).merge(&summary).emit_success();
                let verb = if r.dry_run { "would retag" } else { "retagged" };
                let msg = match &r.sweep {
                    _ if r.noop => format!(
                        "group '{}' already has GID {}; nothing to do",
                        r.group, r.target_gid
                    ),
                    Some(s) => format!(
                        "done: group '{}' GID {} -> {}; {verb} {} of {} entries ({} failed)",
                        r.group,
                        r.source_gid,
                        r.target_gid,
                        if r.dry_run { s.matched } else { s.changed },
                        s.visited,
                        s.failed
                    ),
                    None => format!("done: group '{}'", r.group),
                };
                self.audit.log(Level::Info, &msg);
            }
            Err(e) => {
                slog.stage(stage)
                    .error_id(errors::id_str(e.id()))
                    .field("error", json!(e.to_string()))
                    .emit_failure();
                self.audit.log(Level::Error, &e.to_string());
            }
        }
        out
    }
}

/// Emit a stage failure fact and hand the error back.
pub(crate) fn stage_failed(slog: &StageLogger<'_>, stage: Stage, e: ApiError) -> ApiError {
    slog.stage(stage)
        .error_id(errors::id_str(e.id()))
        .field("error", json!(e.to_string()))
        .emit_failure();
    e
}
