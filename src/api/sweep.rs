//! Ownership sweep: retag every entry still owned by the stale GID.
//!
//! Matching is purely by predicate (`gid == source`), so a second run finds
//! nothing left to do and an interrupted run resumes where it stopped.

use std::time::Instant;

use log::Level;
use serde_json::json;

use super::{stage_failed, ApiError, Remapper};
use crate::constants::SWEEP_FAILURE_LOG_LIMIT;
use crate::fs::walk::device_walker;
use crate::logging::{AuditSink, FactsEmitter, Stage, StageLogger};
use crate::types::{ApplyMode, SweepReport};

/// `target` is the GID already read from the local group database; the
/// pipelines always pass it so a stale name-service cache cannot redirect the
/// sweep. `None` falls back to a name-service lookup.
pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Remapper<E, A>,
    slog: &StageLogger<'_>,
    group: &str,
    source: u32,
    target: Option<u32>,
    mode: ApplyMode,
) -> Result<SweepReport, ApiError> {
    let t0 = Instant::now();
    let dry = mode.is_dry_run();
    let target = match target {
        Some(t) => t,
        None => match api.names.group_by_name(group) {
            Ok(Some(e)) => e.gid,
            Ok(None) => {
                return Err(stage_failed(
                    slog,
                    Stage::Sweep,
                    ApiError::GroupNotFound(group.to_string()),
                ))
            }
            Err(e) => return Err(stage_failed(slog, Stage::Sweep, ApiError::Io(e.msg))),
        },
    };
    let mut report = SweepReport {
        source_gid: source,
        target_gid: target,
        ..SweepReport::default()
    };
    let root = &api.policy.sweep.root;

    if target == source {
        api.audit.log(
            Level::Info,
            &format!("sweep: '{group}' still resolves to GID {source}; nothing to retag"),
        );
    } else {
        api.audit.log(
            Level::Info,
            &format!(
                "sweep: {} entries under {} from GID {source} to {target} ('{group}')",
                if dry { "counting" } else { "retagging" },
                root.display()
            ),
        );
        for entry in device_walker(root, api.policy.sweep.one_filesystem) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    report.walk_errors += 1;
                    api.audit.log(Level::Debug, &format!("sweep: walk: {e}"));
                    continue;
                }
            };
            report.visited += 1;
            let path = entry.path();
            let info = match api.owner.owner_of(path) {
                Ok(i) => i,
                Err(e) => {
                    // Vanished between readdir and lstat.
                    report.walk_errors += 1;
                    api.audit.log(Level::Debug, &format!("sweep: {}", e.msg));
                    continue;
                }
            };
            if info.gid != source {
                continue;
            }
            report.matched += 1;
            if dry {
                continue;
            }
            match api.chgrp.set_group(path, target) {
                Ok(()) => report.changed += 1,
                Err(e) => {
                    report.failed += 1;
                    if report.failures.len() < SWEEP_FAILURE_LOG_LIMIT {
                        api.audit.log(Level::Warn, &format!("sweep: {}", e.msg));
                        report.failures.push(e.msg);
                    }
                }
            }
        }
    }

    report.duration_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);
    if report.failed as usize > SWEEP_FAILURE_LOG_LIMIT {
        api.audit.log(
            Level::Warn,
            &format!(
                "sweep: {} further ownership changes failed",
                report.failed as usize - SWEEP_FAILURE_LOG_LIMIT
            ),
        );
    }
    let builder = slog.stage(Stage::Sweep).merge(&json!({
        "root": root.display().to_string(),
        "source_gid": report.source_gid,
        "target_gid": report.target_gid,
        "visited": report.visited,
        "matched": report.matched,
        "changed": report.changed,
        "failed": report.failed,
        "walk_errors": report.walk_errors,
        "duration_ms": report.duration_ms,
    }));
    if report.failed > 0 {
        builder.emit_warn();
    } else {
        builder.emit_success();
    }
    Ok(report)
}
