//! Full remap: resolve → guard → marker → edit → sweep → clear marker.

use log::Level;
use serde_json::json;

use super::guard::{self, Availability};
use super::{resolve, retarget, stage_failed, sweep, ApiError, Remapper};
use crate::fs::PendingRemap;
use crate::logging::{now_iso, AuditSink, FactsEmitter, Stage, StageLogger};
use crate::types::{ApplyMode, RemapReport};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Remapper<E, A>,
    slog: &StageLogger<'_>,
    group: &str,
    target: u32,
    mode: ApplyMode,
) -> Result<RemapReport, ApiError> {
    let dry = mode.is_dry_run();
    let source = resolve::run(api, slog, group)?;
    let mut report = RemapReport {
        group: group.to_string(),
        source_gid: source,
        target_gid: target,
        dry_run: dry,
        ..RemapReport::default()
    };

    if guard::run(api, slog, group, target)? == Availability::AlreadyAssigned {
        report.noop = true;
        return Ok(report);
    }

    if dry {
        api.audit.log(
            Level::Info,
            &format!(
                "dry run: would move '{group}' from GID {source} to {target} via {}",
                api.editor.label()
            ),
        );
    } else {
        let marker = PendingRemap::new(group, source, target, now_iso(), slog.run_id().to_string());
        api.markers.write(&marker).map_err(|e| {
            stage_failed(
                slog,
                Stage::Marker,
                ApiError::Marker(format!("{}: {e}", api.markers.path_for(group).display())),
            )
        })?;
        slog.stage(Stage::Marker)
            .field("action", json!("write"))
            .field("source_gid", json!(source))
            .emit_success();
        api.audit.log(
            Level::Info,
            &format!(
                "if interrupted, finish with: gidremap -p {source} {group} (or gidremap --resume)"
            ),
        );

        retarget::run(api, slog, group, source, target)?;
        report.editor = Some(api.editor.label().to_string());
    }

    let sweep = sweep::run(api, slog, group, source, Some(target), mode)?;
    report.target_gid = sweep.target_gid;
    if !dry {
        api.settle_marker(slog, group, &sweep);
    }
    report.sweep = Some(sweep);
    Ok(report)
}
