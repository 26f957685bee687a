//! Repair only: the account databases already carry the new GID; sweep the
//! stale one away.

use log::Level;

use super::{resolve, sweep, ApiError, Remapper};
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::types::{ApplyMode, RemapReport};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Remapper<E, A>,
    slog: &StageLogger<'_>,
    group: &str,
    source: u32,
    mode: ApplyMode,
) -> Result<RemapReport, ApiError> {
    let current = resolve::run(api, slog, group)?;
    if current == source {
        api.audit.log(
            Level::Warn,
            &format!("repair: '{group}' still has GID {source}; was the account database updated?"),
        );
    }
    let sweep = sweep::run(api, slog, group, source, Some(current), mode)?;
    Ok(RemapReport {
        group: group.to_string(),
        source_gid: source,
        target_gid: sweep.target_gid,
        editor: None,
        noop: false,
        dry_run: mode.is_dry_run(),
        sweep: Some(sweep),
    })
}
