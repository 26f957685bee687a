//! Identity resolution: the group must be known to the name-service *and*
//! defined in the local group database, with a usable GID.

use log::Level;
use serde_json::json;

use super::{stage_failed, ApiError, Remapper};
use crate::fs::db::load_group_db;
use crate::logging::{AuditSink, FactsEmitter, Stage, StageLogger};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Remapper<E, A>,
    slog: &StageLogger<'_>,
    group: &str,
) -> Result<u32, ApiError> {
    let fail = |e: ApiError| stage_failed(slog, Stage::Resolve, e);

    let entry = match api.names.group_by_name(group) {
        Ok(Some(e)) => e,
        Ok(None) => return Err(fail(ApiError::GroupNotFound(group.to_string()))),
        Err(e) => return Err(fail(ApiError::Io(e.msg))),
    };
    let db = load_group_db(&api.policy.paths.group_db).map_err(|e| fail(e.into()))?;
    let Some(rec) = db.find(group) else {
        return Err(fail(ApiError::NotLocalGroup(group.to_string())));
    };
    let gid = match rec.gid() {
        Some(g) if g > 0 => g,
        _ => {
            return Err(fail(ApiError::InvalidGid {
                group: group.to_string(),
                raw: rec.gid_raw().to_string(),
            }))
        }
    };
    if entry.gid != gid {
        api.audit.log(
            Level::Warn,
            &format!(
                "name-service reports GID {} for '{group}' but {} says {gid}; using {gid}",
                entry.gid,
                api.policy.paths.group_db.display()
            ),
        );
    }
    slog.stage(Stage::Resolve)
        .field("gid", json!(gid))
        .field("nss_gid", json!(entry.gid))
        .emit_success();
    Ok(gid)
}
