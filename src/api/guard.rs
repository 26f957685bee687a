//! Collision guard: runs before anything is mutated.

use serde_json::json;

use super::{stage_failed, ApiError, Remapper};
use crate::fs::db::load_group_db;
use crate::logging::{AuditSink, FactsEmitter, Stage, StageLogger};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    /// No group holds the target GID.
    Free,
    /// The group itself already holds it; a remap is a no-op.
    AlreadyAssigned,
}

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Remapper<E, A>,
    slog: &StageLogger<'_>,
    group: &str,
    target: u32,
) -> Result<Availability, ApiError> {
    let fail = |e: ApiError| stage_failed(slog, Stage::Guard, e);

    let db = load_group_db(&api.policy.paths.group_db).map_err(|e| fail(e.into()))?;
    let holders = db.holders_of(target);
    if let Some(owner) = holders.iter().find(|h| **h != group) {
        return Err(fail(ApiError::GidCollision {
            gid: target,
            owner: (*owner).to_string(),
        }));
    }
    // Directory-only groups never show up in the local file.
    match api.names.group_by_gid(target) {
        Ok(Some(e)) if e.name != group => {
            return Err(fail(ApiError::GidCollision {
                gid: target,
                owner: e.name,
            }))
        }
        Ok(_) => {}
        Err(e) => return Err(fail(ApiError::Io(e.msg))),
    }
    let availability = if holders.is_empty() {
        Availability::Free
    } else {
        Availability::AlreadyAssigned
    };
    slog.stage(Stage::Guard)
        .field("target_gid", json!(target))
        .field("already_assigned", json!(availability == Availability::AlreadyAssigned))
        .emit_success();
    Ok(availability)
}
