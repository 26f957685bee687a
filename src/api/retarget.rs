//! Account database edit followed by a read-back check.

use log::Level;
use serde_json::json;

use super::{stage_failed, ApiError, Remapper};
use crate::fs::db::{load_group_db, load_passwd_db};
use crate::logging::{AuditSink, FactsEmitter, Stage, StageLogger};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Remapper<E, A>,
    slog: &StageLogger<'_>,
    group: &str,
    source: u32,
    target: u32,
) -> Result<(), ApiError> {
    let fail = |e: ApiError| stage_failed(slog, Stage::Retarget, e);
    let editor = api.editor.label();
    api.audit.log(
        Level::Info,
        &format!("retarget: '{group}' GID {source} -> {target} via {editor}"),
    );

    api.editor
        .retarget(group, source, target)
        .map_err(|e| fail(ApiError::DatabaseEdit(e.msg)))?;

    let db = load_group_db(&api.policy.paths.group_db).map_err(|e| fail(e.into()))?;
    let now = db.find(group).and_then(|r| r.gid());
    if now != Some(target) {
        return Err(fail(ApiError::DatabaseEdit(format!(
            "{editor} reported success but '{group}' has GID {}",
            now.map_or_else(|| "<none>".to_string(), |g| g.to_string())
        ))));
    }
    let stale = load_passwd_db(&api.policy.paths.passwd_db)
        .map(|users| users.records().filter(|u| u.primary_gid() == Some(source)).count())
        .unwrap_or(0);
    if stale > 0 {
        api.audit.log(
            Level::Warn,
            &format!("{stale} user(s) still have primary GID {source} after the edit"),
        );
    }
    slog.stage(Stage::Retarget)
        .field("editor", json!(editor))
        .field("source_gid", json!(source))
        .field("target_gid", json!(target))
        .field("stale_users", json!(stale))
        .emit_success();
    Ok(())
}
