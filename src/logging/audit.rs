// Structured facts for each stage of a remap or repair run.
//
// Every fact carries the envelope `schema_version`, `ts`, `run_id`, `group`,
// `dry_run`, `stage`, `decision`. Dry runs are redacted (see `redact`).
use crate::logging::{redact_event, FactsEmitter};
use serde_json::{json, Value};
use uuid::Uuid;

pub(crate) const SCHEMA_VERSION: i64 = 1;
const SUBSYSTEM: &str = "gidremap";

pub(crate) fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone, Debug, Default)]
pub(crate) struct AuditMode {
    pub dry_run: bool,
    pub redact: bool,
}

pub(crate) struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub run_id: String,
    pub group: String,
    pub ts: String,
    pub mode: AuditMode,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(
        facts: &'a dyn FactsEmitter,
        run_id: String,
        group: &str,
        ts: String,
        mode: AuditMode,
    ) -> Self {
        Self {
            facts,
            run_id,
            group: group.to_string(),
            ts,
            mode,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Guard,
    Marker,
    Retarget,
    Sweep,
    RemapSummary,
    RepairSummary,
}

impl Stage {
    #[must_use]
    pub const fn as_event(self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Guard => "guard",
            Stage::Marker => "marker",
            Stage::Retarget => "retarget",
            Stage::Sweep => "sweep",
            Stage::RemapSummary => "remap.summary",
            Stage::RepairSummary => "repair.summary",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

/// Builder facade over fact emission with a centralized envelope and redaction.
pub struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    pub(crate) fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub fn stage(&self, stage: Stage) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, stage)
    }

    pub fn run_id(&self) -> &str {
        &self.ctx.run_id
    }
}

pub struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn error_id(self, id: &str) -> Self {
        self.field("error_id", json!(id))
    }

    pub fn merge(mut self, extra: &Value) -> Self {
        if let Some(obj) = extra.as_object() {
            for (k, v) in obj {
                self.fields.insert(k.clone(), v.clone());
            }
        }
        self
    }

    pub fn emit(self, decision: Decision) {
        let mut fields = self.fields;
        fields.entry("decision").or_insert(json!(decision.as_str()));
        fields.entry("schema_version").or_insert(json!(SCHEMA_VERSION));
        fields.entry("ts").or_insert(json!(self.ctx.ts));
        fields.entry("run_id").or_insert(json!(self.ctx.run_id));
        fields.entry("group").or_insert(json!(self.ctx.group));
        fields.entry("dry_run").or_insert(json!(self.ctx.mode.dry_run));
        let mut out = Value::Object(fields);
        if self.ctx.mode.redact {
            out = redact_event(out);
        }
        self.ctx
            .facts
            .emit(SUBSYSTEM, self.stage.as_event(), decision.as_str(), out);
    }

    pub fn emit_success(self) {
        self.emit(Decision::Success);
    }
    pub fn emit_failure(self) {
        self.emit(Decision::Failure);
    }
    pub fn emit_warn(self) {
        self.emit(Decision::Warn);
    }
}
