// Stage events for one staged write.
//
// Every fact carries a minimal envelope: `schema_version`, `ts`, `write_id`, `path`, `stage`
// and `decision`. Failures additionally carry `error`, `error_id` and `exit_code`.
use crate::api::errors::{exit_code_for, id_str, ErrorId};
use crate::constants::FACTS_SUBSYSTEM;
use crate::logging::{redact_event, FactsEmitter};
use crate::types::WriteError;
use serde_json::{json, Value};

pub(crate) const SCHEMA_VERSION: i64 = 1;

pub(crate) struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub write_id: String,
    pub path: String,
    pub redact: bool,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(facts: &'a dyn FactsEmitter, write_id: String, path: String) -> Self {
        Self {
            facts,
            write_id,
            path,
            redact: false,
        }
    }
}

/// Stage for typed audit emission.
#[derive(Clone, Copy, Debug)]
pub enum Stage {
    Stage,
    Validate,
    Commit,
    Abort,
}

impl Stage {
    fn as_event(self) -> &'static str {
        match self {
            Stage::Stage => "write.stage",
            Stage::Validate => "write.validate",
            Stage::Commit => "write.commit",
            Stage::Abort => "write.abort",
        }
    }
}

/// Decision severity for audit events.
#[derive(Clone, Copy, Debug)]
pub enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

/// Builder facade over audit emission with centralized envelope+redaction.
pub struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    pub(crate) fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub fn stage(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Stage)
    }
    pub fn validate(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Validate)
    }
    pub fn commit(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Commit)
    }
    pub fn abort(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Abort)
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

    pub fn merge(mut self, extra: Value) -> Self {
        if let Value::Object(obj) = extra {
            self.fields.extend(obj);
        }
        self
    }

    /// Attach `error`, `error_id` and `exit_code` for `err`.
    pub fn error(self, err: &WriteError) -> Self {
        let id = ErrorId::from(err);
        self.field("error", json!(err.to_string()))
            .field("error_id", json!(id_str(id)))
            .field("exit_code", json!(exit_code_for(id)))
    }

    pub fn emit(self, decision: Decision) {
        let mut fields = self.fields;
        fields
            .entry("decision")
            .or_insert(json!(decision.as_str()));
        fields
            .entry("schema_version")
            .or_insert(json!(SCHEMA_VERSION));
        fields
            .entry("ts")
            .or_insert_with(|| json!(crate::logging::redact::now_iso()));
        fields
            .entry("write_id")
            .or_insert(json!(self.ctx.write_id));
        fields.entry("path").or_insert(json!(self.ctx.path));
        let out = if self.ctx.redact {
            redact_event(Value::Object(fields))
        } else {
            Value::Object(fields)
        };
        self.ctx
            .facts
            .emit(FACTS_SUBSYSTEM, self.stage.as_event(), decision.as_str(), out);
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
