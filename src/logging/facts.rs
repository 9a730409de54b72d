use log::Level;
use serde_json::Value;

/// Receives structured facts (one JSON object per event).
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Receives human-oriented diagnostics.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Discards everything. Default for library callers that do not care.
#[derive(Default)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for JsonlSink {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Forwards facts and diagnostics to the `log` facade.
/// Facts are logged at debug (success) or warn (failure/warn) as one JSON line.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl FactsEmitter for LogSink {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        let level = if decision == "success" {
            Level::Debug
        } else {
            Level::Warn
        };
        log::log!(target: "stagedwrite::facts", level, "{subsystem} {event} {decision} {fields}");
    }
}

impl AuditSink for LogSink {
    fn log(&self, level: Level, msg: &str) {
        log::log!(target: "stagedwrite", level, "{msg}");
    }
}
