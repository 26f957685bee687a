pub mod audit;
pub mod facts;
pub mod redact;
pub mod syslog;

pub use audit::{Decision, EventBuilder, Stage, StageLogger};
pub use facts::{AuditSink, ConsoleSink, FactsEmitter, FileFactsSink, JsonlSink, Tee};
pub use redact::{now_iso, redact_event, ts_for_mode, TS_ZERO};
pub use syslog::SyslogSink;
