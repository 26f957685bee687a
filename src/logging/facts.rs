use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use log::Level;
use serde_json::{json, Value};

pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

impl<T: FactsEmitter + ?Sized> FactsEmitter for Box<T> {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        (**self).emit(subsystem, event, decision, fields);
    }
}

impl<T: AuditSink + ?Sized> AuditSink for Box<T> {
    fn log(&self, level: Level, msg: &str) {
        (**self).log(level, msg);
    }
}

/// Discards everything.
#[derive(Default)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for JsonlSink {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Appends one JSON object per fact to a file.
pub struct FileFactsSink {
    file: Mutex<File>,
}

impl FileFactsSink {
    /// # Errors
    /// Returns an IO error if the file cannot be opened for appending.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl FactsEmitter for FileFactsSink {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        let mut line = json!({ "subsystem": subsystem, "event": event, "decision": decision });
        if let (Some(obj), Value::Object(extra)) = (line.as_object_mut(), fields) {
            for (k, v) in extra {
                obj.entry(k).or_insert(v);
            }
        }
        if let Ok(mut f) = self.file.lock() {
            let _ = writeln!(f, "{line}");
        }
    }
}

/// Terminal echo: info and below to stdout, warnings and errors to stderr.
#[derive(Default, Clone, Copy)]
pub struct ConsoleSink {
    pub verbose: bool,
}

impl AuditSink for ConsoleSink {
    fn log(&self, level: Level, msg: &str) {
        match level {
            Level::Error => eprintln!("ERROR: {msg}"),
            Level::Warn => eprintln!("WARN: {msg}"),
            Level::Info => println!("INFO: {msg}"),
            Level::Debug | Level::Trace => {
                if self.verbose {
                    println!("DEBUG: {msg}");
                }
            }
        }
    }
}

/// Sends every line to both sinks.
pub struct Tee<A, B>(pub A, pub B);

impl<A: AuditSink, B: AuditSink> AuditSink for Tee<A, B> {
    fn log(&self, level: Level, msg: &str) {
        self.0.log(level, msg);
        self.1.log(level, msg);
    }
}
