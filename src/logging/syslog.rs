//! Syslog sink writing RFC 3164 datagrams to the local log socket.
//!
//! Best-effort: a missing or full socket drops the line; the console echo
//! still carries it.
use std::os::unix::net::UnixDatagram;
use std::path::PathBuf;

use log::Level;

use super::facts::AuditSink;
use crate::constants::{SYSLOG_FACILITY, SYSLOG_IDENT, SYSLOG_SOCKET};

pub struct SyslogSink {
    socket: Option<UnixDatagram>,
    target: PathBuf,
    ident: String,
    pid: u32,
}

impl SyslogSink {
    /// Sink for the system log socket under the gidremap identity.
    #[must_use]
    pub fn system() -> Self {
        Self::to_socket(PathBuf::from(SYSLOG_SOCKET), SYSLOG_IDENT)
    }

    #[must_use]
    pub fn to_socket(target: PathBuf, ident: &str) -> Self {
        Self {
            socket: UnixDatagram::unbound().ok(),
            target,
            ident: ident.to_string(),
            pid: std::process::id(),
        }
    }

    fn severity(level: Level) -> u8 {
        match level {
            Level::Error => 3,
            Level::Warn => 4,
            Level::Info => 6,
            Level::Debug | Level::Trace => 7,
        }
    }

    pub(crate) fn format(&self, level: Level, msg: &str) -> String {
        let pri = u16::from(SYSLOG_FACILITY) * 8 + u16::from(Self::severity(level));
        // syslogd splits on newlines; keep one record per call.
        let msg = msg.replace('\n', " ");
        format!("<{pri}>{}[{}]: {msg}", self.ident, self.pid)
    }
}

impl AuditSink for SyslogSink {
    fn log(&self, level: Level, msg: &str) {
        if let Some(sock) = &self.socket {
            let _ = sock.send_to(self.format(level, msg).as_bytes(), &self.target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_priority_and_ident() {
        let sink = SyslogSink::to_socket(PathBuf::from("/nonexistent"), "gidremap");
        let pid = std::process::id();
        assert_eq!(
            sink.format(Level::Info, "remap: sv_admin 1000 -> 197"),
            format!("<14>gidremap[{pid}]: remap: sv_admin 1000 -> 197")
        );
        assert_eq!(sink.format(Level::Error, "a\nb"), format!("<11>gidremap[{pid}]: a b"));
        // No socket listening: must not panic.
        sink.log(Level::Warn, "dropped");
    }

    #[test]
    fn delivers_to_a_listening_socket() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("log");
        let server = UnixDatagram::bind(&path).unwrap();
        let sink = SyslogSink::to_socket(path, "gidremap");
        sink.log(Level::Error, "collision");
        let mut buf = [0u8; 256];
        let n = server.recv(&mut buf).unwrap();
        let got = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(got.starts_with("<11>gidremap["), "{got}");
        assert!(got.ends_with("]: collision"), "{got}");
    }
}
