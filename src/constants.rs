//! Shared crate-wide constants for gidremap.
//!
//! Centralizes well-known system paths and tuning knobs used across modules.

/// Local flat-file group database.
pub const GROUP_DB: &str = "/etc/group";

/// Local flat-file user database.
pub const PASSWD_DB: &str = "/etc/passwd";

/// Directory holding one pending-remap marker per group (see `fs::marker`).
pub const MARKER_DIR: &str = "/var/lib/gidremap";

/// Advisory lock serializing concurrent gidremap invocations.
pub const LOCK_FILE: &str = "/run/gidremap.lock";

/// Locations probed for the system `groupmod` utility, in preference order.
pub const GROUPMOD_CANDIDATES: &[&str] = &["/usr/sbin/groupmod", "/sbin/groupmod", "/usr/bin/groupmod"];

/// Temporary filename suffix used when atomically replacing an account database.
/// The temporary name is constructed as `.{fname}.XXXXXX{TMP_SUFFIX}` in the same directory.
pub const TMP_SUFFIX: &str = ".gidremap.tmp";

/// Schema tag written into every pending-remap marker.
pub const MARKER_SCHEMA: &str = "gidremap.pending.v1";

/// Syslog identity and datagram socket.
pub const SYSLOG_IDENT: &str = "gidremap";
pub const SYSLOG_SOCKET: &str = "/dev/log";
/// LOG_USER
pub const SYSLOG_FACILITY: u8 = 1;

/// Poll interval in milliseconds for the file-backed lock manager.
pub const LOCK_POLL_MS: u64 = 25;

/// Default bound on waiting for another gidremap instance to release the lock.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Per-entry sweep failures beyond this count are only tallied, not logged individually.
pub const SWEEP_FAILURE_LOG_LIMIT: usize = 20;
