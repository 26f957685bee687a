use serde::Serialize;

/// Outcome of one ownership sweep.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct SweepReport {
    /// GID that entries were matched against.
    pub source_gid: u32,
    /// GID matched entries were (or, in a dry run, would have been) retagged to.
    pub target_gid: u32,
    pub visited: u64,
    pub matched: u64,
    pub changed: u64,
    /// Per-entry ownership changes that failed; the sweep kept going.
    pub failed: u64,
    /// Entries the walk could not read (permission denied, vanished).
    pub walk_errors: u64,
    pub duration_ms: u64,
    /// First few failure messages, for operators.
    pub failures: Vec<String>,
}

/// Outcome of a full remap or a repair run.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct RemapReport {
    pub group: String,
    pub source_gid: u32,
    pub target_gid: u32,
    /// Account editor used; `None` in repair mode and dry runs.
    pub editor: Option<String>,
    /// Set when the group already held the target GID and nothing was done.
    pub noop: bool,
    pub dry_run: bool,
    pub sweep: Option<SweepReport>,
}
