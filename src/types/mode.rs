/// Whether an operation mutates anything.
///
/// In `DryRun` the read-only steps (resolution, collision guard) run normally,
/// no account database or marker is written, and the sweep only counts matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ApplyMode {
    DryRun,
    #[default]
    Commit,
}

impl ApplyMode {
    #[must_use]
    pub const fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}
