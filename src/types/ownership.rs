//! Data-only type for ownership information of a filesystem entry.

/// Owning IDs of a filesystem entry as seen without following symlinks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnershipInfo {
    /// User ID of the owner
    pub uid: u32,
    /// Group ID of the owner
    pub gid: u32,
}
