pub mod fs;

use std::path::Path;

use crate::types::{errors::Result, OwnershipInfo};

pub trait OwnershipOracle: Send + Sync {
    /// Get ownership information for the entry itself (symlinks are not followed).
    /// # Errors
    /// Returns an error if ownership information cannot be determined.
    fn owner_of(&self, path: &Path) -> Result<OwnershipInfo>;
}

pub trait GroupChanger: Send + Sync {
    /// Change only the group of the entry itself (symlinks are not followed).
    /// # Errors
    /// Returns an error if the ownership change is refused or the entry is gone.
    fn set_group(&self, path: &Path, gid: u32) -> Result<()>;
}
