pub mod editor;
pub mod lock;
pub mod nss;
pub mod ownership;
pub mod privilege;

pub use editor::{select_editor, AccountEditor, FlatFileEditor, GroupmodEditor};
pub use lock::{FileLockManager, LockGuard, LockManager};
pub use nss::{FlatFileNameService, GroupEntry, NameService, NssNameService};
pub use ownership::fs::FsOwnership;
pub use ownership::{GroupChanger, OwnershipOracle};
pub use privilege::ensure_root;
