pub mod atomic;
pub mod db;
pub mod marker;
pub mod walk;

pub use atomic::{fsync_parent_dir, replace_preserving, write_new};
pub use db::{load_group_db, load_passwd_db, store};
pub use marker::{MarkerStore, PendingRemap};
pub use walk::device_walker;
