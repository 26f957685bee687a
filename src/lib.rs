#![forbid(unsafe_code)]
//! gidremap: move a local group to a new GID and retag on-disk ownership.
//!
//! A remap runs in two phases:
//! - the account databases are edited (groupmod, or a field-anchored rewrite of
//!   the flat files) so the group and its primary members carry the new GID;
//! - a single-device sweep retags every entry still owned by the old GID.
//!
//! The sweep matches purely by GID, so it can be re-run (`-p` or `--resume`) after
//! an interruption or a reboot until nothing is left to change.

pub mod adapters;
pub mod api;
pub mod cli;
pub mod constants;
pub mod fs;
pub mod logging;
pub mod policy;
pub mod types;

pub use api::*;
