pub mod config;
pub mod types;

pub use config::Policy;
pub use types::{EditorPreference, NameServiceSource, Paths, SweepPolicy};
