//! Account database editors: two interchangeable ways to move a group to a new GID.
//!
//! Both rewrite the group record's GID and the primary GID of every user
//! record that pointed at the old one, leaving all other fields untouched.
//! Neither rolls back on failure.
pub mod flatfile;
pub mod groupmod;

pub use flatfile::FlatFileEditor;
pub use groupmod::GroupmodEditor;

use crate::policy::types::EditorPreference;
use crate::policy::Policy;
use crate::types::errors::Result;

pub trait AccountEditor: Send + Sync {
    /// Short label recorded in facts and reports.
    fn label(&self) -> &'static str;

    /// Move `group` from `source` to `target` in the group and user databases.
    /// # Errors
    /// Returns an error if either database could not be updated; the databases
    /// are left in whatever state the failing step produced.
    fn retarget(&self, group: &str, source: u32, target: u32) -> Result<()>;
}

/// Pick an editor by probing capabilities once.
///
/// `Auto` prefers the system `groupmod` when one is installed and the policy
/// points at the live databases; anything else gets the flat-file editor,
/// since `groupmod` only knows `/etc`.
#[must_use]
pub fn select_editor(policy: &Policy) -> Box<dyn AccountEditor> {
    let flat = || -> Box<dyn AccountEditor> {
        Box::new(FlatFileEditor::new(
            policy.paths.group_db.clone(),
            policy.paths.passwd_db.clone(),
        ))
    };
    match policy.editor {
        EditorPreference::FlatFile => flat(),
        EditorPreference::Groupmod => match GroupmodEditor::probe() {
            Some(g) => Box::new(g),
            None => flat(),
        },
        EditorPreference::Auto => match GroupmodEditor::probe() {
            Some(g) if policy.paths.is_system_default() => Box::new(g),
            _ => flat(),
        },
    }
}
