//! Command-line surface.
//!
//! ```text
//! gidremap [-h]
//! gidremap [OPTIONS] <group-name> <target-GID>     full remap
//! gidremap [OPTIONS] -p <source-GID> <group-name>  repair ownership only
//! gidremap [OPTIONS] --resume                      finish interrupted remaps
//! ```
use std::path::PathBuf;

use clap::Parser;

use crate::api::ApiError;
use crate::policy::Policy;
use crate::types::{parse_gid, ApplyMode};

pub const USAGE: &str = "\
gidremap [-h]
       gidremap [OPTIONS] <group-name> <target-GID>
       gidremap [OPTIONS] -p <source-GID> <group-name>
       gidremap [OPTIONS] --resume";

#[derive(Parser, Debug)]
#[command(
    name = "gidremap",
    version,
    override_usage = USAGE,
    about = "Move a local group to a new GID and retag on-disk group ownership",
    after_help = "After a reboot, or if a remap was interrupted, re-run with -p <old-GID> <group> \
                  (or --resume) to retag anything still owned by the old GID."
)]
pub struct Cli {
    /// Repair only: retag entries still owned by this (old) GID; the account databases are not touched
    #[arg(short = 'p', value_name = "SOURCE_GID")]
    pub prior_gid: Option<String>,

    /// Finish every remap recorded by a pending marker
    #[arg(long, conflicts_with = "prior_gid")]
    pub resume: bool,

    /// Report what would change without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Operate on a system image mounted at DIR instead of the running system
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Append structured JSON facts to FILE
    #[arg(long, value_name = "FILE")]
    pub facts: Option<PathBuf>,

    /// Also print debug lines
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}

/// What the validated command line asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Remap { group: String, target: u32 },
    Repair { group: String, source: u32 },
    Resume,
}

fn usage(msg: impl Into<String>) -> ApiError {
    ApiError::Usage(msg.into())
}

fn check_group_name(group: &str) -> Result<(), ApiError> {
    if group.is_empty() || group.contains([':', ',', '\n']) {
        return Err(usage(format!("invalid group name '{group}'")));
    }
    Ok(())
}

impl Cli {
    /// Validate argument shapes; nothing is looked up or touched here.
    ///
    /// # Errors
    ///
    /// `ApiError::Usage` when the arguments match none of the accepted forms.
    pub fn invocation(&self) -> Result<Invocation, ApiError> {
        if self.resume {
            if !self.args.is_empty() {
                return Err(usage("--resume takes no arguments"));
            }
            return Ok(Invocation::Resume);
        }
        if let Some(raw) = &self.prior_gid {
            let source = parse_gid(raw)
                .ok_or_else(|| usage(format!("source GID '{raw}' is not a number")))?;
            let [group] = self.args.as_slice() else {
                return Err(usage("-p takes exactly one group name"));
            };
            check_group_name(group)?;
            return Ok(Invocation::Repair {
                group: group.clone(),
                source,
            });
        }
        match self.args.as_slice() {
            [] => Ok(Invocation::Help),
            [group, target] => {
                check_group_name(group)?;
                if parse_gid(group).is_some() {
                    return Err(usage(format!(
                        "'{group}' looks like a GID; the group must be given by name"
                    )));
                }
                let target = parse_gid(target)
                    .ok_or_else(|| usage(format!("target GID '{target}' is not a number")))?;
                Ok(Invocation::Remap {
                    group: group.clone(),
                    target,
                })
            }
            _ => Err(usage("expected <group-name> <target-GID>")),
        }
    }

    #[must_use]
    pub fn mode(&self) -> ApplyMode {
        if self.dry_run {
            ApplyMode::DryRun
        } else {
            ApplyMode::Commit
        }
    }

    #[must_use]
    pub fn policy(&self) -> Policy {
        match &self.root {
            Some(root) => Policy::for_root(root),
            None => Policy::default(),
        }
    }
}
