//! Constants and command line configuration.

use crate::error::SyncError;
use crate::sync::WaitPolicy;
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Per-request cap on add entries and on remove entries.
pub const MAX_ENTRIES_PER_REQUEST: usize = 100;
/// Delay between two readiness polls.
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Workflow to run against the named lists.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create new lists. Does not check for existing lists with the same name.
    Create,
    /// Reconcile existing lists, found by name.
    Update,
}

impl FromStr for Action {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            other => Err(SyncError::Config(format!("Unknown action: {other}"))),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
        }
    }
}

/// Sync CIDR blocks from a text file into EC2 managed prefix lists.
#[derive(Parser, Debug, Default)]
#[command(version)]
pub struct Args {
    /// Action to perform: create or update
    #[arg(long, default_value = "create")]
    pub action: String,

    /// Base name of the prefix lists, `-ipv4` / `-ipv6` is appended
    #[arg(long, default_value = "")]
    pub name: String,

    /// Path to the file containing one CIDR per line
    #[arg(long, default_value = "")]
    pub file: String,

    /// AWS region passed to the aws cli
    #[arg(long)]
    pub region: Option<String>,

    /// AWS profile passed to the aws cli
    #[arg(long)]
    pub profile: Option<String>,

    /// Give up waiting for a list after this many polls (default: wait forever)
    #[arg(long)]
    pub max_wait_attempts: Option<u32>,

    /// Reconcile the IPv4 and IPv6 lists concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Print the planned changes without modifying anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Rewrite single-dash long flags (`-name x`, `-file=x`) to the double-dash
/// form clap expects. Short flags like `-h` and values are left alone.
pub fn normalize_flags<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            let bytes = arg.as_bytes();
            let single_dash_long = i > 0
                && bytes.len() > 2
                && bytes[0] == b'-'
                && bytes[1].is_ascii_alphabetic();
            if single_dash_long {
                format!("-{arg}")
            } else {
                arg
            }
        })
        .collect()
}

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub action: Action,
    pub base_name: String,
    pub file: PathBuf,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub max_wait_attempts: Option<u32>,
    pub parallel: bool,
    pub dry_run: bool,
}

impl Config {
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            interval: Duration::from_secs(POLL_INTERVAL_SECS),
            max_attempts: self.max_wait_attempts,
        }
    }
}

impl TryFrom<Args> for Config {
    type Error = SyncError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        log::info!("Action: {}", args.action);
        log::info!("Prefix list name: {}", args.name);
        log::info!("File path: {}", args.file);

        if args.name.trim().is_empty() || args.file.trim().is_empty() {
            return Err(SyncError::Config(
                "Prefix list name and file path are required".to_string(),
            ));
        }
        let action: Action = args.action.parse()?;
        if args.max_wait_attempts == Some(0) {
            return Err(SyncError::Config(
                "max-wait-attempts must be at least 1".to_string(),
            ));
        }

        Ok(Config {
            action,
            base_name: args.name,
            file: PathBuf::from(args.file),
            region: args.region,
            profile: args.profile,
            max_wait_attempts: args.max_wait_attempts,
            parallel: args.parallel,
            dry_run: args.dry_run,
        })
    }
}
