//! Sync CIDR blocks from a flat text file into EC2 managed prefix lists.
//!
//! The input is split by address family into `<name>-ipv4` and
//! `<name>-ipv6` lists. `create` builds new lists, `update` reconciles
//! existing ones. Both push entries in chunks of at most 100 per side, each
//! chunk a version-gated modify followed by a wait for the list to settle.

pub mod api;
pub mod aws;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;
pub mod sync;

use api::PrefixListApi;
use config::Config;
use error::SyncError;
use output::SyncReport;
use std::sync::Arc;
use sync::{Job, Reconciler, Sleeper, ThreadSleeper};

/// Run a validated configuration against the AWS CLI.
pub async fn run(config: Config) -> Result<Vec<SyncReport>, SyncError> {
    let api = aws::AwsCliPrefixLists::new(config.region.clone(), config.profile.clone());
    run_with(config, Arc::new(api), Arc::new(ThreadSleeper)).await
}

/// Run a validated configuration against any [`PrefixListApi`].
///
/// The input file is read before the first remote call.
pub async fn run_with(
    config: Config,
    api: Arc<dyn PrefixListApi>,
    sleeper: Arc<dyn Sleeper>,
) -> Result<Vec<SyncReport>, SyncError> {
    let sets = models::read_entry_sets(&config.file)?;
    log::info!(
        "Desired entries: ipv4={} ipv6={}",
        sets.ipv4.len(),
        sets.ipv6.len()
    );

    let reconciler = Reconciler::new(api, sleeper, config.wait_policy());
    let job = Job {
        action: config.action,
        base_name: config.base_name.clone(),
        dry_run: config.dry_run,
    };
    sync::run_families(Arc::new(reconciler), job, sets, config.parallel).await
}
