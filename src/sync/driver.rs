//! Create and update workflows.
//!
//! Both run per address family: batch the entries, then for every chunk do
//! one version-gated mutation followed by a readiness wait. No chunk starts
//! before the previous one has settled.

use super::mutator::VersionGatedMutator;
use super::poller::{ReadinessPoller, Sleeper, WaitPolicy};
use crate::api::PrefixListApi;
use crate::config::{Action, MAX_ENTRIES_PER_REQUEST};
use crate::error::SyncError;
use crate::models::{AddressFamily, Chunk, EntrySet, FamilySets, ManagedList, VersionedHandle};
use crate::output::SyncReport;
use crate::processing::{chunk_entries, diff_entries, pair_chunks};
use std::sync::Arc;

/// What to do, independent of the family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub action: Action,
    /// Base list name, the family suffix is appended per family.
    pub base_name: String,
    pub dry_run: bool,
}

pub struct Reconciler {
    api: Arc<dyn PrefixListApi>,
    sleeper: Arc<dyn Sleeper>,
    policy: WaitPolicy,
    chunk_size: usize,
}

impl Reconciler {
    pub fn new(api: Arc<dyn PrefixListApi>, sleeper: Arc<dyn Sleeper>, policy: WaitPolicy) -> Self {
        Reconciler {
            api,
            sleeper,
            policy,
            chunk_size: MAX_ENTRIES_PER_REQUEST,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn mutator(&self) -> VersionGatedMutator<'_> {
        VersionGatedMutator::new(self.api.as_ref())
    }

    fn poller(&self) -> ReadinessPoller<'_> {
        ReadinessPoller::new(self.api.as_ref(), self.sleeper.as_ref(), self.policy)
    }

    /// Run `job` for one family.
    pub fn reconcile(
        &self,
        job: &Job,
        family: AddressFamily,
        desired: &EntrySet,
    ) -> Result<SyncReport, SyncError> {
        let name = family.list_name(&job.base_name);
        match job.action {
            Action::Create => self.create_list(&name, family, desired, job.dry_run),
            Action::Update => self.update_list(&name, family, desired, job.dry_run),
        }
    }

    /// Create a new list holding `desired`.
    ///
    /// The first chunk goes into the create call with capacity `|desired|`,
    /// the rest are added one chunk at a time. An empty set creates nothing.
    pub fn create_list(
        &self,
        name: &str,
        family: AddressFamily,
        desired: &EntrySet,
        dry_run: bool,
    ) -> Result<SyncReport, SyncError> {
        let entries = desired.as_slice();
        let chunks = chunk_entries(entries, self.chunk_size);

        let mut report = SyncReport::new(Action::Create, family, name);
        report.added = entries.len();
        report.chunks = chunks.len();
        report.dry_run = dry_run;

        let Some((first, rest)) = chunks.split_first() else {
            log::warn!("No {family} entries, prefix list {name} not created");
            return Ok(report);
        };
        if dry_run {
            log::info!(
                "Would create {name} with {} entries in {} chunks",
                entries.len(),
                chunks.len()
            );
            return Ok(report);
        }

        let mutator = self.mutator();
        let poller = self.poller();

        log::info!("{name}: chunk 1/{} add={}", chunks.len(), first.len());
        let VersionedHandle { id, mut version } =
            mutator.create(name, family, first, entries.len())?;
        report.list_id = Some(id.clone());
        poller.wait_ready(&id)?;

        for (i, part) in rest.iter().enumerate() {
            log::info!("{name}: chunk {}/{} add={}", i + 2, chunks.len(), part.len());
            let chunk = Chunk {
                add: part.to_vec(),
                remove: vec![],
            };
            version = mutator.apply_chunk(&id, &chunk)?;
            poller.wait_ready(&id)?;
        }

        report.final_version = Some(version);
        Ok(report)
    }

    /// Find a list by exact name. The first match wins when names repeat.
    pub fn find_list(&self, name: &str) -> Result<ManagedList, SyncError> {
        let mut matches: Vec<ManagedList> = self
            .api
            .describe_managed_lists(None)?
            .into_iter()
            .filter(|l| l.prefix_list_name == name)
            .collect();
        if matches.len() > 1 {
            log::warn!(
                "{} prefix lists named {name}, using {}",
                matches.len(),
                matches[0].prefix_list_id
            );
        }
        if matches.is_empty() {
            return Err(SyncError::ListNotFound(name.to_string()));
        }
        Ok(matches.swap_remove(0))
    }

    /// Reconcile an existing list to hold exactly `desired`.
    pub fn update_list(
        &self,
        name: &str,
        family: AddressFamily,
        desired: &EntrySet,
        dry_run: bool,
    ) -> Result<SyncReport, SyncError> {
        let list = self.find_list(name)?;
        let id = list.prefix_list_id.clone();
        let current: EntrySet = self.api.get_managed_list_entries(&id)?.into_iter().collect();

        let diff = diff_entries(desired, &current);
        let chunks = pair_chunks(&diff.to_add, &diff.to_remove, self.chunk_size);
        log::info!(
            "{name} ({id}): current={} desired={} add={} remove={} chunks={}",
            current.len(),
            desired.len(),
            diff.to_add.len(),
            diff.to_remove.len(),
            chunks.len()
        );

        let mut report = SyncReport::new(Action::Update, family, name);
        report.list_id = Some(id.clone());
        report.added = diff.to_add.len();
        report.removed = diff.to_remove.len();
        report.chunks = chunks.len();
        report.dry_run = dry_run;
        report.final_version = Some(list.version);
        if !chunks.is_empty() && desired.len() > list.max_entries {
            report.resized_to = Some(desired.len());
        }

        if dry_run {
            for (i, chunk) in chunks.iter().enumerate() {
                log::info!(
                    "{name}: would apply chunk {}/{} add={:?} remove={:?}",
                    i + 1,
                    chunks.len(),
                    chunk.add,
                    chunk.remove
                );
            }
            return Ok(report);
        }
        if chunks.is_empty() {
            log::info!("{name} already in sync");
            return Ok(report);
        }

        let mutator = self.mutator();
        let poller = self.poller();

        if let Some(max_entries) = report.resized_to {
            log::info!(
                "{name}: raising max-entries {} -> {max_entries}",
                list.max_entries
            );
            mutator.resize(&id, max_entries)?;
            poller.wait_ready(&id)?;
        }

        let mut version = list.version;
        for (i, chunk) in chunks.iter().enumerate() {
            log::info!(
                "{name}: chunk {}/{} add={} remove={}",
                i + 1,
                chunks.len(),
                chunk.add.len(),
                chunk.remove.len()
            );
            version = mutator.apply_chunk(&id, chunk)?;
            poller.wait_ready(&id)?;
        }

        report.final_version = Some(version);
        Ok(report)
    }
}

/// Run `job` for both families.
///
/// Sequential runs go IPv4 then IPv6 and stop at the first error. Parallel
/// runs use one blocking task per family; the families touch different
/// lists, so the only shared thing is the api client. On failure in
/// parallel mode the other family still runs to its end, and the IPv4 error
/// is reported first.
pub async fn run_families(
    reconciler: Arc<Reconciler>,
    job: Job,
    sets: FamilySets,
    parallel: bool,
) -> Result<Vec<SyncReport>, SyncError> {
    let sets = Arc::new(sets);

    if parallel {
        let tasks = AddressFamily::ALL.into_iter().map(|family| {
            let reconciler = Arc::clone(&reconciler);
            let job = job.clone();
            let sets = Arc::clone(&sets);
            tokio::task::spawn_blocking(move || reconciler.reconcile(&job, family, sets.get(family)))
        });
        let results = futures::future::try_join_all(tasks)
            .await
            .map_err(|e| SyncError::Task(e.to_string()))?;
        return results.into_iter().collect();
    }

    tokio::task::spawn_blocking(move || {
        AddressFamily::ALL
            .into_iter()
            .map(|family| reconciler.reconcile(&job, family, sets.get(family)))
            .collect::<Result<Vec<_>, _>>()
    })
    .await
    .map_err(|e| SyncError::Task(e.to_string()))?
}
