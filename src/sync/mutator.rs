//! Version-gated mutations.
//!
//! The remote uses optimistic concurrency: every mutation carries the
//! version the caller last saw and is rejected if the list moved on. Each
//! mutation here therefore goes `VERSION_READ -> MUTATING -> done`, with the
//! version read by a fresh describe right before the call.

use super::poller::describe_one;
use crate::api::PrefixListApi;
use crate::error::SyncError;
use crate::models::{AddressFamily, Chunk, VersionedHandle};

pub struct VersionGatedMutator<'a> {
    api: &'a dyn PrefixListApi,
}

impl<'a> VersionGatedMutator<'a> {
    pub fn new(api: &'a dyn PrefixListApi) -> Self {
        VersionGatedMutator { api }
    }

    /// Create a list with capacity `total_count` holding the first chunk.
    ///
    /// No existence check, a second create with the same name makes a
    /// second list.
    pub fn create(
        &self,
        name: &str,
        family: AddressFamily,
        first_chunk: &[String],
        total_count: usize,
    ) -> Result<VersionedHandle, SyncError> {
        let list = self
            .api
            .create_managed_list(name, family, total_count, first_chunk)?;
        log::info!(
            "Created prefix list with ID: {} version={} entries={}",
            list.prefix_list_id,
            list.version,
            first_chunk.len()
        );
        Ok(VersionedHandle::from(&list))
    }

    /// Read the current version of a list.
    pub fn acquire(&self, id: &str) -> Result<VersionedHandle, SyncError> {
        let list = describe_one(self.api, id)?;
        log::debug!("Prefix list {id} at version {}", list.version);
        Ok(VersionedHandle::from(&list))
    }

    /// Apply one chunk. Returns the version reported by the remote.
    pub fn apply_chunk(&self, id: &str, chunk: &Chunk) -> Result<i64, SyncError> {
        let handle = self.acquire(id)?;
        self.modify(handle, chunk)
    }

    /// Raise the capacity of a list to `max_entries`.
    pub fn resize(&self, id: &str, max_entries: usize) -> Result<i64, SyncError> {
        let handle = self.acquire(id)?;
        let list = self
            .api
            .resize_managed_list(&handle.id, handle.version, max_entries)?;
        log::info!(
            "Resized prefix list {id} to max-entries={max_entries} version={}",
            list.version
        );
        Ok(list.version)
    }

    // Takes the handle by value so it cannot be reused for a second call.
    fn modify(&self, handle: VersionedHandle, chunk: &Chunk) -> Result<i64, SyncError> {
        let list =
            self.api
                .modify_managed_list(&handle.id, handle.version, &chunk.add, &chunk.remove)?;
        log::info!(
            "Updated prefix list with ID: {} version={}->{} add={} remove={}",
            handle.id,
            handle.version,
            list.version,
            chunk.add.len(),
            chunk.remove.len()
        );
        Ok(list.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{ApiCall, MockPrefixLists};

    fn chunk(add: &[&str], remove: &[&str]) -> Chunk {
        Chunk {
            add: add.iter().map(|e| e.to_string()).collect(),
            remove: remove.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_create_returns_initial_handle() {
        let api = MockPrefixLists::new();
        let first = vec!["10.0.0.0/24".to_string()];
        let handle = VersionGatedMutator::new(&api)
            .create("office-ipv4", AddressFamily::V4, &first, 250)
            .unwrap();
        assert_eq!(handle.version, 1);
        assert_eq!(
            api.calls(),
            vec![ApiCall::Create {
                name: "office-ipv4".to_string(),
                family: AddressFamily::V4,
                max_entries: 250,
                entries: first,
            }]
        );
    }

    #[test]
    fn test_apply_chunk_reads_version_first() {
        let api = MockPrefixLists::with_settle_after(0);
        let id = api.seed_list("office-ipv4", AddressFamily::V4, 10, &["10.0.0.0/24"]);
        let mutator = VersionGatedMutator::new(&api);

        let v2 = mutator
            .apply_chunk(&id, &chunk(&["10.0.1.0/24"], &["10.0.0.0/24"]))
            .unwrap();
        let v3 = mutator.apply_chunk(&id, &chunk(&["10.0.2.0/24"], &[])).unwrap();
        assert_eq!((v2, v3), (2, 3));

        let calls = api.calls();
        assert_eq!(calls.len(), 4, "describe + modify per chunk");
        assert_eq!(calls[0], ApiCall::Describe { id: Some(id.clone()) });
        assert!(matches!(&calls[1], ApiCall::Modify { version: 1, .. }));
        assert_eq!(calls[2], ApiCall::Describe { id: Some(id.clone()) });
        assert!(matches!(&calls[3], ApiCall::Modify { version: 2, .. }));
        assert_eq!(api.entries(&id), vec!["10.0.1.0/24", "10.0.2.0/24"]);
    }

    #[test]
    fn test_apply_chunk_picks_up_external_changes() {
        let api = MockPrefixLists::with_settle_after(0);
        let id = api.seed_list("office-ipv4", AddressFamily::V4, 10, &[]);
        // someone else bumps the version between our chunks
        api.modify_managed_list(&id, 1, &["10.9.0.0/16".to_string()], &[])
            .unwrap();
        let version = VersionGatedMutator::new(&api)
            .apply_chunk(&id, &chunk(&["10.0.0.0/24"], &[]))
            .expect("fresh version read avoids the stale token");
        assert_eq!(version, 3);
    }

    #[test]
    fn test_remote_failure_propagates() {
        let api = MockPrefixLists::with_settle_after(0);
        let id = api.seed_list("office-ipv4", AddressFamily::V4, 10, &[]);
        api.fail_next(crate::api::op::MODIFY);
        let err = VersionGatedMutator::new(&api)
            .apply_chunk(&id, &chunk(&["10.0.0.0/24"], &[]))
            .unwrap_err();
        assert!(matches!(err, SyncError::Remote { .. }));
    }

    #[test]
    fn test_resize() {
        let api = MockPrefixLists::with_settle_after(0);
        let id = api.seed_list("office-ipv4", AddressFamily::V4, 10, &[]);
        let version = VersionGatedMutator::new(&api).resize(&id, 300).unwrap();
        assert_eq!(version, 2);
        assert_eq!(api.list(&id).unwrap().max_entries, 300);
    }
}
