//! Remote prefix list API.
//!
//! Provides the [`PrefixListApi`] trait and two implementations:
//! [`crate::aws::AwsCliPrefixLists`] (production) and [`mock::MockPrefixLists`]
//! (testing). All calls are blocking request/response.

pub mod mock;

use crate::error::SyncError;
use crate::models::{AddressFamily, ManagedList};

/// Remote operation names, as used in errors and logs.
pub mod op {
    pub const CREATE: &str = "CreateManagedPrefixList";
    pub const MODIFY: &str = "ModifyManagedPrefixList";
    pub const DESCRIBE: &str = "DescribeManagedPrefixLists";
    pub const GET_ENTRIES: &str = "GetManagedPrefixListEntries";
}

/// The narrow surface of the cloud API the engine depends on.
pub trait PrefixListApi: Send + Sync {
    /// Create a list with `max_entries` capacity, pre-populated with `entries`.
    fn create_managed_list(
        &self,
        name: &str,
        family: AddressFamily,
        max_entries: usize,
        entries: &[String],
    ) -> Result<ManagedList, SyncError>;

    /// Add and remove entries. `current_version` must match the remote's
    /// version or the call fails.
    fn modify_managed_list(
        &self,
        id: &str,
        current_version: i64,
        add: &[String],
        remove: &[String],
    ) -> Result<ManagedList, SyncError>;

    /// Change the capacity of a list. Cannot be combined with entry changes.
    fn resize_managed_list(
        &self,
        id: &str,
        current_version: i64,
        max_entries: usize,
    ) -> Result<ManagedList, SyncError>;

    /// Describe one list by id, or every visible list when `id` is `None`.
    fn describe_managed_lists(&self, id: Option<&str>) -> Result<Vec<ManagedList>, SyncError>;

    /// All entries currently in a list.
    fn get_managed_list_entries(&self, id: &str) -> Result<Vec<String>, SyncError>;
}
