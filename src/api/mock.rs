//! In-memory prefix list backend for testing.
//!
//! Behaves like the EC2 service where it matters to the engine: versions are
//! checked on every mutation, a mutated list reports an `-in-progress` state
//! for a configurable number of describes and rejects further mutations
//! meanwhile, and per-request and capacity limits are enforced. Every call is
//! recorded in order.

use super::{op, PrefixListApi};
use crate::config::MAX_ENTRIES_PER_REQUEST;
use crate::error::SyncError;
use crate::models::{AddressFamily, ListState, ManagedList};
use crate::sync::Sleeper;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// One recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Create {
        name: String,
        family: AddressFamily,
        max_entries: usize,
        entries: Vec<String>,
    },
    Modify {
        id: String,
        version: i64,
        add: Vec<String>,
        remove: Vec<String>,
    },
    Resize {
        id: String,
        version: i64,
        max_entries: usize,
    },
    Describe {
        id: Option<String>,
    },
    GetEntries {
        id: String,
    },
}

impl ApiCall {
    /// True for calls that change a list.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ApiCall::Create { .. } | ApiCall::Modify { .. } | ApiCall::Resize { .. }
        )
    }
}

#[derive(Debug)]
struct MockList {
    list: ManagedList,
    entries: Vec<String>,
    /// Describes left before an in-progress state completes.
    busy_polls: u32,
    /// Operation prefix of the pending transition, e.g. "create".
    pending_op: &'static str,
    /// States served by describe before the simulated ones.
    scripted: VecDeque<String>,
}

#[derive(Debug, Default)]
struct MockState {
    lists: Vec<MockList>,
    calls: Vec<ApiCall>,
    next_id: u64,
    settle_after: u32,
    fail_on: Option<&'static str>,
}

impl MockState {
    fn find_mut(&mut self, id: &str, operation: &'static str) -> Result<&mut MockList, SyncError> {
        self.lists
            .iter_mut()
            .find(|l| l.list.prefix_list_id == id)
            .ok_or_else(|| {
                SyncError::remote(
                    operation,
                    format!("InvalidPrefixListID.NotFound: The prefix list ID '{id}' does not exist"),
                )
            })
    }

    fn check_failure(&mut self, operation: &'static str) -> Result<(), SyncError> {
        if self.fail_on == Some(operation) {
            self.fail_on = None;
            return Err(SyncError::remote(operation, "injected failure"));
        }
        Ok(())
    }
}

/// A test-double for [`PrefixListApi`].
pub struct MockPrefixLists {
    state: Mutex<MockState>,
}

impl MockPrefixLists {
    /// Mutated lists report in-progress for one describe, then complete.
    pub fn new() -> Self {
        Self::with_settle_after(1)
    }

    /// Mutated lists report in-progress for `describes` describes.
    pub fn with_settle_after(describes: u32) -> Self {
        MockPrefixLists {
            state: Mutex::new(MockState {
                settle_after: describes,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // a panicking test thread must not hide the state from the others
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add an existing, settled list. Returns its id.
    pub fn seed_list(
        &self,
        name: &str,
        family: AddressFamily,
        max_entries: usize,
        entries: &[&str],
    ) -> String {
        let mut state = self.lock();
        state.next_id += 1;
        let id = format!("pl-{:017x}", state.next_id);
        state.lists.push(MockList {
            list: ManagedList {
                prefix_list_id: id.clone(),
                prefix_list_name: name.to_string(),
                address_family: family,
                state: ListState::new("create-complete"),
                state_message: None,
                version: 1,
                max_entries,
            },
            entries: entries.iter().map(|e| e.to_string()).collect(),
            busy_polls: 0,
            pending_op: "create",
            scripted: VecDeque::new(),
        });
        id
    }

    /// Serve these states, in order, on the next describes of `id`.
    pub fn script_states(&self, id: &str, states: &[&str]) {
        let mut state = self.lock();
        if let Some(list) = state.lists.iter_mut().find(|l| l.list.prefix_list_id == id) {
            list.scripted.extend(states.iter().map(|s| s.to_string()));
        }
    }

    /// Make the next call of `operation` (see [`op`]) fail.
    pub fn fail_next(&self, operation: &'static str) {
        self.lock().fail_on = Some(operation);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn mutation_calls(&self) -> Vec<ApiCall> {
        self.calls().into_iter().filter(ApiCall::is_mutation).collect()
    }

    /// Number of describe calls made for one id.
    pub fn describe_count(&self, id: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::Describe { id: Some(d) } if d == id))
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn entries(&self, id: &str) -> Vec<String> {
        self.lock()
            .lists
            .iter()
            .find(|l| l.list.prefix_list_id == id)
            .map(|l| l.entries.clone())
            .unwrap_or_default()
    }

    pub fn list(&self, id: &str) -> Option<ManagedList> {
        self.lock()
            .lists
            .iter()
            .find(|l| l.list.prefix_list_id == id)
            .map(|l| l.list.clone())
    }

    /// All lists carrying `name`, in creation order.
    pub fn lists_named(&self, name: &str) -> Vec<ManagedList> {
        self.lock()
            .lists
            .iter()
            .filter(|l| l.list.prefix_list_name == name)
            .map(|l| l.list.clone())
            .collect()
    }
}

impl Default for MockPrefixLists {
    fn default() -> Self {
        Self::new()
    }
}

fn start_transition(list: &mut MockList, op_prefix: &'static str, settle_after: u32) {
    list.list.version += 1;
    list.list.state = ListState(format!("{op_prefix}-in-progress"));
    list.pending_op = op_prefix;
    list.busy_polls = settle_after;
}

fn check_mutable(list: &MockList, version: i64, operation: &'static str) -> Result<(), SyncError> {
    if list.list.state.is_in_progress() {
        return Err(SyncError::remote(
            operation,
            format!(
                "IncorrectState: The prefix list '{}' is in state {}",
                list.list.prefix_list_id, list.list.state
            ),
        ));
    }
    if version != list.list.version {
        return Err(SyncError::remote(
            operation,
            format!(
                "PrefixListVersionMismatch: The prefix list has changed. The current version is {}, got {version}",
                list.list.version
            ),
        ));
    }
    Ok(())
}

fn check_request_cap(count: usize, operation: &'static str) -> Result<(), SyncError> {
    if count > MAX_ENTRIES_PER_REQUEST {
        return Err(SyncError::remote(
            operation,
            format!("InvalidParameterValue: at most {MAX_ENTRIES_PER_REQUEST} entries per request, got {count}"),
        ));
    }
    Ok(())
}

impl PrefixListApi for MockPrefixLists {
    fn create_managed_list(
        &self,
        name: &str,
        family: AddressFamily,
        max_entries: usize,
        entries: &[String],
    ) -> Result<ManagedList, SyncError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::Create {
            name: name.to_string(),
            family,
            max_entries,
            entries: entries.to_vec(),
        });
        state.check_failure(op::CREATE)?;
        check_request_cap(entries.len(), op::CREATE)?;
        if entries.len() > max_entries {
            return Err(SyncError::remote(
                op::CREATE,
                "PrefixListMaxEntriesExceeded: too many entries for max-entries",
            ));
        }

        state.next_id += 1;
        let mut list = MockList {
            list: ManagedList {
                prefix_list_id: format!("pl-{:017x}", state.next_id),
                prefix_list_name: name.to_string(),
                address_family: family,
                state: ListState::default(),
                state_message: None,
                version: 0,
                max_entries,
            },
            entries: entries.to_vec(),
            busy_polls: 0,
            pending_op: "create",
            scripted: VecDeque::new(),
        };
        let settle_after = state.settle_after;
        start_transition(&mut list, "create", settle_after);
        let created = list.list.clone();
        state.lists.push(list);
        Ok(created)
    }

    fn modify_managed_list(
        &self,
        id: &str,
        current_version: i64,
        add: &[String],
        remove: &[String],
    ) -> Result<ManagedList, SyncError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::Modify {
            id: id.to_string(),
            version: current_version,
            add: add.to_vec(),
            remove: remove.to_vec(),
        });
        state.check_failure(op::MODIFY)?;
        check_request_cap(add.len(), op::MODIFY)?;
        check_request_cap(remove.len(), op::MODIFY)?;
        let settle_after = state.settle_after;
        let list = state.find_mut(id, op::MODIFY)?;
        check_mutable(list, current_version, op::MODIFY)?;

        if let Some(missing) = remove.iter().find(|e| !list.entries.contains(*e)) {
            return Err(SyncError::remote(
                op::MODIFY,
                format!("InvalidPrefixListModification: {missing} is not in the prefix list"),
            ));
        }
        if let Some(dup) = add.iter().find(|e| list.entries.contains(*e)) {
            return Err(SyncError::remote(
                op::MODIFY,
                format!("InvalidPrefixListModification: {dup} is already in the prefix list"),
            ));
        }
        let count = list.entries.len() + add.len() - remove.len();
        if count > list.list.max_entries {
            return Err(SyncError::remote(
                op::MODIFY,
                format!(
                    "PrefixListMaxEntriesExceeded: {count} entries exceed max-entries {}",
                    list.list.max_entries
                ),
            ));
        }

        list.entries.retain(|e| !remove.contains(e));
        list.entries.extend(add.iter().cloned());
        start_transition(list, "modify", settle_after);
        Ok(list.list.clone())
    }

    fn resize_managed_list(
        &self,
        id: &str,
        current_version: i64,
        max_entries: usize,
    ) -> Result<ManagedList, SyncError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::Resize {
            id: id.to_string(),
            version: current_version,
            max_entries,
        });
        state.check_failure(op::MODIFY)?;
        let settle_after = state.settle_after;
        let list = state.find_mut(id, op::MODIFY)?;
        check_mutable(list, current_version, op::MODIFY)?;
        if max_entries < list.entries.len() {
            return Err(SyncError::remote(
                op::MODIFY,
                "InvalidParameterValue: max-entries is below the current entry count",
            ));
        }

        list.list.max_entries = max_entries;
        start_transition(list, "modify", settle_after);
        Ok(list.list.clone())
    }

    fn describe_managed_lists(&self, id: Option<&str>) -> Result<Vec<ManagedList>, SyncError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::Describe {
            id: id.map(str::to_string),
        });
        state.check_failure(op::DESCRIBE)?;

        let Some(id) = id else {
            return Ok(state.lists.iter().map(|l| l.list.clone()).collect());
        };
        let Some(list) = state.lists.iter_mut().find(|l| l.list.prefix_list_id == id) else {
            return Ok(vec![]);
        };

        if let Some(scripted) = list.scripted.pop_front() {
            list.list.state = ListState(scripted);
        } else if list.busy_polls > 0 {
            list.busy_polls -= 1;
        } else if list.list.state.is_in_progress() {
            list.list.state = ListState(format!("{}-complete", list.pending_op));
        }
        Ok(vec![list.list.clone()])
    }

    fn get_managed_list_entries(&self, id: &str) -> Result<Vec<String>, SyncError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::GetEntries { id: id.to_string() });
        state.check_failure(op::GET_ENTRIES)?;
        let list = state.find_mut(id, op::GET_ENTRIES)?;
        Ok(list.entries.clone())
    }
}

/// A [`Sleeper`] that records naps instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    naps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn naps(&self) -> Vec<Duration> {
        self.naps.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.naps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cidrs(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_modify_rejects_stale_version() {
        let api = MockPrefixLists::with_settle_after(0);
        let id = api.seed_list("office-ipv4", AddressFamily::V4, 10, &["10.0.0.0/24"]);
        let err = api
            .modify_managed_list(&id, 0, &cidrs(&["10.0.1.0/24"]), &[])
            .unwrap_err();
        assert!(err.to_string().contains("PrefixListVersionMismatch"), "{err}");
        api.modify_managed_list(&id, 1, &cidrs(&["10.0.1.0/24"]), &[])
            .expect("current version is accepted");
        assert_eq!(api.list(&id).unwrap().version, 2);
    }

    #[test]
    fn test_modify_rejected_while_in_progress() {
        let api = MockPrefixLists::with_settle_after(2);
        let id = api.seed_list("office-ipv4", AddressFamily::V4, 10, &[]);
        api.modify_managed_list(&id, 1, &cidrs(&["10.0.1.0/24"]), &[])
            .unwrap();
        let err = api
            .modify_managed_list(&id, 2, &cidrs(&["10.0.2.0/24"]), &[])
            .unwrap_err();
        assert!(err.to_string().contains("IncorrectState"), "{err}");
    }

    #[test]
    fn test_describe_settles_after_configured_polls() {
        let api = MockPrefixLists::with_settle_after(2);
        let list = api
            .create_managed_list("office-ipv4", AddressFamily::V4, 5, &cidrs(&["10.0.0.0/24"]))
            .unwrap();
        let id = list.prefix_list_id;
        let states: Vec<String> = (0..3)
            .map(|_| api.describe_managed_lists(Some(&id)).unwrap()[0].state.to_string())
            .collect();
        assert_eq!(
            states,
            vec!["create-in-progress", "create-in-progress", "create-complete"]
        );
    }

    #[test]
    fn test_capacity_enforced() {
        let api = MockPrefixLists::with_settle_after(0);
        let id = api.seed_list("office-ipv4", AddressFamily::V4, 1, &["10.0.0.0/24"]);
        let err = api
            .modify_managed_list(&id, 1, &cidrs(&["10.0.1.0/24"]), &[])
            .unwrap_err();
        assert!(err.to_string().contains("PrefixListMaxEntriesExceeded"), "{err}");
    }

    #[test]
    fn test_fail_next_is_one_shot() {
        let api = MockPrefixLists::new();
        api.fail_next(op::DESCRIBE);
        assert!(api.describe_managed_lists(None).is_err());
        assert!(api.describe_managed_lists(None).is_ok());
    }
}
