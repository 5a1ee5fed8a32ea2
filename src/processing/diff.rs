//! Desired vs current entry diff.

use crate::models::EntrySet;

/// Entries to add to and remove from a remote list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDiff {
    /// `desired \ current`, in desired order.
    pub to_add: Vec<String>,
    /// `current \ desired`, in current order.
    pub to_remove: Vec<String>,
}

impl EntryDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the add and remove sets that turn `current` into `desired`.
///
/// Entries present on both sides are left alone.
pub fn diff_entries(desired: &EntrySet, current: &EntrySet) -> EntryDiff {
    let to_add = desired
        .iter()
        .filter(|e| !current.contains(e))
        .cloned()
        .collect();
    let to_remove = current
        .iter()
        .filter(|e| !desired.contains(e))
        .cloned()
        .collect();
    EntryDiff { to_add, to_remove }
}
