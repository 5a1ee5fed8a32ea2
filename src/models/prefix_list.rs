//! Managed prefix list model, as reported by the remote.

use super::AddressFamily;
use serde::{Deserialize, Serialize};

/// Marker carried by every transitional state (`create-in-progress`, ...).
pub const IN_PROGRESS_MARKER: &str = "-in-progress";
const FAILED_MARKER: &str = "-failed";

/// Lifecycle state string of a prefix list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct ListState(pub String);

impl ListState {
    pub fn new(state: &str) -> ListState {
        ListState(state.to_string())
    }

    /// True while the remote still applies a change. Mutations are rejected
    /// in this window.
    pub fn is_in_progress(&self) -> bool {
        self.0.contains(IN_PROGRESS_MARKER)
    }

    pub fn is_failed(&self) -> bool {
        self.0.contains(FAILED_MARKER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ListState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A managed prefix list. Field names follow the EC2 JSON output.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ManagedList {
    /// Identifier assigned by the remote on creation.
    pub prefix_list_id: String,
    /// Human assigned name, not unique.
    pub prefix_list_name: String,
    pub address_family: AddressFamily,
    pub state: ListState,
    /// Reason for a failed state, if the remote gave one.
    #[serde(default)]
    pub state_message: Option<String>,
    /// Incremented by every successful mutation. AWS managed lists omit it.
    #[serde(default)]
    pub version: i64,
    /// Capacity. AWS managed lists omit it.
    #[serde(default)]
    pub max_entries: usize,
}

/// Identifier plus the version observed by the most recent read.
///
/// Acquired with a fresh describe right before a mutating call and consumed
/// by that call. Never hold one across a readiness wait.
#[derive(Debug, PartialEq, Eq)]
pub struct VersionedHandle {
    pub id: String,
    pub version: i64,
}

impl From<&ManagedList> for VersionedHandle {
    fn from(list: &ManagedList) -> Self {
        VersionedHandle {
            id: list.prefix_list_id.clone(),
            version: list.version,
        }
    }
}

/// One mutation batch. Each side holds at most the per-request cap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Chunk {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl Chunk {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}
