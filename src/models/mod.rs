//! Domain models for prefix list synchronization.
//!
//! - [`Cidr`] and [`classify`] - CIDR line validation and family detection
//! - [`EntrySet`] and [`FamilySets`] - desired and current entries
//! - [`AddressFamily`] - IPv4 / IPv6 list split
//! - [`ManagedList`], [`VersionedHandle`], [`Chunk`] - remote list and mutation batch

pub mod cidr;
mod entry_set;
mod family;
mod prefix_list;

pub use cidr::{classify, Cidr};
pub use entry_set::{parse_entry_sets, read_entry_sets, EntrySet, FamilySets};
pub use family::AddressFamily;
pub use prefix_list::{Chunk, ListState, ManagedList, VersionedHandle, IN_PROGRESS_MARKER};
