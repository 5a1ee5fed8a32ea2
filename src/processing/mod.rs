//! Pure computations behind a reconciliation:
//! - [`diff`] - add/remove sets between desired and current entries
//! - [`batch`] - splitting those sets into request sized chunks

mod batch;
mod diff;

pub use batch::{chunk_entries, pair_chunks};
pub use diff::{diff_entries, EntryDiff};
