//! Output of a run.
//!
//! - [`report`] - per-family summary printed when a run completes

mod report;

pub use report::SyncReport;
