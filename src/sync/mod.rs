//! The reconciliation engine.
//!
//! - [`mutator`] - version-gated create / modify / resize calls
//! - [`poller`] - waiting for a list to leave its `-in-progress` state
//! - [`driver`] - create and update workflows over both families

mod driver;
mod mutator;
mod poller;

pub use driver::{run_families, Job, Reconciler};
pub use mutator::VersionGatedMutator;
pub use poller::{describe_one, ReadinessPoller, Sleeper, ThreadSleeper, WaitPolicy};
