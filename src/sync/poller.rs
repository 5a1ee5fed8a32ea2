//! Readiness polling.
//!
//! After every mutation the remote list passes through an `-in-progress`
//! state and rejects further mutations until it settles. The poller blocks
//! until the list reports a settled state.

use crate::api::PrefixListApi;
use crate::config::POLL_INTERVAL_SECS;
use crate::error::SyncError;
use crate::models::ManagedList;
use colored::Colorize;
use std::time::Duration;

/// How long to keep polling.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Fixed delay between two polls. No backoff.
    pub interval: Duration,
    /// Number of polls before giving up. `None` waits forever.
    pub max_attempts: Option<u32>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitPolicy {
            interval: Duration::from_secs(POLL_INTERVAL_SECS),
            max_attempts: None,
        }
    }
}

/// Blocking delay between polls, swappable in tests.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Default, Copy, Clone)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

pub struct ReadinessPoller<'a> {
    api: &'a dyn PrefixListApi,
    sleeper: &'a dyn Sleeper,
    policy: WaitPolicy,
}

impl<'a> ReadinessPoller<'a> {
    pub fn new(api: &'a dyn PrefixListApi, sleeper: &'a dyn Sleeper, policy: WaitPolicy) -> Self {
        ReadinessPoller {
            api,
            sleeper,
            policy,
        }
    }

    /// Describe the list until its state no longer contains `-in-progress`.
    ///
    /// The first describe happens immediately, every later one after one
    /// `interval`. A `-failed` state also ends the wait, it is only logged.
    pub fn wait_ready(&self, id: &str) -> Result<ManagedList, SyncError> {
        let mut attempts: u32 = 0;
        loop {
            let list = describe_one(self.api, id)?;
            attempts += 1;
            log::info!("Prefix list {id} state: {}", list.state);

            if !list.state.is_in_progress() {
                if list.state.is_failed() {
                    log::warn!(
                        "Prefix list {id} settled in {} {}",
                        list.state.as_str().on_red(),
                        list.state_message.as_deref().unwrap_or("")
                    );
                }
                return Ok(list);
            }

            if let Some(max) = self.policy.max_attempts {
                if attempts >= max {
                    return Err(SyncError::WaitTimeout {
                        id: id.to_string(),
                        attempts,
                    });
                }
            }
            self.sleeper.sleep(self.policy.interval);
        }
    }
}

/// Describe a single list by id.
pub fn describe_one(api: &dyn PrefixListApi, id: &str) -> Result<ManagedList, SyncError> {
    api.describe_managed_lists(Some(id))?
        .into_iter()
        .next()
        .ok_or_else(|| SyncError::ListNotFound(id.to_string()))
}
