//! Merge readiness polling
//!
//! GitLab recomputes `merge_status` asynchronously after an approval, so the
//! merge has to wait for it. The wait is bounded by [`PollPolicy`].

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::submit::progress::ProgressCallback;
use crate::types::MergeReadiness;
use std::time::Duration;
use tracing::debug;

/// Default number of readiness checks before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Default delay between readiness checks
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound on the delay when backing off
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(10);

/// How long and how often to wait for a merge request to become mergeable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    /// Maximum number of status checks
    pub max_attempts: u32,
    /// Delay after the first unsuccessful check
    pub interval: Duration,
    /// Delay cap
    pub max_interval: Duration,
    /// Multiplier applied to the delay after each unsuccessful check
    pub backoff: f64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
            backoff: 1.0,
        }
    }
}

impl PollPolicy {
    /// Delay to wait after unsuccessful check number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.backoff.max(1.0).powi(exponent);
        let secs = self.interval.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= self.max_interval.as_secs_f64() {
            return self.max_interval.max(self.interval);
        }
        Duration::from_secs_f64(secs)
    }
}

/// Poll until the merge request reports `can_be_merged`
///
/// Returns the number of checks performed. Exhausting the policy yields
/// [`Error::MergeBlocked`] if the last status was a blocking one, otherwise
/// [`Error::MergeReadinessTimeout`].
pub async fn wait_until_mergeable(
    platform: &dyn PlatformService,
    iid: u64,
    policy: &PollPolicy,
    progress: &dyn ProgressCallback,
) -> Result<u32> {
    let mut last = MergeReadiness::Pending(String::new());

    for attempt in 1..=policy.max_attempts {
        let readiness = platform.merge_readiness(iid).await?;
        progress.on_merge_status(attempt, &readiness).await;

        if readiness.is_ready() {
            debug!(iid, attempt, "merge request is mergeable");
            return Ok(attempt);
        }

        debug!(iid, attempt, status = %readiness, "merge request not mergeable yet");
        last = readiness;

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay_after(attempt)).await;
        }
    }

    let attempts = policy.max_attempts;
    match last {
        MergeReadiness::Blocked(_) => Err(Error::MergeBlocked { iid, attempts }),
        _ => Err(Error::MergeReadinessTimeout { iid, attempts }),
    }
}
