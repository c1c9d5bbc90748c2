//! Page fetching with bounded retry.
//!
//! Rate limiting backs off linearly with the attempt number, network errors
//! wait a fixed delay. All waiting goes through [`Sleeper`] so tests can run
//! the policy without real time passing.

use crate::source::{PageIndicator, PageOutcome, PageSource};
use async_trait::async_trait;
use shared::config::ScraperConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Something that can wait
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeping on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry policy for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per page, first one included
    pub max_attempts: u32,
    /// Multiplied by the attempt number after a 429
    pub rate_limit_backoff: Duration,
    /// Wait after a network error
    pub transient_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_backoff: Duration::from_secs(4),
            transient_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            rate_limit_backoff: Duration::from_secs(config.rate_limit_backoff_secs),
            transient_delay: Duration::from_secs(config.transient_retry_delay_secs),
        }
    }

    /// Wait after the `attempt`-th (1-based) rate-limited response
    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        self.rate_limit_backoff * attempt
    }
}

/// Fetches one page, absorbing transient faults
///
/// Returns either `Success` or `HardFailure`; `RateLimited` and
/// `TransientError` never leave this type.
pub struct PageFetcher {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl PageFetcher {
    pub fn new(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch `page` from `source`, retrying per the policy
    pub async fn fetch(&self, source: &dyn PageSource, page: PageIndicator) -> PageOutcome {
        let max_attempts = self.policy.max_attempts;
        let mut last_cause = String::new();

        for attempt in 1..=max_attempts {
            debug!(source = source.name(), page = %page, attempt = attempt, "Fetching page");

            let delay = match source.fetch_page(page).await {
                outcome @ (PageOutcome::Success(_) | PageOutcome::HardFailure(_)) => {
                    return outcome;
                }
                PageOutcome::RateLimited => {
                    last_cause = "rate limited".to_string();
                    self.policy.rate_limit_delay(attempt)
                }
                PageOutcome::TransientError(cause) => {
                    last_cause = cause;
                    self.policy.transient_delay
                }
            };

            if attempt < max_attempts {
                warn!(
                    page = %page,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    cause = %last_cause,
                    "Page request failed, retrying"
                );
                self.sleeper.sleep(delay).await;
            }
        }

        PageOutcome::HardFailure(format!(
            "{} failed after {} attempts: {}",
            page, max_attempts, last_cause
        ))
    }
}
