//! Pagination driver.
//!
//! Walks a [`PageSource`] from its first page until a termination predicate
//! fires or a page fails for good, accumulating normalized records on the
//! way. Whatever was accumulated is returned in both cases.

use crate::accumulator::{Accumulator, Pushed};
use crate::api::JikanSource;
use crate::fetcher::{PageFetcher, RetryPolicy, Sleeper};
use crate::markup::RankingPageSource;
use crate::normalize::normalize;
use crate::source::{PageIndicator, PageOutcome, PageSource, PaginationMode};
use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::config::ScraperConfig;
use shared::{AnimeRecord, SourceKind};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Loop settings that are not part of the retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSettings {
    /// Courtesy delay between consecutive pages
    pub page_delay: Duration,
    /// Delay before re-requesting a page that came back empty
    pub empty_page_cooldown: Duration,
    /// Consecutive empty pages tolerated in implicit mode
    pub empty_page_tolerance: u32,
    /// Stop after this many successful pages
    pub max_pages: Option<u32>,
}

impl DriverSettings {
    /// Settings for the configured source
    pub fn from_config(config: &ScraperConfig) -> Self {
        let page_delay_ms = match config.source {
            SourceKind::Api => config.api.page_delay_ms,
            SourceKind::Markup => config.markup.page_delay_ms,
        };
        let page_delay = Duration::from_millis(page_delay_ms);

        Self {
            page_delay,
            empty_page_cooldown: page_delay * 2,
            empty_page_tolerance: config.empty_page_tolerance,
            max_pages: config.max_pages,
        }
    }
}

/// Why a run ended without a hard failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    /// The source said so, or returned a short page
    LastPage,
    /// An explicit-mode page had no usable items
    EmptyPage,
    /// Too many consecutive empty pages
    EmptyStreak,
    /// The configured page cap was reached
    PageCap,
}

impl fmt::Display for DoneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoneReason::LastPage => write!(f, "last page reached"),
            DoneReason::EmptyPage => write!(f, "empty page"),
            DoneReason::EmptyStreak => write!(f, "consecutive empty pages"),
            DoneReason::PageCap => write!(f, "page cap reached"),
        }
    }
}

/// Loop state
#[derive(Debug, Clone, PartialEq)]
pub enum DriverState {
    Fetching(PageIndicator),
    Done(DoneReason),
    Failed { page: PageIndicator, cause: String },
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Complete(DoneReason),
    /// A page failed for good; records before it are kept
    Partial { page: PageIndicator, cause: String },
}

/// Result of one run, handed to the sink by value
#[derive(Debug, Clone)]
pub struct RunReport {
    pub records: Vec<AnimeRecord>,
    pub status: RunStatus,
    pub pages_fetched: u32,
    pub rejected: usize,
    pub replaced: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        matches!(self.status, RunStatus::Complete(_))
    }
}

/// Sequential page walker over one source
pub struct PaginationDriver {
    source: Arc<dyn PageSource>,
    fetcher: PageFetcher,
    sleeper: Arc<dyn Sleeper>,
    settings: DriverSettings,
}

impl PaginationDriver {
    pub fn new(
        source: Arc<dyn PageSource>,
        policy: RetryPolicy,
        settings: DriverSettings,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            source,
            fetcher: PageFetcher::new(policy, sleeper.clone()),
            sleeper,
            settings,
        }
    }

    /// Build the configured source and a driver around it
    pub fn from_config(config: &ScraperConfig, sleeper: Arc<dyn Sleeper>) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let source: Arc<dyn PageSource> = match config.source {
            SourceKind::Api => Arc::new(JikanSource::new(&config.api, timeout)?),
            SourceKind::Markup => Arc::new(RankingPageSource::new(&config.markup, timeout)?),
        };

        Ok(Self::new(
            source,
            RetryPolicy::from_config(config),
            DriverSettings::from_config(config),
            sleeper,
        ))
    }

    /// Walk the source to completion or failure
    pub async fn run(self) -> RunReport {
        let started_at = Utc::now();
        let mut accumulator = Accumulator::new();
        let mut pages_fetched = 0u32;
        let mut rejected = 0usize;
        let mut replaced = 0usize;
        let mut empty_streak = 0u32;

        info!(
            source = self.source.name(),
            max_attempts = self.fetcher.policy().max_attempts,
            page_delay_ms = self.settings.page_delay.as_millis() as u64,
            "Starting pagination"
        );

        let mut state = DriverState::Fetching(self.source.first_page());

        let status = loop {
            let page = match state {
                DriverState::Fetching(page) => page,
                DriverState::Done(reason) => break RunStatus::Complete(reason),
                DriverState::Failed { page, cause } => break RunStatus::Partial { page, cause },
            };

            let raw = match self.fetcher.fetch(self.source.as_ref(), page).await {
                PageOutcome::Success(raw) => raw,
                PageOutcome::HardFailure(cause) => {
                    error!(page = %page, cause = %cause, "Page failed, stopping");
                    state = DriverState::Failed { page, cause };
                    continue;
                }
                other => {
                    state = DriverState::Failed {
                        page,
                        cause: format!("fetcher returned {}", other.kind()),
                    };
                    continue;
                }
            };

            pages_fetched += 1;
            let is_last = self.source.is_last_page(&raw);
            let raw_items = raw.items.len();
            let last_page = raw.last_page;

            let mut usable = 0usize;
            for item in raw.items {
                match normalize(item) {
                    Ok(record) => {
                        usable += 1;
                        if accumulator.push(record) == Pushed::Replaced {
                            replaced += 1;
                        }
                    }
                    Err(reason) => {
                        rejected += 1;
                        debug!(page = %page, reason = %reason, "Item rejected");
                    }
                }
            }

            info!(
                page = %page,
                got = usable,
                raw_items = raw_items,
                last_page = ?last_page,
                total = accumulator.len(),
                "Page fetched"
            );

            state = self.next_state(page, usable, is_last, pages_fetched, &mut empty_streak);

            if let DriverState::Fetching(next) = state {
                let delay = if next == page {
                    self.settings.empty_page_cooldown
                } else {
                    self.settings.page_delay
                };
                self.sleeper.sleep(delay).await;
            }
        };

        let finished_at = Utc::now();
        match &status {
            RunStatus::Complete(reason) => info!(
                reason = %reason,
                pages = pages_fetched,
                records = accumulator.len(),
                "Pagination complete"
            ),
            RunStatus::Partial { page, cause } => warn!(
                failed_page = %page,
                cause = %cause,
                pages = pages_fetched,
                records = accumulator.len(),
                "Pagination stopped early, keeping partial results"
            ),
        }

        RunReport {
            records: accumulator.into_records(),
            status,
            pages_fetched,
            rejected,
            replaced,
            started_at,
            finished_at,
        }
    }

    /// Termination predicate for a successful page
    ///
    /// A capped run ends here, before any courtesy delay.
    fn next_state(
        &self,
        page: PageIndicator,
        usable: usize,
        is_last: bool,
        pages_fetched: u32,
        empty_streak: &mut u32,
    ) -> DriverState {
        let next = if usable == 0 {
            match self.source.pagination() {
                PaginationMode::Explicit => return DriverState::Done(DoneReason::EmptyPage),
                PaginationMode::Implicit { .. } => {
                    *empty_streak += 1;
                    if *empty_streak > self.settings.empty_page_tolerance {
                        info!(streak = *empty_streak, "No more results");
                        return DriverState::Done(DoneReason::EmptyStreak);
                    }
                    warn!(
                        page = %page,
                        streak = *empty_streak,
                        tolerance = self.settings.empty_page_tolerance,
                        "Empty page, retrying"
                    );
                    page
                }
            }
        } else {
            *empty_streak = 0;
            if is_last {
                return DriverState::Done(DoneReason::LastPage);
            }
            self.source.next_page(page)
        };

        match self.settings.max_pages {
            Some(max_pages) if pages_fetched >= max_pages => {
                info!(max_pages = max_pages, "Page cap reached");
                DriverState::Done(DoneReason::PageCap)
            }
            _ => DriverState::Fetching(next),
        }
    }
}
