//! Test doubles for the source and sleeper seams.

use crate::fetcher::Sleeper;
use crate::source::{
    PageIndicator, PageOutcome, PageSource, PaginationMode, RawItem, RawPage, RawPayload,
};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Records requested sleeps instead of waiting
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Plays back a fixed list of exchange outcomes, one per call
pub struct ScriptedSource {
    mode: PaginationMode,
    script: Mutex<VecDeque<PageOutcome>>,
    requested: Mutex<Vec<PageIndicator>>,
}

impl ScriptedSource {
    pub fn explicit(script: Vec<PageOutcome>) -> Self {
        Self::with_mode(PaginationMode::Explicit, script)
    }

    pub fn implicit(page_size: usize, script: Vec<PageOutcome>) -> Self {
        Self::with_mode(PaginationMode::Implicit { page_size }, script)
    }

    fn with_mode(mode: PaginationMode, script: Vec<PageOutcome>) -> Self {
        Self {
            mode,
            script: Mutex::new(script.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn requested(&self) -> Vec<PageIndicator> {
        self.requested.lock().unwrap().clone()
    }

    /// Jikan-shaped items whose rank, position and id all equal `id`
    pub fn items(ids: impl IntoIterator<Item = u32>) -> Vec<RawItem> {
        ids.into_iter()
            .map(|id| RawItem {
                position: id,
                payload: RawPayload::Api(json!({
                    "mal_id": id,
                    "rank": id,
                    "title": format!("Anime {}", id),
                })),
            })
            .collect()
    }

    /// A successful page carrying a has-next flag
    pub fn page(ids: impl IntoIterator<Item = u32>, has_next: bool) -> PageOutcome {
        PageOutcome::Success(RawPage {
            items: Self::items(ids),
            has_next: Some(has_next),
            last_page: None,
        })
    }

    /// A successful page without pagination metadata
    pub fn rows(ids: impl IntoIterator<Item = u32>) -> PageOutcome {
        PageOutcome::Success(RawPage {
            items: Self::items(ids),
            has_next: None,
            last_page: None,
        })
    }

    pub fn empty() -> PageOutcome {
        PageOutcome::Success(RawPage::default())
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn pagination(&self) -> PaginationMode {
        self.mode
    }

    fn first_page(&self) -> PageIndicator {
        PageIndicator::Page(1)
    }

    fn next_page(&self, current: PageIndicator) -> PageIndicator {
        match current {
            PageIndicator::Page(page) => PageIndicator::Page(page + 1),
            PageIndicator::Offset(offset) => PageIndicator::Offset(offset + 1),
        }
    }

    async fn fetch_page(&self, page: PageIndicator) -> PageOutcome {
        self.requested.lock().unwrap().push(page);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| PageOutcome::HardFailure("script exhausted".to_string()))
    }
}
