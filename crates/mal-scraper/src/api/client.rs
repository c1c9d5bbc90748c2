//! Jikan `/top/anime` source.

use super::types::TopAnimePage;
use crate::http::{build_client, classify_error, classify_status};
use crate::source::{
    PageIndicator, PageOutcome, PageSource, PaginationMode, RawItem, RawPage, RawPayload,
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::config::ApiSourceConfig;
use std::time::Duration;
use tracing::debug;

/// Jikan API v4 ranking source
pub struct JikanSource {
    /// HTTP client, reused for every page
    client: Client,
    /// Base URL for Jikan API
    base_url: String,
    /// Items per page
    page_size: u32,
}

impl JikanSource {
    /// Create a new Jikan source
    pub fn new(settings: &ApiSourceConfig, timeout: Duration) -> Result<Self> {
        if settings.page_size == 0 {
            bail!("scraper.api.page_size must be at least 1");
        }
        let client = build_client(timeout, &settings.user_agent, None)?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            page_size: settings.page_size,
        })
    }

    fn page_url(&self, page: u32) -> String {
        format!(
            "{}/top/anime?page={}&limit={}",
            self.base_url, page, self.page_size
        )
    }

    /// Turn a response body into a page
    ///
    /// Item positions are derived from the page number so that entries
    /// without a rank still sort where the API put them.
    pub fn parse_page(&self, page: u32, body: &str) -> PageOutcome {
        let parsed: TopAnimePage = match serde_json::from_str(body) {
            Ok(parsed) => parsed,
            Err(e) => return PageOutcome::HardFailure(format!("Failed to parse response: {}", e)),
        };

        let first_position = page.saturating_sub(1) * self.page_size + 1;
        let items = parsed
            .data
            .into_iter()
            .enumerate()
            .map(|(index, value)| RawItem {
                position: first_position + index as u32,
                payload: RawPayload::Api(value),
            })
            .collect();

        let pagination = parsed.pagination.unwrap_or_default();
        PageOutcome::Success(RawPage {
            items,
            has_next: Some(pagination.has_next_page),
            last_page: pagination.last_visible_page,
        })
    }
}

#[async_trait]
impl PageSource for JikanSource {
    fn name(&self) -> &str {
        "jikan"
    }

    fn pagination(&self) -> PaginationMode {
        PaginationMode::Explicit
    }

    fn first_page(&self) -> PageIndicator {
        PageIndicator::Page(1)
    }

    fn next_page(&self, current: PageIndicator) -> PageIndicator {
        match current {
            PageIndicator::Page(page) => PageIndicator::Page(page + 1),
            PageIndicator::Offset(offset) => PageIndicator::Page(offset / self.page_size + 2),
        }
    }

    async fn fetch_page(&self, page: PageIndicator) -> PageOutcome {
        let page = match page {
            PageIndicator::Page(page) => page,
            PageIndicator::Offset(offset) => offset / self.page_size + 1,
        };
        let url = self.page_url(page);

        debug!(url = %url, "Making API request");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(&e),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return classify_error(&e),
        };

        if !status.is_success() {
            return classify_status(status, &body);
        }

        self.parse_page(page, &body)
    }
}
