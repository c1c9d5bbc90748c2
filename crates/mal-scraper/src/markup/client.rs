//! MyAnimeList ranking page source.

use super::parser::parse_rows;
use crate::http::{build_client, classify_error, classify_status};
use crate::source::{
    PageIndicator, PageOutcome, PageSource, PaginationMode, RawItem, RawPage, RawPayload,
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::config::MarkupSourceConfig;
use std::time::Duration;
use tracing::debug;

/// Rendered `topanime.php` source, addressed by row offset
pub struct RankingPageSource {
    client: Client,
    base_url: String,
    page_size: u32,
}

impl RankingPageSource {
    /// Create a new ranking page source
    pub fn new(settings: &MarkupSourceConfig, timeout: Duration) -> Result<Self> {
        // A zero page size never yields a short page and never advances
        if settings.page_size == 0 {
            bail!("scraper.markup.page_size must be at least 1");
        }
        let client = build_client(
            timeout,
            &settings.user_agent,
            Some(&settings.accept_language),
        )?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            page_size: settings.page_size,
        })
    }

    /// The first page is requested without a `limit` parameter
    fn page_url(&self, offset: u32) -> String {
        if offset == 0 {
            self.base_url.clone()
        } else {
            format!("{}?limit={}", self.base_url, offset)
        }
    }

    /// Turn a rendered page into raw rows
    pub fn parse_page(&self, offset: u32, html: &str) -> RawPage {
        let items = parse_rows(html)
            .into_iter()
            .enumerate()
            .map(|(index, row)| RawItem {
                position: offset + index as u32 + 1,
                payload: RawPayload::Markup(row),
            })
            .collect();

        RawPage {
            items,
            has_next: None,
            last_page: None,
        }
    }
}

#[async_trait]
impl PageSource for RankingPageSource {
    fn name(&self) -> &str {
        "ranking_page"
    }

    fn pagination(&self) -> PaginationMode {
        PaginationMode::Implicit {
            page_size: self.page_size as usize,
        }
    }

    fn first_page(&self) -> PageIndicator {
        PageIndicator::Offset(0)
    }

    fn next_page(&self, current: PageIndicator) -> PageIndicator {
        match current {
            PageIndicator::Offset(offset) => PageIndicator::Offset(offset + self.page_size),
            PageIndicator::Page(page) => PageIndicator::Offset(page * self.page_size),
        }
    }

    async fn fetch_page(&self, page: PageIndicator) -> PageOutcome {
        let offset = match page {
            PageIndicator::Offset(offset) => offset,
            PageIndicator::Page(page) => page.saturating_sub(1) * self.page_size,
        };
        let url = self.page_url(offset);

        debug!(url = %url, "Requesting ranking page");

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

        PageOutcome::Success(self.parse_page(offset, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parser::tests::{page_html, row_html};
    use shared::Config;

    fn source() -> RankingPageSource {
        RankingPageSource::new(&Config::default().scraper.markup, Duration::from_secs(30)).unwrap()
    }

    #[test]
    fn test_page_url() {
        let source = source();
        assert_eq!(source.page_url(0), "https://myanimelist.net/topanime.php");
        assert_eq!(
            source.page_url(100),
            "https://myanimelist.net/topanime.php?limit=100"
        );
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let mut settings = Config::default().scraper.markup;
        settings.page_size = 0;
        assert!(RankingPageSource::new(&settings, Duration::from_secs(30)).is_err());
    }

    #[test]
    fn test_offsets_advance_by_page_size() {
        let source = source();
        assert_eq!(source.first_page(), PageIndicator::Offset(0));
        assert_eq!(source.next_page(PageIndicator::Offset(0)), PageIndicator::Offset(50));
        assert_eq!(source.next_page(PageIndicator::Offset(50)), PageIndicator::Offset(100));
    }

    #[test]
    fn test_parse_page_positions_follow_offset() {
        let html = page_html(&[row_html(101, 1, "a"), row_html(102, 2, "b")]);
        let page = source().parse_page(100, &html);

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].position, 101);
        assert_eq!(page.items[1].position, 102);
        assert_eq!(page.has_next, None);
    }

    #[test]
    fn test_short_page_is_last() {
        let source = source();
        let rows: Vec<String> = (1..=37).map(|i| row_html(i, i, "x")).collect();
        let page = source.parse_page(0, &page_html(&rows));
        assert!(source.is_last_page(&page));

        let rows: Vec<String> = (1..=50).map(|i| row_html(i, i, "x")).collect();
        let page = source.parse_page(0, &page_html(&rows));
        assert!(!source.is_last_page(&page));
    }
}
