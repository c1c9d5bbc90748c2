//! Source strategy abstraction.
//!
//! A source knows how to address its pages, how to perform one exchange for
//! a page, and how to tell whether a successful page was the last one. The
//! pagination driver and the fetcher's retry loop are written against this
//! trait only.

use crate::markup::MarkupRow;
use async_trait::async_trait;
use std::fmt;

/// Address of one page of the ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageIndicator {
    /// 1-based page number (Jikan)
    Page(u32),
    /// 0-based row offset (ranking page `?limit=`)
    Offset(u32),
}

impl fmt::Display for PageIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageIndicator::Page(page) => write!(f, "page {}", page),
            PageIndicator::Offset(offset) => write!(f, "offset {}", offset),
        }
    }
}

/// How a source reports the end of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    /// The response carries a has-next flag
    Explicit,
    /// Only the page size is known; a short page is the last one
    Implicit { page_size: usize },
}

/// Source-specific body of one ranked item
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// One element of Jikan's `data` array, undecoded
    Api(serde_json::Value),
    /// One `tr.ranking-list` row
    Markup(MarkupRow),
}

/// One ranked item as delivered by a source
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    /// 1-based position in the whole ranking, used when the item has no rank
    pub position: u32,
    pub payload: RawPayload,
}

/// One successfully fetched page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPage {
    pub items: Vec<RawItem>,
    /// Explicit has-next signal, if the source reports one
    pub has_next: Option<bool>,
    /// Last page number, if the source reports one
    pub last_page: Option<u32>,
}

/// Classification of one exchange with the remote source
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Success(RawPage),
    RateLimited,
    TransientError(String),
    HardFailure(String),
}

impl PageOutcome {
    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            PageOutcome::Success(_) => "success",
            PageOutcome::RateLimited => "rate_limited",
            PageOutcome::TransientError(_) => "transient_error",
            PageOutcome::HardFailure(_) => "hard_failure",
        }
    }
}

/// A paginated remote ranking
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Name used in log fields
    fn name(&self) -> &str;

    /// How the end of the list is signalled
    fn pagination(&self) -> PaginationMode;

    /// First page to request
    fn first_page(&self) -> PageIndicator;

    /// Page following `current`
    fn next_page(&self, current: PageIndicator) -> PageIndicator;

    /// Perform exactly one exchange for `page`
    async fn fetch_page(&self, page: PageIndicator) -> PageOutcome;

    /// Whether a successful page ends the list
    fn is_last_page(&self, page: &RawPage) -> bool {
        match self.pagination() {
            PaginationMode::Explicit => !page.has_next.unwrap_or(false),
            PaginationMode::Implicit { page_size } => page.items.len() < page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(PaginationMode);

    #[async_trait]
    impl PageSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn pagination(&self) -> PaginationMode {
            self.0
        }
        fn first_page(&self) -> PageIndicator {
            PageIndicator::Page(1)
        }
        fn next_page(&self, current: PageIndicator) -> PageIndicator {
            current
        }
        async fn fetch_page(&self, _page: PageIndicator) -> PageOutcome {
            PageOutcome::RateLimited
        }
    }

    fn page_of(len: usize, has_next: Option<bool>) -> RawPage {
        let items = (0..len)
            .map(|i| RawItem {
                position: i as u32 + 1,
                payload: RawPayload::Api(serde_json::json!({})),
            })
            .collect();
        RawPage {
            items,
            has_next,
            last_page: None,
        }
    }

    #[test]
    fn test_explicit_last_page() {
        let source = Fixed(PaginationMode::Explicit);
        assert!(!source.is_last_page(&page_of(25, Some(true))));
        assert!(source.is_last_page(&page_of(25, Some(false))));
        assert!(source.is_last_page(&page_of(25, None)));
    }

    #[test]
    fn test_implicit_last_page() {
        let source = Fixed(PaginationMode::Implicit { page_size: 50 });
        assert!(!source.is_last_page(&page_of(50, None)));
        assert!(source.is_last_page(&page_of(37, None)));
        // A has-next flag is ignored when the source does not report one
        assert!(source.is_last_page(&page_of(12, Some(true))));
    }

    #[test]
    fn test_indicator_display() {
        assert_eq!(PageIndicator::Page(3).to_string(), "page 3");
        assert_eq!(PageIndicator::Offset(100).to_string(), "offset 100");
    }
}
