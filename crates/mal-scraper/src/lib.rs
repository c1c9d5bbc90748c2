//! MAL Scraper library for fetching the top-anime ranking.
//!
//! Walks either the Jikan API v4 `/top/anime` endpoint or the rendered
//! MyAnimeList ranking page, normalizes every entry into an
//! [`shared::AnimeRecord`] and writes the result to CSV and SQLite.

pub mod accumulator;
pub mod api;
pub mod driver;
pub mod fetcher;
pub mod http;
pub mod markup;
pub mod normalize;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod summary;

#[cfg(test)]
mod testing;

pub use api::JikanSource;
pub use driver::{DriverSettings, PaginationDriver, RunReport, RunStatus};
pub use fetcher::{PageFetcher, RetryPolicy, Sleeper, TokioSleeper};
pub use markup::RankingPageSource;
pub use normalize::{normalize, Rejected};
pub use pipeline::{scrape, PipelineOutcome};
pub use sink::{ResultSink, SinkOutcome};
pub use source::{PageIndicator, PageOutcome, PageSource, PaginationMode, RawItem, RawPage};
