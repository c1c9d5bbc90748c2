//! Rendered ranking page source.
//!
//! Walks `topanime.php` by row offset. The page carries no total, so a page
//! shorter than the page size is the last one.

pub mod client;
pub mod parser;

pub use client::RankingPageSource;
pub use parser::{parse_rows, MarkupRow};
