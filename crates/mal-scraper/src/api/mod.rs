//! Jikan API v4 source.
//!
//! Walks the `/top/anime` endpoint page by page; the response reports
//! whether another page follows.

pub mod client;
pub mod types;

pub use client::JikanSource;
pub use types::*;
