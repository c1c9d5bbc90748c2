//! Shared library for the MAL top-anime scraper.
//!
//! This crate provides the pieces that do not depend on where the ranking
//! comes from:
//! - Configuration management
//! - The canonical anime record
//! - CSV and SQLite writers
//! - File path utilities
//! - Logging infrastructure

pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use logging::LogConfig;
pub use models::*;
pub use paths::DataPaths;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
