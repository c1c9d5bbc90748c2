//! TOML configuration for the scraper.
//!
//! Every section and field has a default, so a config file only needs to
//! name what it changes. A missing file means all defaults.

use crate::models::SourceKind;
use crate::paths::DataPaths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    pub scraper: ScraperConfig,
}

/// `[data]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root for every relative path below
    pub root_dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root_dir: "data".to_string(),
        }
    }
}

/// `[output]`; relative paths resolve against the data root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub csv_path: String,
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "mal_top_anime.csv".to_string(),
            database_path: "mal_top_anime.db".to_string(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Relative to the data root unless absolute
    pub log_dir: String,
    /// trace, debug, info, warn or error
    pub default_level: String,
    pub console: bool,
    pub file: bool,
    /// JSON lines in the file log
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: true,
            json_format: false,
        }
    }
}

/// `[scraper]`: retry and pagination policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Which source to walk
    pub source: SourceKind,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Attempts per page before giving up
    pub max_attempts: u32,

    /// Rate-limit backoff base in seconds (multiplied by the attempt number)
    pub rate_limit_backoff_secs: u64,

    /// Fixed delay before retrying a network error, in seconds
    pub transient_retry_delay_secs: u64,

    /// Consecutive empty pages tolerated before the list is considered exhausted
    pub empty_page_tolerance: u32,

    /// Optional hard cap on the number of pages fetched
    pub max_pages: Option<u32>,

    pub api: ApiSourceConfig,
    pub markup: MarkupSourceConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Api,
            request_timeout_secs: 30,
            max_attempts: 3,
            rate_limit_backoff_secs: 4,
            transient_retry_delay_secs: 3,
            empty_page_tolerance: 2,
            max_pages: None,
            api: ApiSourceConfig::default(),
            markup: MarkupSourceConfig::default(),
        }
    }
}

/// `[scraper.api]`: Jikan v4
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSourceConfig {
    pub base_url: String,

    /// Items per page (Jikan caps this at 25)
    pub page_size: u32,

    /// Courtesy delay between pages in milliseconds
    pub page_delay_ms: u64,

    pub user_agent: String,
}

impl Default for ApiSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            page_size: 25,
            page_delay_ms: 1200,
            user_agent: concat!("mal-scraper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// `[scraper.markup]`: rendered ranking page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupSourceConfig {
    pub base_url: String,

    /// Rows rendered per page
    pub page_size: u32,

    /// Courtesy delay between pages in milliseconds
    pub page_delay_ms: u64,

    pub user_agent: String,
    pub accept_language: String,
}

impl Default for MarkupSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://myanimelist.net/topanime.php".to_string(),
            page_size: 50,
            page_delay_ms: 2000,
            user_agent: BROWSER_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Where a loaded configuration came from, for the caller to report once
/// logging is up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// The file did not exist
    Defaults,
}

impl Config {
    /// Read a TOML file, or fall back to defaults when it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, ConfigOrigin)> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok((Self::default(), ConfigOrigin::Defaults));
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok((config, ConfigOrigin::File(path.to_path_buf())))
    }

    /// Write the configuration as TOML
    #[cfg(test)]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Data directory layout rooted at `data.root_dir`
    pub fn data_paths(&self) -> DataPaths {
        DataPaths::new(&self.data.root_dir)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.data_paths().resolve(&self.output.csv_path)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_paths().resolve(&self.output.database_path)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_paths().resolve(&self.logging.log_dir)
    }
}
