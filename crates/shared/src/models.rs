//! Data models for the project.
//!
//! This module defines the canonical record produced by every source and
//! written to every sink, plus the source selector used by configuration.

use serde::{Deserialize, Serialize};

/// Canonical field names, in storage and export order.
pub const RECORD_FIELDS: [&str; 24] = [
    "rank",
    "mal_id",
    "title",
    "title_english",
    "title_japanese",
    "type",
    "episodes",
    "status",
    "aired",
    "season",
    "year",
    "source",
    "duration",
    "rating",
    "score",
    "scored_by",
    "members",
    "favorites",
    "synopsis",
    "genres",
    "themes",
    "studios",
    "url",
    "image_url",
];

/// One ranked anime entry, normalized from either source.
///
/// Field order matters: it is the CSV header order and the SQLite column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub rank: u32,
    pub mal_id: u32,              // MyAnimeList ID, primary key

    // Titles
    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,

    // Classification
    #[serde(rename = "type")]
    pub anime_type: Option<String>,  // TV, Movie, OVA, etc.
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub aired: Option<String>,
    pub season: Option<String>,
    pub year: Option<i32>,
    pub source: Option<String>,      // Source material: Manga, Original, ...
    pub duration: Option<String>,
    pub rating: Option<String>,

    // Metrics
    pub score: Option<f64>,
    pub scored_by: Option<u32>,
    pub members: Option<u32>,
    pub favorites: Option<u32>,

    // Free text and flattened name lists ("A, B")
    pub synopsis: Option<String>,
    pub genres: String,
    pub themes: String,
    pub studios: String,

    // Links
    pub url: Option<String>,
    pub image_url: Option<String>,
}

impl AnimeRecord {
    /// Create a record with only identity fields set
    pub fn new(mal_id: u32, rank: u32, title: impl Into<String>) -> Self {
        Self {
            rank,
            mal_id,
            title: title.into(),
            title_english: None,
            title_japanese: None,
            anime_type: None,
            episodes: None,
            status: None,
            aired: None,
            season: None,
            year: None,
            source: None,
            duration: None,
            rating: None,
            score: None,
            scored_by: None,
            members: None,
            favorites: None,
            synopsis: None,
            genres: String::new(),
            themes: String::new(),
            studios: String::new(),
            url: None,
            image_url: None,
        }
    }
}

/// Which remote representation of the ranking to walk
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Jikan v4 JSON API
    #[default]
    Api,
    /// Rendered MyAnimeList ranking page
    Markup,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Api => write!(f, "api"),
            SourceKind::Markup => write!(f, "markup"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" | "jikan" => Ok(SourceKind::Api),
            "markup" | "html" => Ok(SourceKind::Markup),
            _ => Err(anyhow::anyhow!("Invalid source kind: {}", s)),
        }
    }
}
