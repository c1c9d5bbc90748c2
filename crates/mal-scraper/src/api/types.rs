//! Jikan API v4 response types.
//!
//! These types represent the JSON responses from `/top/anime`. Every field is
//! optional: the ranking contains unaired and unscored entries, and a missing
//! field must never fail a whole page.

use serde::{Deserialize, Serialize};

/// `/top/anime` response envelope
///
/// Items are kept as raw JSON so that one malformed entry is rejected on its
/// own instead of failing the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopAnimePage {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub last_visible_page: Option<u32>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Top anime entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopAnimeEntry {
    pub mal_id: Option<u32>,
    pub url: Option<String>,
    pub images: Option<AnimeImages>,
    pub title: Option<String>,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    #[serde(rename = "type")]
    pub anime_type: Option<String>,
    pub source: Option<String>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub aired: Option<Aired>,
    pub duration: Option<String>,
    pub rating: Option<String>,
    pub score: Option<f64>,
    pub scored_by: Option<u32>,
    pub rank: Option<u32>,
    pub members: Option<u32>,
    pub favorites: Option<u32>,
    pub synopsis: Option<String>,
    pub season: Option<String>,
    pub year: Option<i32>,
    #[serde(deserialize_with = "null_as_empty")]
    pub genres: Vec<MalEntity>,
    #[serde(deserialize_with = "null_as_empty")]
    pub themes: Vec<MalEntity>,
    #[serde(deserialize_with = "null_as_empty")]
    pub studios: Vec<MalEntity>,
}

/// Anime images
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimeImages {
    pub jpg: Option<ImageSet>,
    pub webp: Option<ImageSet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSet {
    pub image_url: Option<String>,
    pub small_image_url: Option<String>,
    pub large_image_url: Option<String>,
}

/// Aired dates; only the display string is kept
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Aired {
    pub from: Option<String>,
    pub to: Option<String>,
    pub string: Option<String>,
}

/// MAL entity (genre, theme, studio)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MalEntity {
    pub mal_id: Option<u32>,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub name: String,
    pub url: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_without_pagination() {
        let page: TopAnimePage = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(page.data.is_empty());
        assert!(page.pagination.is_none());
    }

    #[test]
    fn test_entry_tolerates_nulls_and_missing_fields() {
        let entry: TopAnimeEntry = serde_json::from_value(json!({
            "mal_id": 52991,
            "title": "Sousou no Frieren",
            "genres": null,
            "score": null,
            "aired": {"string": "Sep 29, 2023 to Mar 22, 2024"}
        }))
        .unwrap();

        assert_eq!(entry.mal_id, Some(52991));
        assert!(entry.genres.is_empty());
        assert!(entry.themes.is_empty());
        assert_eq!(entry.score, None);
        assert_eq!(
            entry.aired.and_then(|a| a.string).as_deref(),
            Some("Sep 29, 2023 to Mar 22, 2024")
        );
    }
}
