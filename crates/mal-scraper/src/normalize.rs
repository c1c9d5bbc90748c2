//! Raw item to [`AnimeRecord`] conversion.
//!
//! Pure functions: malformed input is data, reported through [`Rejected`],
//! never an error that stops a page.

use crate::api::TopAnimeEntry;
use crate::api::types::MalEntity;
use crate::markup::MarkupRow;
use crate::source::{RawItem, RawPayload};
use once_cell::sync::Lazy;
use regex::Regex;
use shared::AnimeRecord;
use thiserror::Error;

/// Upper bound for free-text fields, in characters
pub const MAX_TEXT_CHARS: usize = 500;

/// Separator for flattened name lists
pub const LIST_SEPARATOR: &str = ", ";

static ANIME_ID: Lazy<Regex> = Lazy::new(|| pattern(r"/anime/(\d+)/"));
static TYPE_AND_EPISODES: Lazy<Regex> = Lazy::new(|| pattern(r"^(\w+)\s*\((\d+)\s*eps?\)"));
static LEADING_WORD: Lazy<Regex> = Lazy::new(|| pattern(r"^(\w+)"));
static EPISODES: Lazy<Regex> = Lazy::new(|| pattern(r"\((\d+)\s*eps?\)"));
static MEMBERS: Lazy<Regex> = Lazy::new(|| pattern(r"([\d,]+)\s*members"));

fn pattern(re: &str) -> Regex {
    // Patterns are compile-time constants
    Regex::new(re).unwrap_or_else(|e| panic!("invalid pattern {:?}: {}", re, e))
}

/// Why an item was dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("item has no catalog id")]
    MissingId,
    #[error("item {0} has no title")]
    MissingTitle(u32),
    #[error("item is not a valid entry: {0}")]
    Malformed(String),
}

/// Normalize one raw item into a record
pub fn normalize(item: RawItem) -> Result<AnimeRecord, Rejected> {
    match item.payload {
        RawPayload::Api(value) => {
            let entry: TopAnimeEntry = serde_json::from_value(value)
                .map_err(|e| Rejected::Malformed(e.to_string()))?;
            from_api(entry, item.position)
        }
        RawPayload::Markup(row) => from_markup(row, item.position),
    }
}

fn from_api(entry: TopAnimeEntry, position: u32) -> Result<AnimeRecord, Rejected> {
    let mal_id = entry.mal_id.filter(|id| *id > 0).ok_or(Rejected::MissingId)?;
    let title = clean(entry.title).ok_or(Rejected::MissingTitle(mal_id))?;
    let rank = entry.rank.filter(|r| *r > 0).unwrap_or(position);

    let image_url = entry
        .images
        .and_then(|images| images.jpg)
        .and_then(|jpg| jpg.large_image_url.or(jpg.image_url));

    Ok(AnimeRecord {
        rank,
        mal_id,
        title,
        title_english: clean(entry.title_english),
        title_japanese: clean(entry.title_japanese),
        anime_type: clean(entry.anime_type),
        episodes: entry.episodes,
        status: clean(entry.status),
        aired: entry.aired.and_then(|aired| clean(aired.string)),
        season: clean(entry.season),
        year: entry.year,
        source: clean(entry.source),
        duration: clean(entry.duration),
        rating: clean(entry.rating),
        score: valid_score(entry.score),
        scored_by: entry.scored_by,
        members: entry.members,
        favorites: entry.favorites,
        synopsis: clean(entry.synopsis).map(|s| truncate_chars(&s, MAX_TEXT_CHARS)),
        genres: join_names(names(&entry.genres)),
        themes: join_names(names(&entry.themes)),
        studios: join_names(names(&entry.studios)),
        url: clean(entry.url),
        image_url: clean(image_url),
    })
}

fn from_markup(row: MarkupRow, position: u32) -> Result<AnimeRecord, Rejected> {
    let mal_id = row
        .href
        .as_deref()
        .and_then(|href| ANIME_ID.captures(href))
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|id| *id > 0)
        .ok_or(Rejected::MissingId)?;
    let title = clean(row.title).ok_or(Rejected::MissingTitle(mal_id))?;
    let rank = row
        .rank_text
        .as_deref()
        .and_then(|text| text.trim().parse::<u32>().ok())
        .filter(|r| *r > 0)
        .unwrap_or(position);

    let mut record = AnimeRecord::new(mal_id, rank, title);
    record.url = row.href;

    // Line 1: "TV (28 eps)", line 2: air dates, line 3: "1,012,345 members"
    if let Some(first) = row.info_lines.first() {
        let (anime_type, episodes) = parse_type_line(first);
        record.anime_type = anime_type;
        record.episodes = episodes;
    }
    record.aired = row.info_lines.get(1).cloned();
    record.members = row.info_lines.get(2).and_then(|line| parse_members(line));
    record.score = valid_score(
        row.score_text
            .as_deref()
            .and_then(|text| text.trim().parse::<f64>().ok()),
    );

    Ok(record)
}

/// Split "TV (28 eps)" into type and episode count
fn parse_type_line(line: &str) -> (Option<String>, Option<u32>) {
    if let Some(caps) = TYPE_AND_EPISODES.captures(line) {
        return (Some(caps[1].to_string()), caps[2].parse().ok());
    }

    let anime_type = LEADING_WORD
        .captures(line)
        .map(|caps| caps[1].to_string())
        .or_else(|| Some(line.to_string()));
    let episodes = EPISODES
        .captures(line)
        .and_then(|caps| caps[1].parse().ok());
    (anime_type, episodes)
}

fn parse_members(line: &str) -> Option<u32> {
    MEMBERS
        .captures(line)
        .and_then(|caps| caps[1].replace(',', "").parse().ok())
}

/// Truncate to at most `max` characters, on a character boundary
///
/// Applying it twice gives the same result as applying it once.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// Flatten names into one ", "-separated string
pub fn join_names<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

fn names(entities: &[MalEntity]) -> impl Iterator<Item = &str> {
    entities.iter().map(|entity| entity.name.as_str())
}

/// Trim, and treat blank strings as absent
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn valid_score(score: Option<f64>) -> Option<f64> {
    score.filter(|s| s.is_finite() && *s >= 0.0)
}
