//! Ranking table row extraction.
//!
//! Only selects elements and collects their text; turning that text into
//! typed fields is the normalizer's job.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static ROW: Lazy<Selector> = Lazy::new(|| selector("tr.ranking-list"));
static RANK: Lazy<Selector> = Lazy::new(|| selector("td.rank span"));
static TITLE_LINK: Lazy<Selector> = Lazy::new(|| selector("td.title a.hoverinfo_trigger"));
static INFO: Lazy<Selector> = Lazy::new(|| selector("td.title div.information"));
static SCORE: Lazy<Selector> = Lazy::new(|| selector("td.score span"));

fn selector(css: &str) -> Selector {
    // Selectors are compile-time constants
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {:?}: {:?}", css, e))
}

/// Raw text of one `tr.ranking-list` row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupRow {
    pub rank_text: Option<String>,
    pub title: Option<String>,
    pub href: Option<String>,
    /// Non-empty lines of the information block, trimmed
    pub info_lines: Vec<String>,
    pub score_text: Option<String>,
}

/// Parse every ranking row in a document, in document order
pub fn parse_rows(html: &str) -> Vec<MarkupRow> {
    let document = Html::parse_document(html);
    document.select(&ROW).map(parse_row).collect()
}

fn parse_row(row: ElementRef<'_>) -> MarkupRow {
    // The thumbnail anchor shares the class but has no text
    let title_link = row
        .select(&TITLE_LINK)
        .find(|link| !element_text(*link).is_empty())
        .or_else(|| row.select(&TITLE_LINK).next());

    MarkupRow {
        rank_text: first_text(row, &RANK),
        title: title_link.map(element_text).filter(|t| !t.is_empty()),
        href: title_link
            .and_then(|link| link.value().attr("href"))
            .map(str::to_string),
        info_lines: row
            .select(&INFO)
            .next()
            .map(|info| {
                info.text()
                    .flat_map(str::lines)
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        score_text: first_text(row, &SCORE),
    }
}

fn first_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
