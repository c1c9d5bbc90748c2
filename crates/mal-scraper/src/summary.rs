//! End-of-run statistics.

use shared::AnimeRecord;
use std::collections::HashMap;
use tracing::info;

/// Aggregate view of the accumulated records
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    /// Lowest and highest score among scored records
    pub score_range: Option<(f64, f64)>,
    /// (type, count), most common first
    pub type_breakdown: Vec<(String, usize)>,
}

impl RunSummary {
    pub fn from_records(records: &[AnimeRecord]) -> Self {
        let score_range = records
            .iter()
            .filter_map(|r| r.score)
            .fold(None, |range: Option<(f64, f64)>, score| match range {
                None => Some((score, score)),
                Some((low, high)) => Some((low.min(score), high.max(score))),
            });

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in records {
            let anime_type = record.anime_type.as_deref().unwrap_or("Unknown");
            *counts.entry(anime_type).or_default() += 1;
        }
        let mut type_breakdown: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(t, c)| (t.to_string(), c))
            .collect();
        type_breakdown.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            total: records.len(),
            score_range,
            type_breakdown,
        }
    }

    /// Log the summary and the first `top` records
    pub fn log(&self, records: &[AnimeRecord], top: usize) {
        let breakdown = self
            .type_breakdown
            .iter()
            .map(|(t, c)| format!("{}: {}", t, c))
            .collect::<Vec<_>>()
            .join(", ");

        match self.score_range {
            Some((low, high)) => info!(
                total = self.total,
                min_score = low,
                max_score = high,
                types = %breakdown,
                "Ranking statistics"
            ),
            None => info!(total = self.total, types = %breakdown, "Ranking statistics"),
        }

        for record in records.iter().take(top) {
            info!(
                rank = record.rank,
                score = %record.score.map(|s| format!("{:.2}", s)).unwrap_or_else(|| "N/A".to_string()),
                anime_type = record.anime_type.as_deref().unwrap_or("?"),
                title = %record.title,
                "Top entry"
            );
        }
    }
}
