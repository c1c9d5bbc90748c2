//! Ordered, id-deduplicated working set for one run.

use shared::AnimeRecord;
use std::collections::HashMap;
use tracing::warn;

/// What happened to a pushed record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pushed {
    Inserted,
    /// An earlier record with the same id was dropped; the new one goes last
    Replaced,
}

/// Records in accumulation order, one per `mal_id`, last sighting winning
///
/// A repeated id moves to the end so that rank stays non-decreasing in
/// accumulation order. Superseded slots are left empty until
/// [`Accumulator::into_records`].
#[derive(Debug, Default)]
pub struct Accumulator {
    slots: Vec<Option<AnimeRecord>>,
    index: HashMap<u32, usize>,
    last_rank: u32,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AnimeRecord) -> Pushed {
        if record.rank < self.last_rank {
            warn!(
                mal_id = record.mal_id,
                rank = record.rank,
                previous_rank = self.last_rank,
                "Rank went backwards"
            );
        }
        self.last_rank = self.last_rank.max(record.rank);

        let pushed = match self.index.insert(record.mal_id, self.slots.len()) {
            Some(previous) => {
                self.slots[previous] = None;
                Pushed::Replaced
            }
            None => Pushed::Inserted,
        };
        self.slots.push(Some(record));
        pushed
    }

    /// Number of distinct ids held
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn into_records(self) -> Vec<AnimeRecord> {
        self.slots.into_iter().flatten().collect()
    }
}
