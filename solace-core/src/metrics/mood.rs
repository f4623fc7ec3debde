use serde::{Deserialize, Serialize};

use crate::models::{JournalEntry, Sentiment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentMood {
    pub sentiment: Sentiment,
    /// Entry the mood was read from; `None` means there is no data yet.
    pub entry_id: Option<u64>,
}

impl CurrentMood {
    pub fn no_data() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            entry_id: None,
        }
    }
}

/// Sentiment of the chronologically latest entry. O(n) scan, no caching.
/// Equal timestamps resolve to the higher id.
pub fn current_mood(entries: &[JournalEntry]) -> CurrentMood {
    entries
        .iter()
        .max_by_key(|e| (e.timestamp, e.id))
        .map(|e| CurrentMood {
            sentiment: e.sentiment,
            entry_id: Some(e.id),
        })
        .unwrap_or_else(CurrentMood::no_data)
}
