use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sentiment::{Emotion, Sentiment};
use crate::error::SolaceError;

/// Where an entry's analysis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Remote,
    Fallback,
}

/// One journal submission and its analysis. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    pub text: String,
    pub sentiment: Sentiment,
    pub emotions: Vec<Emotion>,
    pub themes: Vec<String>,
    pub confidence: f64,
    pub word_count: usize,
    pub timestamp: DateTime<Utc>,
    pub ai_response: String,
    pub follow_up_question: String,
    pub analysis_source: AnalysisSource,
}

/// Validated input for a new entry.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewEntry {
    /// Trims `text` and rejects it if nothing is left.
    pub fn new(text: &str, timestamp: Option<DateTime<Utc>>) -> Result<Self, SolaceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SolaceError::Validation("entry text must not be empty".into()));
        }
        Ok(Self {
            text: text.to_string(),
            timestamp,
        })
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }
}

/// Count of whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
