//! In-memory entry store. Entries live for the lifetime of the process.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::analysis::AnalysisOutcome;
use crate::metrics::recent_window;
use crate::models::{JournalEntry, NewEntry};

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<JournalEntry>,
    next_id: u64,
}

/// Shared handle to the journal. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct EntryStore {
    inner: Arc<RwLock<Inner>>,
    max_entries: usize,
}

impl EntryStore {
    /// `max_entries == 0` keeps everything.
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            max_entries,
        }
    }

    /// Store an analysed entry under the next id.
    pub async fn append(&self, new_entry: NewEntry, outcome: &AnalysisOutcome) -> JournalEntry {
        let analysis = outcome.analysis();
        let reflection = outcome.reflection();
        let word_count = new_entry.word_count();

        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let entry = JournalEntry {
            id: inner.next_id,
            text: new_entry.text,
            sentiment: analysis.sentiment,
            emotions: analysis.emotions.clone(),
            themes: analysis.themes.clone(),
            confidence: analysis.confidence.clamp(0.0, 1.0),
            word_count,
            timestamp: new_entry.timestamp.unwrap_or_else(Utc::now),
            ai_response: reflection.reply.clone(),
            follow_up_question: reflection.follow_up_question.clone(),
            analysis_source: outcome.source(),
        };
        inner.entries.push(entry.clone());

        if self.max_entries > 0 && inner.entries.len() > self.max_entries {
            let excess = inner.entries.len() - self.max_entries;
            inner.entries.drain(..excess);
            tracing::debug!(dropped = excess, "retention limit reached, oldest entries dropped");
        }

        tracing::info!(
            id = entry.id,
            sentiment = %entry.sentiment,
            source = ?entry.analysis_source,
            "entry stored"
        );
        entry
    }

    /// Copy of all entries in insertion order.
    pub async fn snapshot(&self) -> Vec<JournalEntry> {
        self.inner.read().await.entries.clone()
    }

    pub async fn get(&self, id: u64) -> Option<JournalEntry> {
        self.inner
            .read()
            .await
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    /// Up to `limit` entries, newest timestamp first.
    pub async fn recent(&self, limit: usize) -> Vec<JournalEntry> {
        let inner = self.inner.read().await;
        recent_window(&inner.entries, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}
