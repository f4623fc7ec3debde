//! Windowed aggregates shared by the dashboard and prompt suggestions.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::models::{Emotion, JournalEntry, Sentiment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount<T> {
    pub label: T,
    pub count: usize,
}

/// The `n` most recent entries, newest first. Timestamp ties go to the higher id.
pub fn recent_window(entries: &[JournalEntry], n: usize) -> Vec<&JournalEntry> {
    let mut window: Vec<&JournalEntry> = entries.iter().collect();
    window.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
    window.truncate(n);
    window
}

/// Mean sentiment score of the `n` most recent entries, bucketed back into a class.
/// `None` when there are no entries.
pub fn average_sentiment(entries: &[JournalEntry], n: usize) -> Option<Sentiment> {
    let window = recent_window(entries, n);
    mean_sentiment(window)
}

/// Mean sentiment of an arbitrary set of entries.
pub fn mean_sentiment<'a>(entries: impl IntoIterator<Item = &'a JournalEntry>) -> Option<Sentiment> {
    let (sum, count) = entries
        .into_iter()
        .fold((0i64, 0usize), |(sum, count), e| (sum + i64::from(e.sentiment.score()), count + 1));
    if count == 0 {
        return None;
    }
    Some(Sentiment::from_score(sum as f64 / count as f64))
}

/// Frequency count, highest first. Equal counts keep first-seen order.
pub fn top_k<T, I>(labels: I, k: usize) -> Vec<LabelCount<T>>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut counts: Vec<LabelCount<T>> = Vec::new();
    let mut index: HashMap<T, usize> = HashMap::new();
    for label in labels {
        match index.get(&label) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(label.clone(), counts.len());
                counts.push(LabelCount { label, count: 1 });
            }
        }
    }
    // sort_by is stable, so ties stay in first-seen order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(k);
    counts
}

pub fn top_themes<'a>(
    entries: impl IntoIterator<Item = &'a JournalEntry>,
    k: usize,
) -> Vec<LabelCount<String>> {
    top_k(
        entries.into_iter().flat_map(|e| e.themes.iter().cloned()),
        k,
    )
}

pub fn top_emotions<'a>(
    entries: impl IntoIterator<Item = &'a JournalEntry>,
    k: usize,
) -> Vec<LabelCount<Emotion>> {
    top_k(entries.into_iter().flat_map(|e| e.emotions.iter().copied()), k)
}

/// Entry count for each sentiment class, most negative first, zeros included.
pub fn sentiment_distribution(entries: &[JournalEntry]) -> Vec<LabelCount<Sentiment>> {
    Sentiment::ALL
        .iter()
        .map(|&s| LabelCount {
            label: s,
            count: entries.iter().filter(|e| e.sentiment == s).count(),
        })
        .collect()
}
