pub mod entry;
pub mod sentiment;

pub use entry::{word_count, AnalysisSource, JournalEntry, NewEntry};
pub use sentiment::{normalize_theme, Emotion, Sentiment, KNOWN_THEMES};
