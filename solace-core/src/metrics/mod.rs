//! Metrics engine: pure functions over a snapshot of journal entries.
//!
//! Nothing here reads the system clock: every date-dependent function takes
//! `now`, and calendar days are bucketed in `now`'s time zone. Functions never
//! fail; empty input yields each metric's documented empty state.

pub mod aggregate;
pub mod growth;
pub mod mood;
pub mod streak;
pub mod trend;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::JournalEntry;

pub use aggregate::{
    average_sentiment, mean_sentiment, recent_window, sentiment_distribution, top_emotions,
    top_k, top_themes, LabelCount,
};
pub use growth::{growth_score, GrowthBand, GrowthBreakdown, GrowthScore};
pub use mood::{current_mood, CurrentMood};
pub use streak::writing_streak;
pub use trend::{mood_trend, regression_slope, MoodTrend, TrendDirection};

/// Everything the dashboard shows, recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub writing_streak: u32,
    pub mood_trend: MoodTrend,
    pub current_mood: CurrentMood,
    pub growth_score: GrowthScore,
}

pub fn derive_metrics<Tz: TimeZone>(entries: &[JournalEntry], now: &DateTime<Tz>) -> DerivedMetrics {
    let streak = writing_streak(entries, now);
    let trend = mood_trend(entries, now);
    let growth = growth::growth_score_with(entries, now, streak, &trend);
    DerivedMetrics {
        writing_streak: streak,
        mood_trend: trend,
        current_mood: current_mood(entries),
        growth_score: growth,
    }
}
