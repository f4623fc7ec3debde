//! Growth score: a 0-100 composite of five sub-scores, each capped at 20.
//!
//! | Component            | Formula                                      |
//! |----------------------|----------------------------------------------|
//! | consistency          | min(streak * 2, 20)                          |
//! | sentiment trajectory | 20 improving, 10 stable, 5 declining         |
//! | engagement           | min(entries / days_since_first * 10, 20)     |
//! | reflection depth     | min(avg_word_count / 5, 20)                  |
//! | positivity           | positive_share * 20                          |

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::streak::writing_streak;
use super::trend::{mood_trend, MoodTrend, TrendDirection};
use crate::models::JournalEntry;

pub const COMPONENT_CAP: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthBand {
    Excellent,
    Good,
    Steady,
    BuildingMomentum,
    GettingStarted,
    NoData,
}

impl GrowthBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            80.. => Self::Excellent,
            60..=79 => Self::Good,
            40..=59 => Self::Steady,
            20..=39 => Self::BuildingMomentum,
            _ => Self::GettingStarted,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Steady => "steady",
            Self::BuildingMomentum => "building momentum",
            Self::GettingStarted => "getting started",
            Self::NoData => "no data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GrowthBreakdown {
    pub consistency: f64,
    pub sentiment_trajectory: f64,
    pub engagement: f64,
    pub reflection_depth: f64,
    pub positivity: f64,
}

impl GrowthBreakdown {
    pub fn total(&self) -> f64 {
        self.consistency
            + self.sentiment_trajectory
            + self.engagement
            + self.reflection_depth
            + self.positivity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthScore {
    pub score: u8,
    pub band: GrowthBand,
    pub label: String,
    pub breakdown: GrowthBreakdown,
}

impl GrowthScore {
    pub fn no_data() -> Self {
        Self {
            score: 0,
            band: GrowthBand::NoData,
            label: GrowthBand::NoData.label().to_string(),
            breakdown: GrowthBreakdown::default(),
        }
    }
}

pub fn growth_score<Tz: TimeZone>(entries: &[JournalEntry], now: &DateTime<Tz>) -> GrowthScore {
    let streak = writing_streak(entries, now);
    let trend = mood_trend(entries, now);
    growth_score_with(entries, now, streak, &trend)
}

/// Same as [`growth_score`] with streak and trend already computed.
pub fn growth_score_with<Tz: TimeZone>(
    entries: &[JournalEntry],
    now: &DateTime<Tz>,
    streak: u32,
    trend: &MoodTrend,
) -> GrowthScore {
    if entries.is_empty() {
        return GrowthScore::no_data();
    }

    let breakdown = GrowthBreakdown {
        consistency: consistency_points(streak),
        sentiment_trajectory: trajectory_points(trend.direction),
        engagement: engagement_points(entries, &now.with_timezone(&Utc)),
        reflection_depth: depth_points(entries),
        positivity: positivity_points(entries),
    };

    let score = breakdown.total().round().clamp(0.0, 100.0) as u8;
    let band = GrowthBand::for_score(score);
    GrowthScore {
        score,
        band,
        label: band.label().to_string(),
        breakdown,
    }
}

fn consistency_points(streak: u32) -> f64 {
    (f64::from(streak) * 2.0).min(COMPONENT_CAP)
}

fn trajectory_points(direction: TrendDirection) -> f64 {
    match direction {
        TrendDirection::Improving => 20.0,
        TrendDirection::Stable => 10.0,
        TrendDirection::Declining => 5.0,
    }
}

/// Entries per day since the earliest entry, with the day count held at >= 1.
fn engagement_points(entries: &[JournalEntry], now: &DateTime<Utc>) -> f64 {
    let Some(first) = entries.iter().map(|e| e.timestamp).min() else {
        return 0.0;
    };
    let days = ((*now - first).num_seconds() as f64 / 86_400.0).ceil().max(1.0);
    (entries.len() as f64 / days * 10.0).min(COMPONENT_CAP)
}

fn depth_points(entries: &[JournalEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let words: usize = entries.iter().map(|e| e.word_count).sum();
    let average = words as f64 / entries.len() as f64;
    (average / 5.0).min(COMPONENT_CAP)
}

fn positivity_points(entries: &[JournalEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let positive = entries.iter().filter(|e| e.sentiment.is_positive()).count();
    positive as f64 / entries.len() as f64 * COMPONENT_CAP
}
