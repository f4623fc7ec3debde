//! Mood trend over the trailing week, by least-squares slope of sentiment
//! score against entry sequence.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::JournalEntry;

pub const TREND_WINDOW_DAYS: i64 = 7;

/// Slopes beyond +/- this are a real trend.
pub const TREND_SLOPE_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodTrend {
    pub direction: TrendDirection,
    /// `None` when fewer than two entries fall in the window.
    pub slope: Option<f64>,
    pub sample_size: usize,
}

impl MoodTrend {
    fn insufficient(sample_size: usize) -> Self {
        Self {
            direction: TrendDirection::Stable,
            slope: None,
            sample_size,
        }
    }

    pub fn has_enough_data(&self) -> bool {
        self.slope.is_some()
    }
}

/// Entries with a timestamp at or after `now - 7 days`, oldest first.
pub fn trailing_week<'a, Tz: TimeZone>(
    entries: &'a [JournalEntry],
    now: &DateTime<Tz>,
) -> Vec<&'a JournalEntry> {
    let cutoff = now.with_timezone(&Utc) - Duration::days(TREND_WINDOW_DAYS);
    let mut window: Vec<&JournalEntry> = entries.iter().filter(|e| e.timestamp >= cutoff).collect();
    window.sort_by_key(|e| (e.timestamp, e.id));
    window
}

pub fn mood_trend<Tz: TimeZone>(entries: &[JournalEntry], now: &DateTime<Tz>) -> MoodTrend {
    let window = trailing_week(entries, now);
    if window.len() < 2 {
        return MoodTrend::insufficient(window.len());
    }

    let scores: Vec<f64> = window.iter().map(|e| f64::from(e.sentiment.score())).collect();
    let Some(slope) = regression_slope(&scores) else {
        return MoodTrend::insufficient(window.len());
    };

    let direction = if slope > TREND_SLOPE_THRESHOLD {
        TrendDirection::Improving
    } else if slope < -TREND_SLOPE_THRESHOLD {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    MoodTrend {
        direction,
        slope: Some(slope),
        sample_size: window.len(),
    }
}

/// OLS slope of `ys` against x = 0, 1, 2, ...
///
/// slope = (n*Sxy - Sx*Sy) / (n*Sxx - Sx^2). `None` for a zero denominator.
pub fn regression_slope(ys: &[f64]) -> Option<f64> {
    let n = ys.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in ys.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    Some((n * sum_xy - sum_x * sum_y) / denominator)
}
