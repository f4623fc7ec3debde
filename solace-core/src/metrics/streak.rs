//! Writing streak: consecutive calendar days with at least one entry.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::models::JournalEntry;

/// Upper bound on the backward day scan.
pub const MAX_STREAK_SCAN_DAYS: u32 = 365;

/// Calendar dates (in `now`'s time zone) that hold at least one entry.
pub fn entry_days<Tz: TimeZone>(entries: &[JournalEntry], now: &DateTime<Tz>) -> HashSet<NaiveDate> {
    let zone = now.timezone();
    entries
        .iter()
        .map(|e| e.timestamp.with_timezone(&zone).date_naive())
        .collect()
}

/// Count consecutive populated days ending today, or yesterday when today has
/// no entry yet. A missing today does not break the streak on its own.
pub fn writing_streak<Tz: TimeZone>(entries: &[JournalEntry], now: &DateTime<Tz>) -> u32 {
    let days = entry_days(entries, now);
    if days.is_empty() {
        return 0;
    }

    let today = now.date_naive();
    let mut day = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(d) => d,
            None => return 0,
        }
    };

    let mut streak = 0;
    for _ in 0..MAX_STREAK_SCAN_DAYS {
        if !days.contains(&day) {
            break;
        }
        streak += 1;
        day = match day.pred_opt() {
            Some(d) => d,
            None => break,
        };
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{entry_at, now};
    use chrono::{Duration, FixedOffset, Utc};

    #[test]
    fn empty_entries_have_no_streak() {
        assert_eq!(writing_streak(&[], &now()), 0);
    }

    #[test]
    fn consecutive_days_ending_today() {
        let now = now();
        let entries: Vec<_> = (0..4)
            .map(|d| entry_at(d as u64 + 1, now - Duration::days(d)))
            .collect();
        assert_eq!(writing_streak(&entries, &now), 4);
    }

    #[test]
    fn missing_today_starts_from_yesterday() {
        let now = now();
        let entries = vec![
            entry_at(1, now - Duration::days(1)),
            entry_at(2, now - Duration::days(2)),
        ];
        assert_eq!(writing_streak(&entries, &now), 2);
    }

    #[test]
    fn gap_breaks_the_streak() {
        let now = now();
        let entries = vec![
            entry_at(1, now),
            entry_at(2, now - Duration::days(1)),
            entry_at(3, now - Duration::days(3)),
            entry_at(4, now - Duration::days(4)),
        ];
        assert_eq!(writing_streak(&entries, &now), 2);
    }

    #[test]
    fn last_entry_two_days_ago_means_no_streak() {
        let now = now();
        let entries = vec![entry_at(1, now - Duration::days(2))];
        assert_eq!(writing_streak(&entries, &now), 0);
    }

    #[test]
    fn multiple_entries_same_day_count_once() {
        let now = now();
        let entries = vec![
            entry_at(1, now),
            entry_at(2, now - Duration::hours(1)),
            entry_at(3, now - Duration::hours(2)),
        ];
        assert_eq!(writing_streak(&entries, &now), 1);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let now = now();
        let entries = vec![
            entry_at(1, now - Duration::days(2)),
            entry_at(2, now),
            entry_at(3, now - Duration::days(1)),
        ];
        assert_eq!(writing_streak(&entries, &now), 3);
    }

    #[test]
    fn scan_is_bounded() {
        let now = now();
        let entries: Vec<_> = (0..400)
            .map(|d| entry_at(d as u64 + 1, now - Duration::days(d)))
            .collect();
        assert_eq!(writing_streak(&entries, &now), MAX_STREAK_SCAN_DAYS);
    }

    #[test]
    fn buckets_use_callers_time_zone() {
        // 2026-03-10 23:30 UTC is already 2026-03-11 in UTC+2.
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 3, 10, 23, 30, 0).unwrap();
        let now_local = Utc
            .with_ymd_and_hms(2026, 3, 11, 9, 0, 0)
            .unwrap()
            .with_timezone(&plus_two);
        let entries = vec![entry_at(1, late)];

        assert_eq!(writing_streak(&entries, &now_local), 1);
        // In UTC the same entry lands on the previous day, which is yesterday.
        assert_eq!(writing_streak(&entries, &now_local.with_timezone(&Utc)), 1);
        let day_after = now_local + Duration::days(1);
        assert_eq!(writing_streak(&entries, &day_after), 1);
        assert_eq!(writing_streak(&entries, &day_after.with_timezone(&Utc)), 0);
    }
}
