//! Contextual writing prompts derived from recent entries.

use serde::{Deserialize, Serialize};

use crate::metrics::{average_sentiment, recent_window, top_emotions, top_themes};
use crate::models::{Emotion, JournalEntry, Sentiment};

pub const DEFAULT_PROMPT_LIMIT: usize = 3;

/// Summary of the most recent entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalContext {
    pub entry_count: usize,
    pub average_sentiment: Option<Sentiment>,
    pub recent_themes: Vec<String>,
    pub recent_emotions: Vec<Emotion>,
}

impl JournalContext {
    pub fn empty() -> Self {
        Self {
            entry_count: 0,
            average_sentiment: None,
            recent_themes: Vec::new(),
            recent_emotions: Vec::new(),
        }
    }

    /// Average sentiment, top themes and top emotions over the `window` most
    /// recent entries. `entry_count` covers the whole journal.
    pub fn from_entries(entries: &[JournalEntry], window: usize, top_k: usize) -> Self {
        let recent = recent_window(entries, window);
        Self {
            entry_count: entries.len(),
            average_sentiment: average_sentiment(entries, window),
            recent_themes: top_themes(recent.iter().copied(), top_k)
                .into_iter()
                .map(|c| c.label)
                .collect(),
            recent_emotions: top_emotions(recent.iter().copied(), top_k)
                .into_iter()
                .map(|c| c.label)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }
}

const STARTER_PROMPTS: &[&str] = &[
    "What's on your mind right now?",
    "Describe one moment from today you'd like to remember.",
    "How are you really feeling today?",
];

const SUPPORTIVE_PROMPTS: &[&str] = &[
    "What would you say to a friend who felt the way you do right now?",
    "What is one small thing that brought you comfort recently?",
    "What do you need most from yourself this week?",
];

const GENERAL_PROMPTS: &[&str] = &[
    "What surprised you recently?",
    "What are you looking forward to?",
    "What did you learn about yourself this week?",
    "Who made a difference in your day, and how?",
];

fn theme_prompt(theme: &str) -> Option<&'static str> {
    let prompt = match theme {
        "work" => "What is one thing about your work you'd like to change, and one you'd keep?",
        "relationships" => "Which relationship has been on your mind lately, and why?",
        "health" => "How have you been caring for your body and mind this week?",
        "stress" => "What is weighing on you most, and what part of it is within your control?",
        "gratitude" => "List three things you're grateful for today, however small.",
        "goals" => "What progress, however small, have you made toward a goal recently?",
        "creativity" => "What idea has been asking for your attention lately?",
        "nature" => "Describe a place outdoors where you feel most at ease.",
        _ => return None,
    };
    Some(prompt)
}

/// Deterministic prompt suggestions for `context`, at most `limit`.
///
/// Empty journal: starter prompts. Otherwise supportive prompts lead when the
/// recent average is negative, followed by prompts for known recent themes,
/// padded with general prompts.
pub fn suggest_prompts(context: &JournalContext, limit: usize) -> Vec<String> {
    if context.is_empty() {
        return STARTER_PROMPTS
            .iter()
            .take(limit)
            .map(|p| p.to_string())
            .collect();
    }

    let mut candidates: Vec<&'static str> = Vec::new();
    if context.average_sentiment.is_some_and(|s| s.is_negative()) {
        candidates.extend(SUPPORTIVE_PROMPTS.iter().take(2));
    }
    candidates.extend(context.recent_themes.iter().filter_map(|t| theme_prompt(t)));
    candidates.extend(GENERAL_PROMPTS.iter());

    let mut prompts: Vec<String> = Vec::new();
    for prompt in candidates {
        if prompts.len() == limit {
            break;
        }
        if !prompts.iter().any(|p| p == prompt) {
            prompts.push(prompt.to_string());
        }
    }
    prompts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{mood_entry, now, with_emotions, with_themes};
    use chrono::Duration;

    #[test]
    fn empty_journal_gets_starter_prompts() {
        let prompts = suggest_prompts(&JournalContext::empty(), DEFAULT_PROMPT_LIMIT);
        assert_eq!(prompts.len(), 3);
        assert_eq!(prompts[0], STARTER_PROMPTS[0]);
    }

    #[test]
    fn context_uses_recent_window_only() {
        let now = now();
        let mut entries = Vec::new();
        // Six old nature entries, then five recent work entries.
        for i in 0..6 {
            entries.push(with_themes(
                mood_entry(i + 1, now - Duration::days(30 - i as i64), Sentiment::Positive),
                &["nature"],
            ));
        }
        for i in 0..5 {
            let entry = mood_entry(i + 7, now - Duration::hours(5 - i as i64), Sentiment::Negative);
            let entry = with_emotions(with_themes(entry, &["work", "stress"]), &[Emotion::Fear]);
            entries.push(entry);
        }

        let context = JournalContext::from_entries(&entries, 5, 3);
        assert_eq!(context.entry_count, 11);
        assert_eq!(context.average_sentiment, Some(Sentiment::Negative));
        assert_eq!(context.recent_themes, vec!["work", "stress"]);
        assert_eq!(context.recent_emotions, vec![Emotion::Fear]);
    }

    #[test]
    fn negative_mood_leads_with_support_then_themes() {
        let context = JournalContext {
            entry_count: 4,
            average_sentiment: Some(Sentiment::Negative),
            recent_themes: vec!["work".to_string()],
            recent_emotions: vec![Emotion::Sadness],
        };
        let prompts = suggest_prompts(&context, 3);
        assert_eq!(prompts[0], SUPPORTIVE_PROMPTS[0]);
        assert_eq!(prompts[1], SUPPORTIVE_PROMPTS[1]);
        assert_eq!(prompts[2], theme_prompt("work").unwrap());
    }

    #[test]
    fn unknown_themes_fall_through_to_general() {
        let context = JournalContext {
            entry_count: 2,
            average_sentiment: Some(Sentiment::Positive),
            recent_themes: vec!["astronomy".to_string(), "gratitude".to_string()],
            recent_emotions: Vec::new(),
        };
        let prompts = suggest_prompts(&context, 2);
        assert_eq!(
            prompts,
            vec![
                theme_prompt("gratitude").unwrap().to_string(),
                GENERAL_PROMPTS[0].to_string()
            ]
        );
    }

    #[test]
    fn limit_is_respected_and_suggestions_are_stable() {
        let context = JournalContext {
            entry_count: 1,
            average_sentiment: Some(Sentiment::Neutral),
            recent_themes: Vec::new(),
            recent_emotions: Vec::new(),
        };
        assert!(suggest_prompts(&context, 0).is_empty());
        let many = suggest_prompts(&context, 10);
        assert_eq!(many.len(), GENERAL_PROMPTS.len());
        assert_eq!(many, suggest_prompts(&context, 10));
    }
}
