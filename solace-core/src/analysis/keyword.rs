//! Deterministic keyword analysis, used whenever the remote model is
//! unavailable. Pure and synchronous.

use super::{Analysis, Reflection};
use crate::metrics::top_k;
use crate::models::{Emotion, Sentiment};
use crate::prompts::JournalContext;

const POSITIVE_WORDS: &[&str] = &[
    "happy", "great", "good", "wonderful", "amazing", "love", "loved", "grateful", "thankful",
    "excited", "joy", "joyful", "proud", "calm", "peaceful", "relaxed", "hopeful", "better",
    "fantastic", "awesome", "glad", "content", "accomplished", "beautiful", "fun", "enjoyed",
    "smiled", "laughed",
];

const NEGATIVE_WORDS: &[&str] = &[
    "sad", "angry", "upset", "anxious", "worried", "stressed", "terrible", "awful", "bad", "hate",
    "lonely", "tired", "exhausted", "frustrated", "depressed", "scared", "afraid", "hurt",
    "miserable", "overwhelmed", "disappointed", "cried", "worse", "nervous", "annoyed", "sick",
];

const EMOTION_WORDS: &[(Emotion, &[&str])] = &[
    (
        Emotion::Joy,
        &["happy", "joy", "joyful", "glad", "excited", "delighted", "laughed", "smiled", "fun", "love"],
    ),
    (
        Emotion::Sadness,
        &["sad", "lonely", "cried", "miss", "grief", "depressed", "down", "hurt", "disappointed"],
    ),
    (
        Emotion::Anger,
        &["angry", "mad", "furious", "annoyed", "frustrated", "irritated", "hate"],
    ),
    (
        Emotion::Fear,
        &["anxious", "worried", "scared", "afraid", "nervous", "panic", "fear", "dread"],
    ),
    (
        Emotion::Surprise,
        &["surprised", "unexpected", "shocked", "suddenly", "amazed"],
    ),
    (
        Emotion::Disgust,
        &["disgusted", "gross", "revolting", "nasty"],
    ),
];

const THEME_WORDS: &[(&str, &[&str])] = &[
    (
        "work",
        &["work", "job", "boss", "office", "meeting", "project", "career", "colleague", "coworker"],
    ),
    (
        "relationships",
        &["friend", "friends", "family", "partner", "mom", "dad", "wife", "husband", "girlfriend",
          "boyfriend", "relationship", "kids"],
    ),
    (
        "health",
        &["health", "sleep", "slept", "exercise", "workout", "gym", "run", "doctor", "sick", "diet"],
    ),
    (
        "creativity",
        &["write", "writing", "paint", "painting", "music", "art", "create", "creative", "design", "draw"],
    ),
    (
        "stress",
        &["stress", "stressed", "pressure", "overwhelmed", "anxious", "busy", "deadline"],
    ),
    (
        "gratitude",
        &["grateful", "thankful", "gratitude", "appreciate", "blessed"],
    ),
    (
        "goals",
        &["goal", "goals", "plan", "progress", "achieve", "resolution", "habit", "learn"],
    ),
    (
        "nature",
        &["nature", "walk", "park", "outside", "hike", "garden", "trees", "beach", "ocean"],
    ),
];

const MAX_LABELS: usize = 3;
const CONFIDENCE_NO_SIGNAL: f64 = 0.3;
const CONFIDENCE_WITH_SIGNAL: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct KeywordAnalyzer;

impl KeywordAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn name(&self) -> &str {
        "keyword"
    }

    pub fn analyze(&self, text: &str) -> Analysis {
        let tokens = tokenize(text);

        let positive = tokens.iter().filter(|t| POSITIVE_WORDS.contains(&t.as_str())).count();
        let negative = tokens.iter().filter(|t| NEGATIVE_WORDS.contains(&t.as_str())).count();
        let sentiment = sentiment_from_counts(positive, negative);

        let emotions = top_k(
            tokens.iter().flat_map(|t| {
                EMOTION_WORDS
                    .iter()
                    .filter(move |(_, words)| words.contains(&t.as_str()))
                    .map(|(emotion, _)| *emotion)
            }),
            MAX_LABELS,
        )
        .into_iter()
        .map(|c| c.label)
        .collect::<Vec<_>>();

        let themes = top_k(
            tokens.iter().flat_map(|t| {
                THEME_WORDS
                    .iter()
                    .filter(move |(_, words)| words.contains(&t.as_str()))
                    .map(|(theme, _)| theme.to_string())
            }),
            MAX_LABELS,
        )
        .into_iter()
        .map(|c| c.label)
        .collect::<Vec<_>>();

        let has_signal = positive + negative > 0 || !emotions.is_empty() || !themes.is_empty();
        let confidence = if has_signal {
            CONFIDENCE_WITH_SIGNAL
        } else {
            CONFIDENCE_NO_SIGNAL
        };

        Analysis {
            sentiment,
            emotions,
            themes,
            confidence,
        }
    }

    /// Canned reply keyed by sentiment; the follow-up question prefers the
    /// entry's top theme, then recent themes from `context`.
    pub fn reflect(&self, analysis: &Analysis, context: &JournalContext) -> Reflection {
        let reply = match analysis.sentiment {
            Sentiment::VeryPositive => {
                "It's wonderful to read how good things feel right now. Moments like this are worth holding onto."
            }
            Sentiment::Positive => {
                "It sounds like there's some real brightness in your day. Thank you for capturing it."
            }
            Sentiment::Neutral => {
                "Thank you for taking a moment to write this down. Noticing the everyday is a practice in itself."
            }
            Sentiment::Negative => {
                "That sounds hard, and it makes sense to feel this way. Thank you for putting it into words."
            }
            Sentiment::VeryNegative => {
                "I'm really sorry you're carrying so much right now. You don't have to sort it all out at once; writing it down is a meaningful step."
            }
        };

        let follow_up = analysis
            .themes
            .iter()
            .chain(context.recent_themes.iter())
            .find_map(|theme| theme_question(theme))
            .unwrap_or_else(|| sentiment_question(analysis.sentiment));

        Reflection {
            reply: reply.to_string(),
            follow_up_question: follow_up.to_string(),
        }
    }
}

/// Lower-cased word tokens; apostrophes stay inside words.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn sentiment_from_counts(positive: usize, negative: usize) -> Sentiment {
    let net = positive as i64 - negative as i64;
    match net {
        n if n >= 3 => Sentiment::VeryPositive,
        1..=2 => Sentiment::Positive,
        0 => Sentiment::Neutral,
        -2..=-1 => Sentiment::Negative,
        _ => Sentiment::VeryNegative,
    }
}

fn theme_question(theme: &str) -> Option<&'static str> {
    let question = match theme {
        "work" => "What part of your work is taking up the most space in your mind?",
        "relationships" => "How are the people around you shaping the way you feel lately?",
        "health" => "How has your body been feeling, and what does it need from you?",
        "creativity" => "What would you make if you knew nobody else would see it?",
        "stress" => "What is one thing you could set down, even for a little while?",
        "gratitude" => "What else has quietly been going right for you?",
        "goals" => "What small step could move you closer to what you want?",
        "nature" => "What did you notice about the world around you today?",
        _ => return None,
    };
    Some(question)
}

fn sentiment_question(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::VeryPositive | Sentiment::Positive => "What made today feel this way?",
        Sentiment::Neutral => "What's one thing you'd like to remember about today?",
        Sentiment::Negative | Sentiment::VeryNegative => {
            "What is one small thing that could make tomorrow a little easier?"
        }
    }
}
