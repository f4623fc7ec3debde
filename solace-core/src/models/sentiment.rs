use serde::{Deserialize, Serialize};

/// Five-point ordered sentiment scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    VeryNegative,
    Negative,
    #[default]
    Neutral,
    Positive,
    VeryPositive,
}

impl Sentiment {
    /// All classes, most negative first.
    pub const ALL: [Sentiment; 5] = [
        Self::VeryNegative,
        Self::Negative,
        Self::Neutral,
        Self::Positive,
        Self::VeryPositive,
    ];

    /// Integer score used by trend regression and averaging (-2..=2).
    pub fn score(&self) -> i8 {
        match self {
            Self::VeryNegative => -2,
            Self::Negative => -1,
            Self::Neutral => 0,
            Self::Positive => 1,
            Self::VeryPositive => 2,
        }
    }

    /// Bucket a mean score back into a class.
    ///
    /// Breakpoints: >= 1.5 very_positive, >= 0.5 positive, >= -0.5 neutral,
    /// >= -1.5 negative, else very_negative.
    pub fn from_score(score: f64) -> Self {
        if score >= 1.5 {
            Self::VeryPositive
        } else if score >= 0.5 {
            Self::Positive
        } else if score >= -0.5 {
            Self::Neutral
        } else if score >= -1.5 {
            Self::Negative
        } else {
            Self::VeryNegative
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Positive | Self::VeryPositive)
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Self::Negative | Self::VeryNegative)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryNegative => "very_negative",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
            Self::VeryPositive => "very_positive",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "very_negative" => Ok(Self::VeryNegative),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            "positive" => Ok(Self::Positive),
            "very_positive" => Ok(Self::VeryPositive),
            other => Err(format!("unknown sentiment: {other}")),
        }
    }
}

/// Fixed emotion vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Joy => "joy",
            Self::Sadness => "sadness",
            Self::Anger => "anger",
            Self::Fear => "fear",
            Self::Surprise => "surprise",
            Self::Disgust => "disgust",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "joy" => Ok(Self::Joy),
            "sadness" => Ok(Self::Sadness),
            "anger" => Ok(Self::Anger),
            "fear" => Ok(Self::Fear),
            "surprise" => Ok(Self::Surprise),
            "disgust" => Ok(Self::Disgust),
            other => Err(format!("unknown emotion: {other}")),
        }
    }
}

/// Curated theme vocabulary. Themes are open-ended; these are the ones the
/// keyword analyzer and prompt suggestions know about.
pub const KNOWN_THEMES: [&str; 8] = [
    "work",
    "relationships",
    "health",
    "creativity",
    "stress",
    "gratitude",
    "goals",
    "nature",
];

/// Normalize a theme label: trimmed, lower-cased, inner whitespace collapsed to `_`.
pub fn normalize_theme(raw: &str) -> Option<String> {
    let theme = raw
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    if theme.is_empty() {
        None
    } else {
        Some(theme)
    }
}
