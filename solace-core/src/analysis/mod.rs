//! Analysis adapter: turns entry text into a structured analysis plus a
//! companion reply.
//!
//! - **Remote**: a language-model Messages API via [`RemoteAnalysisClient`]
//! - **Keyword**: deterministic lexicon matching via [`KeywordAnalyzer`]
//!
//! [`Companion`] runs the remote backend under a timeout and substitutes the
//! keyword result on any failure, so callers always get a complete
//! [`AnalysisOutcome`].

pub mod keyword;
pub mod remote;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::models::{AnalysisSource, Emotion, Sentiment};
use crate::prompts::JournalContext;

pub use keyword::KeywordAnalyzer;
pub use remote::{RemoteAnalysisClient, RemoteConfig};

/// Structured reading of one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub sentiment: Sentiment,
    pub emotions: Vec<Emotion>,
    pub themes: Vec<String>,
    /// In `[0.0, 1.0]`.
    pub confidence: f64,
}

/// The companion's answer to an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub reply: String,
    pub follow_up_question: String,
}

/// Result of the analysis pipeline. Both variants carry a full analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Analyzed {
        analysis: Analysis,
        reflection: Reflection,
    },
    Fallback {
        analysis: Analysis,
        reflection: Reflection,
        reason: String,
    },
}

impl AnalysisOutcome {
    pub fn analysis(&self) -> &Analysis {
        match self {
            Self::Analyzed { analysis, .. } | Self::Fallback { analysis, .. } => analysis,
        }
    }

    pub fn reflection(&self) -> &Reflection {
        match self {
            Self::Analyzed { reflection, .. } | Self::Fallback { reflection, .. } => reflection,
        }
    }

    pub fn source(&self) -> AnalysisSource {
        match self {
            Self::Analyzed { .. } => AnalysisSource::Remote,
            Self::Fallback { .. } => AnalysisSource::Fallback,
        }
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Self::Analyzed { .. } => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Analysis errors. Never escape [`Companion::reflect`].
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Missing API key")]
    MissingApiKey,

    #[error("All {attempts} attempts failed")]
    RetryExhausted { attempts: usize },

    #[error("Analysis timed out after {millis}ms")]
    Timeout { millis: u64 },
}

/// A source of analyses.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(
        &self,
        text: &str,
        context: &JournalContext,
    ) -> Result<(Analysis, Reflection), AnalysisError>;

    /// Backend name for logging and health output.
    fn name(&self) -> &str;
}

/// The analysis pipeline used for every new entry.
pub struct Companion {
    remote: Option<Arc<dyn AnalysisBackend>>,
    keyword: KeywordAnalyzer,
    timeout: Duration,
}

impl Companion {
    pub fn new(remote: Option<Arc<dyn AnalysisBackend>>, timeout: Duration) -> Self {
        Self {
            remote,
            keyword: KeywordAnalyzer::new(),
            timeout,
        }
    }

    /// Keyword analysis only; every outcome is a `Fallback`.
    pub fn keyword_only() -> Self {
        Self::new(None, Duration::from_secs(0))
    }

    /// Build from config. A missing API key or unknown backend degrades to
    /// keyword-only with a warning instead of failing startup.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_seconds);
        match config.backend.as_str() {
            "keyword" => {
                tracing::info!("analysis backend: keyword only");
                Self::new(None, timeout)
            }
            "remote" => {
                let Some(api_key) = config.api_key() else {
                    tracing::warn!(
                        env = %config.api_key_env,
                        "no API key set, entries will use keyword analysis"
                    );
                    return Self::new(None, timeout);
                };
                match RemoteAnalysisClient::new(RemoteConfig::from_analysis_config(config, api_key)) {
                    Ok(client) => {
                        tracing::info!(model = %config.model, "analysis backend: remote");
                        Self::new(Some(Arc::new(client)), timeout)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "remote analysis unavailable, using keyword analysis");
                        Self::new(None, timeout)
                    }
                }
            }
            other => {
                tracing::warn!(backend = %other, "unknown analysis backend, using keyword analysis");
                Self::new(None, timeout)
            }
        }
    }

    pub fn backend_name(&self) -> &str {
        match &self.remote {
            Some(remote) => remote.name(),
            None => self.keyword.name(),
        }
    }

    /// Analyze `text`. Remote errors and timeouts become a keyword `Fallback`.
    pub async fn reflect(&self, text: &str, context: &JournalContext) -> AnalysisOutcome {
        let Some(remote) = &self.remote else {
            return self.fallback(text, context, "remote analysis not configured".to_string());
        };

        match tokio::time::timeout(self.timeout, remote.analyze(text, context)).await {
            Ok(Ok((analysis, reflection))) => AnalysisOutcome::Analyzed {
                analysis,
                reflection,
            },
            Ok(Err(e)) => {
                tracing::warn!(backend = remote.name(), error = %e, "remote analysis failed, using keyword fallback");
                self.fallback(text, context, e.to_string())
            }
            Err(_) => {
                let e = AnalysisError::Timeout {
                    millis: self.timeout.as_millis() as u64,
                };
                tracing::warn!(backend = remote.name(), error = %e, "remote analysis timed out, using keyword fallback");
                self.fallback(text, context, e.to_string())
            }
        }
    }

    fn fallback(&self, text: &str, context: &JournalContext, reason: String) -> AnalysisOutcome {
        let analysis = self.keyword.analyze(text);
        let reflection = self.keyword.reflect(&analysis, context);
        AnalysisOutcome::Fallback {
            analysis,
            reflection,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBackend;

    #[async_trait]
    impl AnalysisBackend for FixedBackend {
        async fn analyze(
            &self,
            _text: &str,
            _context: &JournalContext,
        ) -> Result<(Analysis, Reflection), AnalysisError> {
            Ok((
                Analysis {
                    sentiment: Sentiment::VeryPositive,
                    emotions: vec![Emotion::Joy],
                    themes: vec!["nature".to_string()],
                    confidence: 0.9,
                },
                Reflection {
                    reply: "What a lovely day.".to_string(),
                    follow_up_question: "Where did you walk?".to_string(),
                },
            ))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl AnalysisBackend for FailingBackend {
        async fn analyze(
            &self,
            _text: &str,
            _context: &JournalContext,
        ) -> Result<(Analysis, Reflection), AnalysisError> {
            Err(AnalysisError::Api {
                code: 529,
                message: "overloaded".to_string(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct SlowBackend;

    #[async_trait]
    impl AnalysisBackend for SlowBackend {
        async fn analyze(
            &self,
            text: &str,
            context: &JournalContext,
        ) -> Result<(Analysis, Reflection), AnalysisError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            FixedBackend.analyze(text, context).await
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn remote_success_is_analyzed() {
        let companion = Companion::new(Some(Arc::new(FixedBackend)), Duration::from_secs(1));
        let outcome = companion.reflect("walked by the river", &JournalContext::empty()).await;

        assert_eq!(outcome.source(), AnalysisSource::Remote);
        assert_eq!(outcome.analysis().sentiment, Sentiment::VeryPositive);
        assert_eq!(outcome.reflection().follow_up_question, "Where did you walk?");
        assert!(outcome.fallback_reason().is_none());
        assert_eq!(companion.backend_name(), "fixed");
    }

    #[tokio::test]
    async fn remote_error_falls_back_to_keywords() {
        let companion = Companion::new(Some(Arc::new(FailingBackend)), Duration::from_secs(1));
        let outcome = companion
            .reflect("I feel so happy and grateful today", &JournalContext::empty())
            .await;

        assert_eq!(outcome.source(), AnalysisSource::Fallback);
        assert!(outcome.fallback_reason().unwrap().contains("overloaded"));
        assert!(outcome.analysis().sentiment.is_positive());
        assert!(!outcome.reflection().reply.is_empty());
    }

    #[tokio::test]
    async fn remote_timeout_falls_back_to_keywords() {
        let companion = Companion::new(Some(Arc::new(SlowBackend)), Duration::from_millis(50));
        let outcome = companion.reflect("ordinary day", &JournalContext::empty()).await;

        assert_eq!(outcome.source(), AnalysisSource::Fallback);
        assert!(outcome.fallback_reason().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn keyword_only_always_falls_back() {
        let companion = Companion::keyword_only();
        let outcome = companion.reflect("meeting ran late at work", &JournalContext::empty()).await;

        assert_eq!(outcome.source(), AnalysisSource::Fallback);
        assert_eq!(companion.backend_name(), "keyword");
        assert!(outcome.analysis().themes.contains(&"work".to_string()));
    }

    #[test]
    fn from_config_without_key_is_keyword_only() {
        let config = AnalysisConfig {
            api_key_env: "SOLACE_TEST_MISSING_KEY_ANALYSIS".to_string(),
            ..AnalysisConfig::default()
        };
        std::env::remove_var(&config.api_key_env);
        let companion = Companion::from_config(&config);
        assert_eq!(companion.backend_name(), "keyword");
    }

    #[test]
    fn from_config_with_key_is_remote() {
        let config = AnalysisConfig {
            api_key_env: "SOLACE_TEST_PRESENT_KEY_ANALYSIS".to_string(),
            ..AnalysisConfig::default()
        };
        std::env::set_var(&config.api_key_env, "test-key");
        let companion = Companion::from_config(&config);
        assert_eq!(companion.backend_name(), "remote");
        std::env::remove_var(&config.api_key_env);
    }
}
