//! Remote analysis over a language-model Messages API.
//!
//! One request per entry: the model is asked for a single JSON object holding
//! the analysis and the companion reply. Responses are validated before they
//! reach the store; anything unusable is an [`AnalysisError`].

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

use super::{Analysis, AnalysisBackend, AnalysisError, Reflection};
use crate::config::AnalysisConfig;
use crate::models::{normalize_theme, Emotion, Sentiment, KNOWN_THEMES};
use crate::prompts::JournalContext;

const API_VERSION: &str = "2023-06-01";

const DEFAULT_FOLLOW_UP: &str = "What else would you like to explore about this?";

const SYSTEM_PROMPT: &str = "You are a warm, supportive journaling companion. \
Read the journal entry and answer with ONE JSON object and nothing else, with keys: \
\"sentiment\" (one of very_negative, negative, neutral, positive, very_positive), \
\"emotions\" (array drawn from joy, sadness, anger, fear, surprise, disgust), \
\"themes\" (array of short lower-case life areas), \
\"confidence\" (number between 0 and 1), \
\"reply\" (two or three empathetic sentences), \
\"follow_up_question\" (one gentle open question).";

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    pub request_timeout: Duration,
}

impl RemoteConfig {
    pub fn from_analysis_config(config: &AnalysisConfig, api_key: String) -> Self {
        Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
            request_timeout: Duration::from_secs(config.timeout_seconds.max(1)),
        }
    }
}

// ============================================================================
// Wire structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// The JSON object the model is asked to produce.
#[derive(Debug, Deserialize)]
struct ModelAnswer {
    sentiment: String,
    #[serde(default)]
    emotions: Vec<String>,
    #[serde(default)]
    themes: Vec<String>,
    #[serde(default)]
    confidence: Option<f64>,
    reply: String,
    #[serde(default)]
    follow_up_question: Option<String>,
}

// ============================================================================
// RemoteAnalysisClient
// ============================================================================

#[derive(Debug, Clone)]
pub struct RemoteAnalysisClient {
    client: Client,
    config: RemoteConfig,
}

impl RemoteAnalysisClient {
    pub fn new(config: RemoteConfig) -> Result<Self, AnalysisError> {
        if config.api_key.is_empty() {
            return Err(AnalysisError::MissingApiKey);
        }

        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self { client, config })
    }

    /// Analyze with retries (exponential backoff + jitter). Only transient
    /// failures are retried; anything else is returned as-is.
    pub async fn analyze_with_retry(
        &self,
        text: &str,
        context: &JournalContext,
    ) -> Result<(Analysis, Reflection), AnalysisError> {
        let retry_strategy = ExponentialBackoff::from_millis(self.config.retry_delay_ms.max(1))
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(self.config.max_retries);

        let attempts = self.config.max_retries + 1;
        let result =
            RetryIf::spawn(retry_strategy, || self.analyze_once(text, context), is_retryable).await;
        match result {
            Ok(answer) => Ok(answer),
            Err(e) if is_retryable(&e) => {
                tracing::error!(attempts, error = %e, "All analysis attempts failed");
                Err(AnalysisError::RetryExhausted { attempts })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Analysis failed, not retrying");
                Err(e)
            }
        }
    }

    async fn analyze_once(
        &self,
        text: &str,
        context: &JournalContext,
    ) -> Result<(Analysis, Reflection), AnalysisError> {
        let url = format!("{}/v1/messages", self.config.base_url);
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: user_message(text, context),
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| e.message)
                .unwrap_or(body);

            tracing::error!(code = status.as_u16(), message = %message, "analysis API error");
            return Err(AnalysisError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let response: MessagesResponse = response.json().await?;
        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        parse_answer(&text)
    }
}

#[async_trait]
impl AnalysisBackend for RemoteAnalysisClient {
    async fn analyze(
        &self,
        text: &str,
        context: &JournalContext,
    ) -> Result<(Analysis, Reflection), AnalysisError> {
        self.analyze_with_retry(text, context).await
    }

    fn name(&self) -> &str {
        "remote"
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Entry text plus a short summary of recent entries.
fn user_message(text: &str, context: &JournalContext) -> String {
    let mut message = String::new();
    if context.entry_count > 0 {
        message.push_str("Recent journal context:\n");
        if let Some(avg) = context.average_sentiment {
            message.push_str(&format!("- average recent sentiment: {avg}\n"));
        }
        if !context.recent_themes.is_empty() {
            message.push_str(&format!("- recent themes: {}\n", context.recent_themes.join(", ")));
        }
        if !context.recent_emotions.is_empty() {
            let emotions: Vec<&str> = context.recent_emotions.iter().map(Emotion::as_str).collect();
            message.push_str(&format!("- recent emotions: {}\n", emotions.join(", ")));
        }
        message.push('\n');
    }
    message.push_str("Journal entry:\n");
    message.push_str(text);
    message
}

/// Transport failures, rate limiting and server-side errors.
fn is_retryable(err: &AnalysisError) -> bool {
    match err {
        AnalysisError::Http(_) => true,
        AnalysisError::Api { code, .. } => *code == 429 || *code >= 500,
        _ => false,
    }
}

fn json_object_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").ok()).as_ref()
}

/// Pull the first `{ ... }` span out of model output that may carry prose or
/// code fences around it.
fn extract_json_object(text: &str) -> Option<&str> {
    json_object_regex()?.find(text).map(|m| m.as_str())
}

fn parse_answer(text: &str) -> Result<(Analysis, Reflection), AnalysisError> {
    let json = extract_json_object(text)
        .ok_or_else(|| AnalysisError::MalformedResponse("no JSON object in response".into()))?;
    let answer: ModelAnswer = serde_json::from_str(json)
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

    let sentiment: Sentiment = answer
        .sentiment
        .parse()
        .map_err(AnalysisError::MalformedResponse)?;

    let mut emotions: Vec<Emotion> = Vec::new();
    for label in &answer.emotions {
        match label.parse::<Emotion>() {
            Ok(e) if !emotions.contains(&e) => emotions.push(e),
            Ok(_) => {}
            Err(_) => tracing::debug!(label = %label, "dropping unknown emotion label"),
        }
    }

    let mut themes: Vec<String> = Vec::new();
    for theme in answer.themes.iter().filter_map(|t| normalize_theme(t)) {
        if !themes.contains(&theme) {
            if !KNOWN_THEMES.contains(&theme.as_str()) {
                tracing::debug!(theme = %theme, "model returned uncurated theme");
            }
            themes.push(theme);
        }
    }

    let confidence = answer
        .confidence
        .filter(|c| c.is_finite())
        .unwrap_or(0.5)
        .clamp(0.0, 1.0);

    let reply = answer.reply.trim().to_string();
    if reply.is_empty() {
        return Err(AnalysisError::MalformedResponse("empty reply".into()));
    }

    let follow_up_question = answer
        .follow_up_question
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| DEFAULT_FOLLOW_UP.to_string());

    Ok((
        Analysis {
            sentiment,
            emotions,
            themes,
            confidence,
        },
        Reflection {
            reply,
            follow_up_question,
        },
    ))
}

// ============================================================================
// TESTS
// ============================================================================
