//! Solace HTTP REST API
//!
//! Axum-based HTTP server exposing the journal, its derived metrics and prompt
//! suggestions.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to an
//! inner function returning `(StatusCode, serde_json::Value)`. Inner functions
//! take `now` explicitly so date-dependent output is testable.
//!
//! Endpoints:
//! - GET  /health       : status, entry count, analysis backend
//! - GET  /version      : server version info
//! - POST /entries      : analyse and store a new entry
//! - GET  /entries      : most recent entries (`?limit=`, default 50)
//! - GET  /entries/:id  : one entry
//! - GET  /metrics      : streak, mood trend, current mood, growth score
//! - GET  /insights     : dashboard aggregates plus metrics
//! - GET  /prompts      : contextual writing prompts (`?limit=`)

use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use solace_core::config::InsightsConfig;
use solace_core::metrics::{average_sentiment, sentiment_distribution, top_emotions, top_themes};
use solace_core::models::NewEntry;
use solace_core::{
    derive_metrics, suggest_prompts, Companion, EntryStore, JournalContext, SolaceConfig,
    DEFAULT_PROMPT_LIMIT,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

pub const DEFAULT_ENTRY_LIMIT: usize = 50;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub store: EntryStore,
    pub companion: Arc<Companion>,
    pub config: SolaceConfig,
}

impl HttpState {
    pub fn from_config(config: SolaceConfig) -> Self {
        Self {
            store: EntryStore::new(config.store.max_entries),
            companion: Arc::new(Companion::from_config(&config.analysis)),
            config,
        }
    }
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/entries", get(list_entries_handler).post(create_entry_handler))
        .route("/entries/:id", get(get_entry_handler))
        .route("/metrics", get(metrics_handler))
        .route("/insights", get(insights_handler))
        .route("/prompts", get(prompts_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: HttpState,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", state.config.http.host, state.config.http.port);

    let app = build_router(Arc::new(state));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Solace HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct CreateEntryRequest {
    pub text: Option<String>,
    /// RFC 3339; defaults to the time of the request.
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// Standard HTTP error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            status: "error".to_string(),
        }
    }

    fn into_value(self) -> serde_json::Value {
        serde_json::json!({
            "error": self.error,
            "status": self.status,
        })
    }
}

fn error_body(status: StatusCode, msg: impl Into<String>) -> (StatusCode, serde_json::Value) {
    (status, ErrorResponse::new(msg).into_value())
}

/// Body extraction failures keep the JSON error contract.
fn rejection_body(rej: &JsonRejection) -> (StatusCode, serde_json::Value) {
    error_body(rej.status(), rej.body_text())
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

pub async fn health_inner(store: &EntryStore, companion: &Companion) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::OK,
        serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "entries": store.len().await,
            "analysis_backend": companion.backend_name(),
        }),
    )
}

/// Inner version: returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "solace/1",
    })
}

/// Validate, analyse with recent context, then store.
pub async fn create_entry_inner(
    state: &HttpState,
    req: CreateEntryRequest,
    now: DateTime<Utc>,
) -> (StatusCode, serde_json::Value) {
    let timestamp = match req.timestamp.as_deref().map(parse_timestamp) {
        None => now,
        Some(Ok(ts)) => ts,
        Some(Err(msg)) => return error_body(StatusCode::BAD_REQUEST, msg),
    };

    let new_entry = match NewEntry::new(req.text.as_deref().unwrap_or(""), Some(timestamp)) {
        Ok(e) => e,
        Err(e) => return error_body(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let insights = &state.config.insights;
    let entries = state.store.snapshot().await;
    let context = JournalContext::from_entries(&entries, insights.prompt_window, insights.prompt_top_k);

    let outcome = state.companion.reflect(&new_entry.text, &context).await;
    if let Some(reason) = outcome.fallback_reason() {
        tracing::debug!(reason = %reason, "entry analysed by keyword fallback");
    }

    let entry = state.store.append(new_entry, &outcome).await;
    match serde_json::to_value(&entry) {
        Ok(body) => (StatusCode::CREATED, body),
        Err(e) => error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

pub async fn list_entries_inner(store: &EntryStore, limit: Option<usize>) -> (StatusCode, serde_json::Value) {
    let entries = store.recent(limit.unwrap_or(DEFAULT_ENTRY_LIMIT)).await;
    (
        StatusCode::OK,
        serde_json::json!({
            "entries": entries,
            "count": entries.len(),
            "total": store.len().await,
        }),
    )
}

pub async fn get_entry_inner(store: &EntryStore, id: u64) -> (StatusCode, serde_json::Value) {
    match store.get(id).await {
        Some(entry) => (StatusCode::OK, serde_json::json!(entry)),
        None => error_body(
            StatusCode::NOT_FOUND,
            solace_core::SolaceError::NotFound(id).to_string(),
        ),
    }
}

pub async fn metrics_inner<Tz: TimeZone>(
    store: &EntryStore,
    now: &DateTime<Tz>,
) -> (StatusCode, serde_json::Value) {
    let entries = store.snapshot().await;
    (StatusCode::OK, serde_json::json!(derive_metrics(&entries, now)))
}

/// Dashboard: whole-journal aggregates plus derived metrics.
pub async fn insights_inner<Tz: TimeZone>(
    store: &EntryStore,
    insights: &InsightsConfig,
    now: &DateTime<Tz>,
) -> (StatusCode, serde_json::Value) {
    let entries = store.snapshot().await;
    (
        StatusCode::OK,
        serde_json::json!({
            "total_entries": entries.len(),
            "average_sentiment": average_sentiment(&entries, insights.prompt_window),
            "top_themes": top_themes(&entries, insights.dashboard_top_k),
            "top_emotions": top_emotions(&entries, insights.dashboard_top_k),
            "sentiment_distribution": sentiment_distribution(&entries),
            "metrics": derive_metrics(&entries, now),
        }),
    )
}

pub async fn prompts_inner(
    store: &EntryStore,
    insights: &InsightsConfig,
    limit: Option<usize>,
) -> (StatusCode, serde_json::Value) {
    let entries = store.snapshot().await;
    let context = JournalContext::from_entries(&entries, insights.prompt_window, insights.prompt_top_k);
    let prompts = suggest_prompts(&context, limit.unwrap_or(DEFAULT_PROMPT_LIMIT));
    (
        StatusCode::OK,
        serde_json::json!({
            "prompts": prompts,
            "context": context,
        }),
    )
}

// ============================================================================
// Axum handler wrappers (thin: delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state.store, &state.companion).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn create_entry_handler(
    State(state): State<Arc<HttpState>>,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(req)) => create_entry_inner(&state, req, Utc::now()).await,
        Err(rej) => rejection_body(&rej),
    };
    (status, Json(body))
}

pub async fn list_entries_handler(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    let (status, body) = list_entries_inner(&state.store, query.limit).await;
    (status, Json(body))
}

pub async fn get_entry_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let (status, body) = get_entry_inner(&state.store, id).await;
    (status, Json(body))
}

pub async fn metrics_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = metrics_inner(&state.store, &Local::now()).await;
    (status, Json(body))
}

pub async fn insights_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = insights_inner(&state.store, &state.config.insights, &Local::now()).await;
    (status, Json(body))
}

pub async fn prompts_handler(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    let (status, body) = prompts_inner(&state.store, &state.config.insights, query.limit).await;
    (status, Json(body))
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse a caller-supplied RFC 3339 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

// ============================================================================
// Unit Tests: call inner functions directly
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn keyword_state() -> HttpState {
        HttpState {
            store: EntryStore::new(0),
            companion: Arc::new(Companion::keyword_only()),
            config: SolaceConfig::default(),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn request(text: &str, timestamp: Option<&str>) -> CreateEntryRequest {
        CreateEntryRequest {
            text: Some(text.to_string()),
            timestamp: timestamp.map(str::to_string),
        }
    }

    // ========================================================================
    // TEST 1: version_inner is pure and returns correct fields
    // ========================================================================
    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string(), "version must be string");
        assert_eq!(v["protocol"], "solace/1", "protocol must be solace/1");
    }

    // ========================================================================
    // TEST 2: parse_timestamp accepts offsets and rejects garbage
    // ========================================================================
    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2026-03-15T14:00:00+02:00").unwrap();
        assert_eq!(ts, fixed_now());
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }

    // ========================================================================
    // TEST 3: health_inner reports entry count and backend
    // ========================================================================
    #[tokio::test]
    async fn test_health_inner_ok() {
        let state = keyword_state();
        let (status, body) = health_inner(&state.store, &state.companion).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["entries"], 0);
        assert_eq!(body["analysis_backend"], "keyword");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    // ========================================================================
    // TEST 4: create_entry_inner stores an analysed entry
    // ========================================================================
    #[tokio::test]
    async fn test_create_entry_inner_created() {
        let state = keyword_state();
        let (status, body) = create_entry_inner(
            &state,
            request("Grateful for a long walk in the park today", None),
            fixed_now(),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED, "body: {:?}", body);
        assert_eq!(body["id"], 1);
        assert_eq!(body["word_count"], 9);
        assert_eq!(body["analysis_source"], "fallback");
        assert_eq!(body["timestamp"], "2026-03-15T12:00:00Z");
        assert!(body["ai_response"].is_string());
        assert_eq!(state.store.len().await, 1);
    }

    // ========================================================================
    // TEST 5: create_entry_inner rejects blank text
    // ========================================================================
    #[tokio::test]
    async fn test_create_entry_inner_blank_text() {
        let state = keyword_state();
        for req in [request("   ", None), CreateEntryRequest::default()] {
            let (status, body) = create_entry_inner(&state, req, fixed_now()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["status"], "error");
            assert!(body["error"].is_string());
        }
        assert!(state.store.is_empty().await);
    }

    // ========================================================================
    // TEST 6: create_entry_inner rejects an unparseable timestamp
    // ========================================================================
    #[tokio::test]
    async fn test_create_entry_inner_bad_timestamp() {
        let state = keyword_state();
        let (status, body) =
            create_entry_inner(&state, request("hello", Some("last tuesday")), fixed_now()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid timestamp"));
        assert!(state.store.is_empty().await);
    }

    // ========================================================================
    // TEST 7: get_entry_inner returns 404 for unknown ids
    // ========================================================================
    #[tokio::test]
    async fn test_get_entry_inner_not_found() {
        let state = keyword_state();
        let (status, body) = get_entry_inner(&state.store, 42).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Entry not found: 42");
    }

    // ========================================================================
    // TEST 8: list_entries_inner is newest first and honours limit
    // ========================================================================
    #[tokio::test]
    async fn test_list_entries_inner_order_and_limit() {
        let state = keyword_state();
        let now = fixed_now();
        let backfill = (now - Duration::days(2)).to_rfc3339();
        create_entry_inner(&state, request("today's entry", None), now).await;
        create_entry_inner(&state, request("backfilled entry", Some(&backfill)), now).await;

        let (status, body) = list_entries_inner(&state.store, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["entries"][0]["id"], 1);
        assert_eq!(body["entries"][1]["id"], 2);

        let (_, body) = list_entries_inner(&state.store, Some(1)).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["total"], 2);
    }

    // ========================================================================
    // TEST 9: metrics_inner on an empty journal returns empty states
    // ========================================================================
    #[tokio::test]
    async fn test_metrics_inner_empty() {
        let state = keyword_state();
        let (status, body) = metrics_inner(&state.store, &fixed_now()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["writing_streak"], 0);
        assert_eq!(body["mood_trend"]["direction"], "stable");
        assert!(body["mood_trend"]["slope"].is_null());
        assert_eq!(body["current_mood"]["sentiment"], "neutral");
        assert_eq!(body["growth_score"]["score"], 0);
        assert_eq!(body["growth_score"]["band"], "no_data");
    }

    // ========================================================================
    // TEST 10: metrics_inner counts a streak across consecutive days
    // ========================================================================
    #[tokio::test]
    async fn test_metrics_inner_streak() {
        let state = keyword_state();
        let now = fixed_now();
        for days_ago in 0..3 {
            let ts = (now - Duration::days(days_ago)).to_rfc3339();
            create_entry_inner(&state, request("wrote a little", Some(&ts)), now).await;
        }
        let (_, body) = metrics_inner(&state.store, &now).await;
        assert_eq!(body["writing_streak"], 3);
        assert_eq!(body["mood_trend"]["sample_size"], 3);
    }

    // ========================================================================
    // TEST 11: insights_inner aggregates themes and distribution
    // ========================================================================
    #[tokio::test]
    async fn test_insights_inner_aggregates() {
        let state = keyword_state();
        let now = fixed_now();
        create_entry_inner(&state, request("Long meeting at the office, my boss was happy", None), now).await;
        create_entry_inner(&state, request("Another project deadline at work", None), now).await;

        let (status, body) = insights_inner(&state.store, &state.config.insights, &now).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_entries"], 2);
        assert_eq!(body["top_themes"][0]["label"], "work");
        assert_eq!(body["sentiment_distribution"].as_array().unwrap().len(), 5);
        assert!(body["metrics"]["growth_score"]["score"].is_number());
    }

    // ========================================================================
    // TEST 12: prompts_inner returns starters for an empty journal
    // ========================================================================
    #[tokio::test]
    async fn test_prompts_inner_empty_and_limit() {
        let state = keyword_state();
        let (status, body) = prompts_inner(&state.store, &state.config.insights, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prompts"].as_array().unwrap().len(), DEFAULT_PROMPT_LIMIT);
        assert_eq!(body["context"]["entry_count"], 0);

        let (_, body) = prompts_inner(&state.store, &state.config.insights, Some(1)).await;
        assert_eq!(body["prompts"].as_array().unwrap().len(), 1);
    }
}
