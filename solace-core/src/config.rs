use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::SolaceError;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SolaceConfig {
    pub service: ServiceConfig,
    pub http: HttpConfig,
    pub analysis: AnalysisConfig,
    pub store: StoreConfig,
    pub insights: InsightsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    /// `remote` (language model with keyword fallback) or `keyword` (fallback only).
    pub backend: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Overall budget for one remote analysis, retries included.
    pub timeout_seconds: u64,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            backend: "remote".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            max_tokens: 600,
            timeout_seconds: 20,
            max_retries: 2,
            retry_delay_ms: 500,
            api_key_env: "SOLACE_API_KEY".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// API key from the configured environment variable, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Oldest entries are dropped past this many. 0 keeps everything.
    pub max_entries: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InsightsConfig {
    pub prompt_window: usize,
    pub prompt_top_k: usize,
    pub dashboard_top_k: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            prompt_window: 5,
            prompt_top_k: 3,
            dashboard_top_k: 5,
        }
    }
}

impl SolaceConfig {
    /// Load from an optional TOML file, then `SOLACE__SECTION__KEY` env overrides.
    pub fn load(path: &str) -> Result<Self, SolaceError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("SOLACE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(s.try_deserialize()?)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, SolaceError> {
        let s = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Ok(s.try_deserialize()?)
    }
}
