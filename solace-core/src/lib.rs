pub mod analysis;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod prompts;
pub mod store;

pub use analysis::{
    Analysis, AnalysisBackend, AnalysisError, AnalysisOutcome, Companion, KeywordAnalyzer,
    Reflection, RemoteAnalysisClient, RemoteConfig,
};
pub use config::SolaceConfig;
pub use error::SolaceError;
pub use metrics::{derive_metrics, DerivedMetrics};
pub use prompts::{suggest_prompts, JournalContext, DEFAULT_PROMPT_LIMIT};
pub use store::EntryStore;
