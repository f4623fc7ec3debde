use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolaceError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Entry not found: {0}")]
    NotFound(u64),
}
