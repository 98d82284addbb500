use thiserror::Error;

#[derive(Error, Debug)]
pub enum GhostTraceError {
    #[error("Title is required.")]
    MissingTitle,

    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Ambiguous rule id '{0}' matches more than one rule")]
    AmbiguousId(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GhostTraceError>;
