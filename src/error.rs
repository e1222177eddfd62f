use thiserror::Error;

/// Setup-time failures. Runtime world queries never error; they return `None`.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid world size {0}, must be at least 1")]
    InvalidWorldSize(i32),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
