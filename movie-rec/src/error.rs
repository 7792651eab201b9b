use thiserror::Error;

/// Errors produced by the recommendation pipeline
#[derive(Error, Debug)]
pub enum RecError {
    /// Every configured completion provider failed (or none were configured).
    /// Carries the last provider's error message so callers can surface it
    /// alongside fallback output.
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// A single provider failed to produce text (network, non-success
    /// status, malformed response body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A context or record store operation failed
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, RecError>;
