//! Unified error types for triage

use thiserror::Error;

/// Unified error type for all triage operations
///
/// Fatal variants (`InvalidParameters`, `SourceUnavailable`) abort the
/// session pipeline and are surfaced verbatim to the caller. Per-issue
/// variants (`Analysis`, `WriteBack`) are recorded in the session and
/// never abort it.
#[derive(Error, Debug)]
pub enum TriageError {
    // Pre-flight errors
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    // Retrieval errors
    #[error("Backlog source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Tracker request failed: {0}")]
    Tracker(String),

    // Per-issue errors
    #[error("Issue analysis failed: {0}")]
    Analysis(String),

    #[error("Write-back failed for issue #{issue}: {reason}")]
    WriteBack { issue: u64, reason: String },

    // Persistence errors
    #[error("Document store error: {0}")]
    Store(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl TriageError {
    /// Whether this error aborts the session pipeline
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameters(_) | Self::SourceUnavailable(_)
        )
    }
}

/// Result type alias using TriageError
pub type Result<T> = std::result::Result<T, TriageError>;
