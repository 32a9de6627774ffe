//! Error taxonomy for analysis runs.
//!
//! A failed review is not an error: it is retried inside the pipeline and,
//! once retries run out, reported as a degraded outcome.

use hackerone_api::DataSourceError;
use report_generator::GenerationError;

/// Hard failures. Any of these ends the run with no report.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("program '{handle}' has an empty policy; nothing to analyze")]
    EmptyPolicy { handle: String },

    #[error("data source error: {0}")]
    DataSource(#[from] DataSourceError),

    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
