//! Error types for report-generator

use thiserror::Error;

/// Errors returned by a report generation backend
#[derive(Error, Debug)]
pub enum GenerationError {
    /// No API key in the environment or key file
    #[error("OpenRouter API key not found. Set OPENROUTER_API_KEY or place the key in .openrouter_api_key")]
    MissingApiKey,

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Backend answered with a non-success status
    #[error("Model API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Backend returned nothing usable
    #[error("Model returned an empty response")]
    EmptyResponse,

    /// Response body did not have the expected shape
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// A scripted generator ran out of responses
    #[error("No scripted responses left")]
    Exhausted,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Http(err.to_string())
    }
}
