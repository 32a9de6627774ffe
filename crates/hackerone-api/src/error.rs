//! Error types for hackerone-api

use thiserror::Error;

/// Errors that can occur while talking to the program registry
#[derive(Error, Debug)]
pub enum DataSourceError {
    /// Program handle does not exist or is not visible to these credentials
    #[error("Program not found or not accessible: {0}")]
    NotFound(String),

    /// No credentials in the environment or the `.hackerone` file
    #[error("HackerOne API credentials not found. Set HACKERONE_API_USERNAME/HACKERONE_API_TOKEN or create a .hackerone file with 'username:api_token'")]
    MissingCredentials,

    /// Credentials were present but unusable
    #[error("Invalid HackerOne credentials: {0}")]
    InvalidCredentials(String),

    /// Search query rejected before sending
    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// API answered with a non-success status
    #[error("HackerOne API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response parsed as JSON but did not have the expected shape
    #[error("Malformed API document: {0}")]
    MalformedDocument(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for DataSourceError {
    fn from(err: reqwest::Error) -> Self {
        DataSourceError::Http(err.to_string())
    }
}
