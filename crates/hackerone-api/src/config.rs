//! Client configuration and credential discovery

use crate::error::DataSourceError;
use crate::Result;
use std::path::Path;
use std::time::Duration;

/// Name of the credentials file looked up in the working directory.
pub const CREDENTIALS_FILE: &str = ".hackerone";

/// Username used when the credentials file holds a bare token.
pub const DEFAULT_USERNAME: &str = "api";

const DEFAULT_BASE_URL: &str = "https://api.hackerone.com/v1";

/// HackerOne API identifier and token (HTTP basic auth).
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

// Keep the token out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: &str, token: &str) -> Self {
        Credentials {
            username: username.to_string(),
            token: token.to_string(),
        }
    }

    /// Parse `username:token` or a bare `token`.
    pub fn parse(content: &str) -> Result<Self> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DataSourceError::InvalidCredentials(
                "credentials are empty".to_string(),
            ));
        }

        let (username, token) = match content.split_once(':') {
            Some((user, token)) => (user.trim(), token.trim()),
            None => (DEFAULT_USERNAME, content),
        };

        if username.is_empty() || token.is_empty() {
            return Err(DataSourceError::InvalidCredentials(
                "expected 'username:api_token'".to_string(),
            ));
        }

        Ok(Credentials::new(username, token))
    }

    /// Read credentials from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Environment first, then `.hackerone` in `dir`.
    pub fn discover(dir: &Path) -> Result<Self> {
        if let (Ok(user), Ok(token)) = (
            std::env::var("HACKERONE_API_USERNAME"),
            std::env::var("HACKERONE_API_TOKEN"),
        ) {
            return Ok(Credentials::new(&user, &token));
        }

        let file = dir.join(CREDENTIALS_FILE);
        if file.is_file() {
            tracing::debug!("Loading HackerOne credentials from {:?}", file);
            return Self::from_file(&file);
        }

        Err(DataSourceError::MissingCredentials)
    }
}

/// HackerOne client configuration
#[derive(Debug, Clone)]
pub struct HackerOneConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// `page[size]` used when listing programs
    pub page_size: u32,
    /// Upper bound on pages followed through `links.next`
    pub max_pages: u32,
    pub credentials: Credentials,
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

impl HackerOneConfig {
    pub fn new(credentials: Credentials) -> Self {
        HackerOneConfig {
            base_url: normalize_base_url(
                &std::env::var("HACKERONE_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            ),
            timeout: Duration::from_secs(10),
            page_size: 100,
            max_pages: 10,
            credentials,
        }
    }

    /// Discover credentials from the environment or the working directory.
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::new(Credentials::discover(&cwd)?))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }
}
