//! HackerOne hacker API client
//!
//! Three read-only endpoints: program listing, program details (with
//! structured scopes) and hacktivity search.

use crate::config::HackerOneConfig;
use crate::document::{next_link, parse_hacktivity, parse_program_document, parse_program_list};
use crate::error::DataSourceError;
use crate::model::{ProgramRecord, ProgramSummary};
use crate::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Where program records come from.
#[async_trait]
pub trait ProgramSource: Send + Sync {
    /// Fetch one program with its policy and structured scope.
    async fn fetch_program(&self, handle: &str) -> Result<ProgramRecord>;

    /// Programs the current credentials can see.
    async fn list_accessible_programs(&self) -> Result<Vec<ProgramSummary>>;

    /// Unique programs mentioned by hacktivity items matching `query`.
    async fn search_hacktivity(&self, query: &str) -> Result<Vec<ProgramSummary>>;
}

/// Client for `https://api.hackerone.com/v1/hackers/...`
pub struct HackerOneClient {
    config: HackerOneConfig,
    http_client: reqwest::Client,
}

impl HackerOneClient {
    pub fn new(config: HackerOneConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("h1brief/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(HackerOneClient {
            config,
            http_client,
        })
    }

    /// Create client from the environment / `.hackerone` file
    pub fn from_env() -> Result<Self> {
        Self::new(HackerOneConfig::from_env()?)
    }

    pub fn config(&self) -> &HackerOneConfig {
        &self.config
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        debug!(url = %url, "GET");
        let response = self
            .http_client
            .get(url)
            .basic_auth(
                &self.config.credentials.username,
                Some(&self.config.credentials.token),
            )
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataSourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Credentials are only ever sent below the configured base URL.
fn is_under_base(base_url: &str, url: &str) -> bool {
    match url.strip_prefix(base_url) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

#[async_trait]
impl ProgramSource for HackerOneClient {
    async fn fetch_program(&self, handle: &str) -> Result<ProgramRecord> {
        let handle = handle.trim();
        if handle.is_empty() || handle.contains('/') {
            return Err(DataSourceError::NotFound(handle.to_string()));
        }

        info!("Fetching program details for {}", handle);
        let url = format!("{}/hackers/programs/{}", self.config.base_url, handle);
        let doc = match self.get_json(&url, &[]).await {
            Err(DataSourceError::Status { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                return Err(DataSourceError::NotFound(handle.to_string()));
            }
            other => other?,
        };

        let record = parse_program_document(&doc)?;
        debug!(
            handle = %record.handle,
            scope_entries = record.scope.len(),
            policy_chars = record.policy.len(),
            "Fetched program"
        );
        Ok(record)
    }

    async fn list_accessible_programs(&self) -> Result<Vec<ProgramSummary>> {
        let mut programs = Vec::new();
        let mut url = format!("{}/hackers/programs", self.config.base_url);
        let mut query = vec![("page[size]", self.config.page_size.to_string())];

        for page in 1..=self.config.max_pages {
            let doc = self.get_json(&url, &query).await?;
            let batch = parse_program_list(&doc)?;
            debug!(page, count = batch.len(), "Fetched program page");
            programs.extend(batch);

            match next_link(&doc) {
                // `next` already carries its own query string
                Some(next) if is_under_base(&self.config.base_url, &next) => {
                    url = next;
                    query.clear();
                }
                Some(next) => {
                    warn!(next = %next, "Ignoring pagination link outside the API base URL");
                    break;
                }
                None => break,
            }
        }

        info!("Found {} accessible program(s)", programs.len());
        Ok(programs)
    }

    async fn search_hacktivity(&self, query: &str) -> Result<Vec<ProgramSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DataSourceError::InvalidQuery(
                "search term cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/hackers/hacktivity", self.config.base_url);
        let doc = self
            .get_json(&url, &[("queryString", query.to_string())])
            .await?;
        let programs = parse_hacktivity(&doc)?;
        info!("Hacktivity search '{}' matched {} program(s)", query, programs.len());
        Ok(programs)
    }
}
