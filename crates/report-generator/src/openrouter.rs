//! OpenRouter backend
//!
//! OpenRouter speaks the OpenAI chat-completions protocol, so this is a
//! plain `POST /chat/completions` with a bearer token.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::GenerationError;
use crate::generator::{ensure_non_empty, GenerationContext, ReportGenerator};
use crate::Result;

/// Key file looked up in the working directory.
pub const API_KEY_FILE: &str = ".openrouter_api_key";

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
const SYSTEM_PROMPT: &str =
    "You are an assistant for bug bounty researchers. Be precise, complete and never invent program details.";

/// OpenRouter configuration
#[derive(Clone)]
pub struct OpenRouterConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    /// Sent as `HTTP-Referer` and `X-OpenRouter-Title`
    pub app_title: String,
    pub timeout: Duration,
    pub temperature: f32,
}

impl std::fmt::Debug for OpenRouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("app_title", &self.app_title)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

impl OpenRouterConfig {
    pub fn new(api_key: &str) -> Self {
        OpenRouterConfig {
            base_url: normalize_base_url(
                &std::env::var("OPENROUTER_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            ),
            model: std::env::var("OPENROUTER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_key: api_key.to_string(),
            app_title: "h1brief".to_string(),
            timeout: Duration::from_secs(120),
            temperature: 0.2,
        }
    }

    /// `OPENROUTER_API_KEY`, then `.openrouter_api_key` in `dir`.
    pub fn discover(dir: &Path) -> Result<Self> {
        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            if !key.trim().is_empty() {
                return Ok(Self::new(key.trim()));
            }
        }

        let file = dir.join(API_KEY_FILE);
        if file.is_file() {
            let key = std::fs::read_to_string(&file)?;
            if !key.trim().is_empty() {
                debug!("Loaded OpenRouter API key from {:?}", file);
                return Ok(Self::new(key.trim()));
            }
        }

        Err(GenerationError::MissingApiKey)
    }

    pub fn from_env() -> Result<Self> {
        Self::discover(&std::env::current_dir()?)
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Chat-completions client for OpenRouter
pub struct OpenRouterGenerator {
    config: OpenRouterConfig,
    client: reqwest::Client,
}

impl OpenRouterGenerator {
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenRouterConfig::from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

/// Prompt followed by the rendered context block.
pub fn compose_user_message(prompt: &str, context: &GenerationContext) -> String {
    let rendered = context.render();
    if rendered.is_empty() {
        prompt.to_string()
    } else {
        format!("{}\n\n{}", prompt.trim_end(), rendered)
    }
}

/// First choice's message content.
pub fn extract_content(body: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct Message {
        content: Option<String>,
    }
    #[derive(Deserialize)]
    struct Choice {
        message: Message,
    }
    #[derive(Deserialize)]
    struct ApiResponse {
        choices: Vec<Choice>,
    }

    let parsed: ApiResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(GenerationError::EmptyResponse)?;
    ensure_non_empty(content)
}

#[async_trait]
impl ReportGenerator for OpenRouterGenerator {
    fn name(&self) -> String {
        format!("openrouter:{}", self.config.model)
    }

    async fn generate(&self, prompt: &str, context: &GenerationContext) -> Result<String> {
        let body = serde_json::json!({
            "model": &self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": compose_user_message(prompt, context)}
            ],
            "temperature": self.config.temperature
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.app_title)
            .header("X-OpenRouter-Title", &self.config.app_title)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(
            model = %self.config.model,
            "OpenRouter raw response: {}",
            text.chars().take(500).collect::<String>()
        );
        extract_content(&text)
    }
}
