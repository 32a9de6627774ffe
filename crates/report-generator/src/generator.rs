//! The report generation capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::GenerationError;
use crate::Result;

/// Ordered key/value hints passed alongside a prompt.
///
/// The pipeline records the stage, program handle, attempt number and
/// review feedback here. Backends decide whether to forward them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext(BTreeMap<String, String>);

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a trailing `Context:` block, or an empty string.
    pub fn render(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let mut out = String::from("Context:\n");
        for (k, v) in &self.0 {
            out.push_str(&format!("- {}: {}\n", k, v));
        }
        out
    }
}

/// Something that turns a prompt into text.
///
/// Implementations must not judge the content; any non-empty string is a
/// valid answer. Structural checks belong to the review gate.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Short backend name for logs, e.g. `openrouter:openai/gpt-4o-mini`.
    fn name(&self) -> String;

    async fn generate(&self, prompt: &str, context: &GenerationContext) -> Result<String>;
}

/// Reject blank model output.
pub fn ensure_non_empty(text: String) -> Result<String> {
    if text.trim().is_empty() {
        Err(GenerationError::EmptyResponse)
    } else {
        Ok(text)
    }
}
