//! Scripted generator (testing only)
//!
//! Replays queued responses in order and records every call, so pipeline
//! tests can assert both what was asked and how many times.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::generator::{ensure_non_empty, GenerationContext, ReportGenerator};
use crate::Result;

/// One recorded `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub context: GenerationContext,
}

enum Scripted {
    Text(String),
    Fail(String),
}

/// Generator that answers from a queue.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
    fallback: Option<String>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text response.
    pub fn respond(self, text: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Text(text.to_string()));
        self
    }

    /// Queue a failure (surfaces as `GenerationError::Http`).
    pub fn fail(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(message.to_string()));
        self
    }

    /// Answer with `text` once the queue is drained instead of failing.
    pub fn otherwise(mut self, text: &str) -> Self {
        self.fallback = Some(text.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ReportGenerator for ScriptedGenerator {
    fn name(&self) -> String {
        "scripted".to_string()
    }

    async fn generate(&self, prompt: &str, context: &GenerationContext) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            context: context.clone(),
        });

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Text(text)) => ensure_non_empty(text),
            Some(Scripted::Fail(message)) => Err(GenerationError::Http(message)),
            None => match &self.fallback {
                Some(text) => ensure_non_empty(text.clone()),
                None => Err(GenerationError::Exhausted),
            },
        }
    }
}
