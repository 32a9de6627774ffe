//! report-generator: Model backends for h1brief
//!
//! The analysis pipeline only knows the [`ReportGenerator`] capability:
//! a prompt plus context goes in, text comes out. The concrete backend
//! (vendor, model name) is chosen at startup.
//!
//! ## Layer 1 - Report Generator
//!
//! Focus: one blocking-from-the-caller's-view model call per `generate`.
//! Timeouts and transport errors are reported, never retried here.

pub mod error;
pub mod fakes;
pub mod generator;
pub mod openrouter;

pub use error::GenerationError;
pub use fakes::{RecordedCall, ScriptedGenerator};
pub use generator::{ensure_non_empty, GenerationContext, ReportGenerator};
pub use openrouter::{compose_user_message, OpenRouterConfig, OpenRouterGenerator, API_KEY_FILE};

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;
