//! h1brief Core Library
//!
//! Turns a HackerOne program record into a reviewed Markdown brief:
//! a short staged pipeline of model calls behind a deterministic review
//! gate with bounded retries.

pub mod domain;
pub mod metrics;
pub mod obs;
pub mod pipeline;
pub mod prompts;
pub mod reporting;
pub mod review;
pub mod sections;
pub mod telemetry;

pub use domain::{AnalysisError, AnalysisOutcome, Result, RunStatus};

pub use hackerone_api::{
    find_programs_by_name, resolve_selection, Credentials, DataSourceError, HackerOneClient,
    HackerOneConfig, MemoryProgramSource, ProgramRecord, ProgramSource, ProgramState,
    ProgramSummary, ScopeEntry, Selection,
};

pub use report_generator::{
    GenerationContext, GenerationError, OpenRouterConfig, OpenRouterGenerator, ReportGenerator,
    ScriptedGenerator,
};

pub use pipeline::{
    analyze_handle, next_step, run_analysis, AnalysisPipeline, AnalysisState, Phase,
    PipelineConfig, Step,
};
pub use prompts::render_scope_table;
pub use reporting::{
    read_review_artifact, render_document, write_report, write_review_artifact, ReviewArtifact,
    DEFAULT_REPORT_PATH,
};
pub use review::{review_report, strip_wrapping_fence, ReviewResult};
pub use sections::ReportSection;

pub use metrics::METRICS;
pub use obs::{
    emit_review_evaluated, emit_run_failed, emit_run_finished, emit_run_started,
    emit_stage_entered, run_span,
};
pub use telemetry::init_tracing;

/// h1brief version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
