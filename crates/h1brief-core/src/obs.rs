//! Structured observability hooks for analysis runs.
//!
//! This module provides:
//! - A run-scoped tracing span via [`run_span`]
//! - Emission functions for lifecycle events: start, stage entry, review, finish, failure
//!
//! Events are emitted at `info!` level (filter with `RUST_LOG`).
//! For JSON output, pass `--json` to the CLI.

use tracing::{info, warn};

/// Span tagged with the run id and program handle. Attach it to the run
/// future with `tracing::Instrument::instrument`.
pub fn run_span(run_id: &str, handle: &str) -> tracing::Span {
    tracing::info_span!("h1brief.run", run_id = %run_id, handle = %handle)
}

/// Emit event: run started for a program.
///
/// # Example
///
/// ```ignore
/// emit_run_started("run-123", "acme");
/// // logs: event=run.started run_id=run-123 handle=acme
/// ```
pub fn emit_run_started(run_id: &str, handle: &str) {
    info!(event = "run.started", run_id = %run_id, handle = %handle);
}

/// Emit event: the pipeline is about to execute a stage.
pub fn emit_stage_entered(run_id: &str, stage: &str, attempt: u32) {
    info!(event = "pipeline.stage", run_id = %run_id, stage = %stage, attempt = attempt);
}

/// Emit event: review gate verdict for one attempt.
pub fn emit_review_evaluated(run_id: &str, attempt: u32, passed: bool, missing_sections: usize, table_missing: bool) {
    info!(
        event = "review.evaluated",
        run_id = %run_id,
        attempt = attempt,
        passed = passed,
        missing_sections = missing_sections,
        table_missing = table_missing,
    );
}

/// Emit event: run finished with a report.
pub fn emit_run_finished(run_id: &str, status: &str, duration_ms: u64, generator_calls: u32) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        status = %status,
        duration_ms = duration_ms,
        generator_calls = generator_calls,
    );
}

/// Emit event: run aborted without a report (warning level).
pub fn emit_run_failed(run_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "run.failed", run_id = %run_id, error = %error);
}
