//! Observability tests for analysis run tracing.
//!
//! These check that lifecycle events are emitted with the expected
//! fields when a run goes through the pipeline.

use h1brief_core::{
    emit_review_evaluated, emit_run_failed, emit_run_finished, emit_run_started,
    emit_stage_entered, run_analysis, run_span, PipelineConfig, ProgramRecord, ScriptedGenerator,
};
use tracing_test::traced_test;

const GOOD_REPORT: &str = "# HackerOne Program Summary\n## Overview\na\n## Scope & Assets\nb\n## Vulnerability Types Accepted\nc\n## Exclusions & Out of Scope\nd\n## Reward Structure\ne\n## Testing Guidelines\nf\n## Key Takeaways\ng\n";

#[traced_test]
#[test]
fn test_emit_run_started_logs_handle() {
    emit_run_started("run-123", "acme");
    assert!(logs_contain("run.started"));
    assert!(logs_contain("acme"));
}

#[traced_test]
#[test]
fn test_emit_stage_and_review_events() {
    emit_stage_entered("run-456", "summarize", 2);
    emit_review_evaluated("run-456", 2, false, 3, true);
    assert!(logs_contain("pipeline.stage"));
    assert!(logs_contain("review.evaluated"));
    assert!(logs_contain("missing_sections=3"));
}

#[traced_test]
#[test]
fn test_emit_run_finished_and_failed() {
    emit_run_finished("run-789", "degraded", 1200, 5);
    emit_run_failed("run-789", &"generation error: boom");
    assert!(logs_contain("run.finished"));
    assert!(logs_contain("run.failed"));
}

#[traced_test]
#[test]
fn test_run_span_enter() {
    let span = run_span("test-span-run", "acme");
    let _guard = span.enter();
    tracing::info!("inside run span");
    assert!(logs_contain("inside run span"));
}

#[tokio::test]
#[traced_test]
async fn test_pipeline_emits_lifecycle_events() {
    let generator = ScriptedGenerator::new()
        .respond("analysis")
        .respond("facts")
        .respond(GOOD_REPORT);
    let program = ProgramRecord::new("acme", "Acme", "Test systems only.");

    let outcome = run_analysis(&generator, program, PipelineConfig::default())
        .await
        .expect("run");

    assert!(outcome.is_complete());
    assert!(logs_contain("run.started"));
    assert!(logs_contain("stage=analyze"));
    assert!(logs_contain("stage=extract"));
    assert!(logs_contain("stage=summarize"));
    assert!(logs_contain("review.evaluated"));
    assert!(logs_contain("run.finished"));
}

#[tokio::test]
#[traced_test]
async fn test_empty_policy_emits_failure() {
    let generator = ScriptedGenerator::new();
    let program = ProgramRecord::new("x", "X", "");

    let result = run_analysis(&generator, program, PipelineConfig::default()).await;

    assert!(result.is_err());
    assert!(logs_contain("run.failed"));
}
