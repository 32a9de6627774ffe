//! Analysis pipeline: Analyze → Extract → Summarize → Review, with a
//! bounded re-summarize loop behind the review gate.
//!
//! The control flow is an explicit state machine. [`next_step`] is a pure
//! function of the current [`AnalysisState`]; [`AnalysisPipeline::run`]
//! executes the step it returns and records the result back into the
//! state, until a terminal step is reached.
//!
//! ```text
//! Start → Analyzed → Extracted → Summarized → Reviewed
//!   Reviewed ── pass ─────────────────────────→ Done(complete)
//!   Reviewed ── fail, retries < max ──────────→ Summarized
//!   Reviewed ── fail, retries exhausted ──────→ Done(degraded)
//! ```
//!
//! An empty policy aborts from `Start` before any model call.

use std::time::Instant;

use hackerone_api::{ProgramRecord, ProgramSource};
use report_generator::{GenerationContext, ReportGenerator};
use serde::{Deserialize, Serialize};
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::domain::{AnalysisError, AnalysisOutcome, Result, RunStatus};
use crate::metrics::METRICS;
use crate::obs;
use crate::prompts::{analyze_prompt, extract_prompt, summarize_prompt};
use crate::review::{review_report, strip_wrapping_fence, ReviewResult};

/// Pipeline tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Re-summarize attempts after the first failed review.
    pub max_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

impl PipelineConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Upper bound on model invocations for one run:
    /// Analyze 1 + Extract 1 + Summarize (max_retries + 1).
    pub fn max_generator_calls(&self) -> u32 {
        2 + self.max_retries + 1
    }
}

/// Where the run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Start,
    Analyzed,
    Extracted,
    Summarized,
    Reviewed,
    Done(RunStatus),
}

/// What the driver should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Analyze,
    Extract,
    Summarize,
    Review,
    Finish(RunStatus),
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Analyze => "analyze",
            Step::Extract => "extract",
            Step::Summarize => "summarize",
            Step::Review => "review",
            Step::Finish(_) => "finish",
        }
    }
}

/// Mutable accumulator threaded through the stages of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisState {
    pub program: ProgramRecord,
    pub phase: Phase,
    pub analysis: Option<String>,
    pub extraction: Option<String>,
    /// Set by every Summarize; always present once the phase reaches `Summarized`.
    pub report_text: Option<String>,
    pub review: Option<ReviewResult>,
    pub retries: u32,
    pub generator_calls: u32,
}

impl AnalysisState {
    pub fn new(program: ProgramRecord) -> Self {
        Self {
            program,
            phase: Phase::Start,
            analysis: None,
            extraction: None,
            report_text: None,
            review: None,
            retries: 0,
            generator_calls: 0,
        }
    }

    /// 1-based Summarize attempt number.
    pub fn attempt(&self) -> u32 {
        self.retries + 1
    }

    fn record_analysis(&mut self, text: String) {
        self.analysis = Some(text);
        self.phase = Phase::Analyzed;
    }

    fn record_extraction(&mut self, text: String) {
        self.extraction = Some(text);
        self.phase = Phase::Extracted;
    }

    fn record_summary(&mut self, text: String) {
        if self.phase == Phase::Reviewed {
            self.retries += 1;
        }
        self.report_text = Some(text);
        self.phase = Phase::Summarized;
    }

    fn record_review(&mut self, review: ReviewResult) {
        self.review = Some(review);
        self.phase = Phase::Reviewed;
    }

    /// Feedback from the last rejected review, if any.
    fn pending_feedback(&self) -> Option<String> {
        self.review.as_ref().and_then(ReviewResult::feedback)
    }

    fn into_outcome(self, status: RunStatus) -> AnalysisOutcome {
        debug_assert!(self.report_text.is_some());
        let deficiencies = match status {
            RunStatus::Complete => Vec::new(),
            RunStatus::Degraded => self
                .review
                .as_ref()
                .map(ReviewResult::deficiencies)
                .unwrap_or_default(),
        };
        AnalysisOutcome {
            handle: self.program.handle,
            status,
            report_text: self.report_text.unwrap_or_default(),
            deficiencies,
            retries: self.retries,
            generator_calls: self.generator_calls,
        }
    }
}

/// Decide the next step. Pure: depends only on the state and config.
pub fn next_step(state: &AnalysisState, config: &PipelineConfig) -> Step {
    match state.phase {
        Phase::Start => Step::Analyze,
        Phase::Analyzed => Step::Extract,
        Phase::Extracted => Step::Summarize,
        Phase::Summarized => Step::Review,
        Phase::Reviewed => match &state.review {
            Some(review) if review.is_acceptable => Step::Finish(RunStatus::Complete),
            _ if state.retries < config.max_retries => Step::Summarize,
            _ => Step::Finish(RunStatus::Degraded),
        },
        Phase::Done(status) => Step::Finish(status),
    }
}

/// Drives one program through the stages using a report generator.
pub struct AnalysisPipeline<'a> {
    generator: &'a dyn ReportGenerator,
    config: PipelineConfig,
}

impl<'a> AnalysisPipeline<'a> {
    pub fn new(generator: &'a dyn ReportGenerator, config: PipelineConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline for `program`.
    pub async fn run(&self, program: ProgramRecord) -> Result<AnalysisOutcome> {
        let run_id = Uuid::new_v4().to_string();
        let span = obs::run_span(&run_id, &program.handle);
        self.run_with_id(&run_id, program).instrument(span).await
    }

    async fn run_with_id(&self, run_id: &str, program: ProgramRecord) -> Result<AnalysisOutcome> {
        let started = Instant::now();
        obs::emit_run_started(run_id, &program.handle);
        METRICS.inc_runs_started();

        let mut state = AnalysisState::new(program);
        loop {
            let step = next_step(&state, &self.config);
            let result = match step {
                Step::Finish(status) => {
                    state.phase = Phase::Done(status);
                    match status {
                        RunStatus::Complete => METRICS.inc_runs_complete(),
                        RunStatus::Degraded => METRICS.inc_runs_degraded(),
                    }
                    obs::emit_run_finished(
                        run_id,
                        &status.to_string(),
                        started.elapsed().as_millis() as u64,
                        state.generator_calls,
                    );
                    return Ok(state.into_outcome(status));
                }
                step => {
                    obs::emit_stage_entered(run_id, step.name(), state.attempt());
                    self.execute(run_id, step, &mut state).await
                }
            };

            if let Err(err) = result {
                METRICS.inc_runs_failed();
                obs::emit_run_failed(run_id, &err);
                return Err(err);
            }
        }
    }

    async fn execute(&self, run_id: &str, step: Step, state: &mut AnalysisState) -> Result<()> {
        match step {
            Step::Analyze => {
                if !state.program.has_policy() {
                    return Err(AnalysisError::EmptyPolicy {
                        handle: state.program.handle.clone(),
                    });
                }
                let prompt = analyze_prompt(&state.program);
                let text = self.call(state, step, &prompt, None).await?;
                state.record_analysis(text);
            }
            Step::Extract => {
                let analysis = state.analysis.clone().unwrap_or_default();
                let prompt = extract_prompt(&state.program, &analysis);
                let text = self.call(state, step, &prompt, None).await?;
                state.record_extraction(text);
            }
            Step::Summarize => {
                let feedback = state.pending_feedback();
                let prompt = summarize_prompt(
                    &state.program,
                    state.analysis.as_deref().unwrap_or_default(),
                    state.extraction.as_deref().unwrap_or_default(),
                    feedback.as_deref(),
                );
                let text = self.call(state, step, &prompt, feedback).await?;
                state.record_summary(strip_wrapping_fence(&text));
            }
            Step::Review => {
                let review = review_report(
                    state.report_text.as_deref().unwrap_or_default(),
                    state.program.has_structured_scope(),
                );
                obs::emit_review_evaluated(
                    run_id,
                    state.attempt(),
                    review.is_acceptable,
                    review.missing_sections.len(),
                    review.table_required_but_missing,
                );
                if !review.is_acceptable {
                    METRICS.inc_review_rejections();
                }
                state.record_review(review);
            }
            Step::Finish(_) => {}
        }
        Ok(())
    }

    async fn call(
        &self,
        state: &mut AnalysisState,
        step: Step,
        prompt: &str,
        feedback: Option<String>,
    ) -> Result<String> {
        let mut context = GenerationContext::new()
            .with("stage", step.name())
            .with("program", state.program.handle.as_str())
            .with("attempt", state.attempt().to_string());
        if let Some(feedback) = feedback {
            context.insert("review_feedback", feedback);
        }

        state.generator_calls += 1;
        METRICS.inc_generator_calls();
        debug!(
            generator = %self.generator.name(),
            stage = step.name(),
            prompt_chars = prompt.len(),
            "Invoking report generator"
        );
        Ok(self.generator.generate(prompt, &context).await?)
    }
}

/// Analyze one program record.
pub async fn run_analysis(
    generator: &dyn ReportGenerator,
    program: ProgramRecord,
    config: PipelineConfig,
) -> Result<AnalysisOutcome> {
    AnalysisPipeline::new(generator, config).run(program).await
}

/// Fetch `handle` from `source`, then analyze it.
pub async fn analyze_handle(
    source: &dyn ProgramSource,
    generator: &dyn ReportGenerator,
    handle: &str,
    config: PipelineConfig,
) -> Result<AnalysisOutcome> {
    let program = source.fetch_program(handle).await?;
    run_analysis(generator, program, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reviewed(acceptable: bool, retries: u32) -> AnalysisState {
        let mut state = AnalysisState::new(ProgramRecord::new("acme", "Acme", "p"));
        state.phase = Phase::Reviewed;
        state.retries = retries;
        state.report_text = Some("draft".to_string());
        state.review = Some(ReviewResult {
            is_acceptable: acceptable,
            missing_sections: if acceptable {
                vec![]
            } else {
                vec!["Overview".to_string()]
            },
            table_required_but_missing: false,
        });
        state
    }

    #[test]
    fn test_linear_transitions() {
        let config = PipelineConfig::default();
        let mut state = AnalysisState::new(ProgramRecord::new("acme", "Acme", "p"));
        assert_eq!(next_step(&state, &config), Step::Analyze);
        state.phase = Phase::Analyzed;
        assert_eq!(next_step(&state, &config), Step::Extract);
        state.phase = Phase::Extracted;
        assert_eq!(next_step(&state, &config), Step::Summarize);
        state.phase = Phase::Summarized;
        assert_eq!(next_step(&state, &config), Step::Review);
    }

    #[test]
    fn test_review_pass_finishes_complete() {
        let config = PipelineConfig::default();
        assert_eq!(
            next_step(&reviewed(true, 0), &config),
            Step::Finish(RunStatus::Complete)
        );
        assert_eq!(
            next_step(&reviewed(true, 2), &config),
            Step::Finish(RunStatus::Complete)
        );
    }

    #[test]
    fn test_review_fail_retries_until_bound() {
        let config = PipelineConfig::default().with_max_retries(2);
        assert_eq!(next_step(&reviewed(false, 0), &config), Step::Summarize);
        assert_eq!(next_step(&reviewed(false, 1), &config), Step::Summarize);
        assert_eq!(
            next_step(&reviewed(false, 2), &config),
            Step::Finish(RunStatus::Degraded)
        );
    }

    #[test]
    fn test_zero_retries_degrades_immediately() {
        let config = PipelineConfig::default().with_max_retries(0);
        assert_eq!(
            next_step(&reviewed(false, 0), &config),
            Step::Finish(RunStatus::Degraded)
        );
    }

    #[test]
    fn test_done_is_terminal() {
        let mut state = reviewed(true, 0);
        state.phase = Phase::Done(RunStatus::Degraded);
        assert_eq!(
            next_step(&state, &PipelineConfig::default()),
            Step::Finish(RunStatus::Degraded)
        );
    }

    #[test]
    fn test_resummarize_increments_retries() {
        let mut state = reviewed(false, 0);
        state.record_summary("second draft".to_string());
        assert_eq!(state.retries, 1);
        assert_eq!(state.phase, Phase::Summarized);

        // First summary after extraction is not a retry.
        let mut fresh = AnalysisState::new(ProgramRecord::new("acme", "Acme", "p"));
        fresh.phase = Phase::Extracted;
        fresh.record_summary("first draft".to_string());
        assert_eq!(fresh.retries, 0);
    }

    #[test]
    fn test_degraded_outcome_carries_deficiencies() {
        let outcome = reviewed(false, 2).into_outcome(RunStatus::Degraded);
        assert_eq!(outcome.status, RunStatus::Degraded);
        assert_eq!(outcome.deficiencies, vec!["missing section: Overview"]);
        assert_eq!(outcome.report_text, "draft");
    }

    #[test]
    fn test_max_generator_calls() {
        assert_eq!(PipelineConfig::default().max_generator_calls(), 5);
        assert_eq!(
            PipelineConfig::default()
                .with_max_retries(0)
                .max_generator_calls(),
            3
        );
    }
}
