//! What a finished run hands to the presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal status of a run that produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The report passed review.
    Complete,
    /// Retries ran out; the report is returned with its known deficiencies.
    Degraded,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Complete => write!(f, "complete"),
            RunStatus::Degraded => write!(f, "degraded"),
        }
    }
}

/// Result of `run_analysis`.
///
/// # Invariants
///
/// `deficiencies` is empty iff `status == Complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub handle: String,
    pub status: RunStatus,
    pub report_text: String,
    pub deficiencies: Vec<String>,
    /// Re-runs of Summarize after a failed review.
    pub retries: u32,
    /// Total model invocations made during the run.
    pub generator_calls: u32,
}

impl AnalysisOutcome {
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }
}
