//! Domain types for h1brief runs.
//!
//! - `AnalysisError`: hard failures that end a run without a report
//! - `AnalysisOutcome`: the report plus its completeness status

pub mod error;
pub mod outcome;

pub use error::{AnalysisError, Result};
pub use outcome::{AnalysisOutcome, RunStatus};
