//! Program data model
//!
//! Records are built once from an API document and never mutated
//! afterwards; the analysis pipeline borrows them for a single run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a program as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramState {
    Open,
    Paused,
    Other(String),
}

impl ProgramState {
    /// Map the API's `state` / `submission_state` strings onto a state.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" | "public_mode" | "soft_launched" => ProgramState::Open,
            "paused" | "disabled" => ProgramState::Paused,
            other => ProgramState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramState::Open => write!(f, "open"),
            ProgramState::Paused => write!(f, "paused"),
            ProgramState::Other(s) => write!(f, "{}", s),
        }
    }
}

/// One structured in/out-of-scope asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeEntry {
    pub asset_identifier: String,
    pub asset_type: String,
    pub eligible_for_submission: bool,
    pub instruction: Option<String>,
}

impl ScopeEntry {
    pub fn new(asset_identifier: &str, asset_type: &str, eligible_for_submission: bool) -> Self {
        Self {
            asset_identifier: asset_identifier.to_string(),
            asset_type: asset_type.to_string(),
            eligible_for_submission,
            instruction: None,
        }
    }

    pub fn with_instruction(mut self, instruction: &str) -> Self {
        self.instruction = Some(instruction.to_string());
        self
    }
}

/// A bug-bounty program with its policy and scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub handle: String,
    pub name: String,
    pub policy: String,
    /// Structured scope entries in API order. Empty when the program only
    /// describes scope in its policy text.
    pub scope: Vec<ScopeEntry>,
    pub state: ProgramState,
    pub submission_state: Option<String>,
    pub offers_bounties: bool,
    pub open_scope: bool,
    pub currency: Option<String>,
}

impl ProgramRecord {
    /// Minimal record; the remaining fields take registry defaults.
    pub fn new(handle: &str, name: &str, policy: &str) -> Self {
        Self {
            handle: handle.to_string(),
            name: name.to_string(),
            policy: policy.to_string(),
            scope: Vec::new(),
            state: ProgramState::Open,
            submission_state: None,
            offers_bounties: false,
            open_scope: false,
            currency: None,
        }
    }

    pub fn with_scope(mut self, scope: Vec<ScopeEntry>) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_state(mut self, state: ProgramState) -> Self {
        self.state = state;
        self
    }

    pub fn has_structured_scope(&self) -> bool {
        !self.scope.is_empty()
    }

    pub fn has_policy(&self) -> bool {
        !self.policy.trim().is_empty()
    }

    /// Plain-text program sheet handed to the model.
    pub fn program_sheet(&self) -> String {
        let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
        format!(
            "Program: {}\nHandle: {}\nPolicy: {}\nSubmission State: {}\nState: {}\nOffers Bounties: {}\nOpen Scope: {}\nCurrency: {}\n",
            self.name,
            self.handle,
            self.policy.trim(),
            or_na(&self.submission_state),
            self.state,
            self.offers_bounties,
            self.open_scope,
            or_na(&self.currency),
        )
    }

    pub fn summary(&self) -> ProgramSummary {
        ProgramSummary {
            handle: self.handle.clone(),
            name: self.name.clone(),
        }
    }
}

/// Handle and display name, as returned by listing and search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramSummary {
    pub handle: String,
    pub name: String,
}

impl fmt::Display for ProgramSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.handle)
    }
}
