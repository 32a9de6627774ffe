//! JSON:API document parsing
//!
//! The hacker API wraps everything in `{ "data": ..., "links": ... }`
//! envelopes. These functions are pure so they can be tested against
//! captured fixtures without a network.

use crate::error::DataSourceError;
use crate::model::{ProgramRecord, ProgramState, ProgramSummary, ScopeEntry};
use crate::Result;
use serde_json::Value;
use std::collections::HashSet;

fn str_attr(attrs: &Value, key: &str) -> Option<String> {
    attrs
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

fn bool_attr(attrs: &Value, key: &str) -> bool {
    attrs.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// `links.next`, if the API says there is another page.
pub fn next_link(doc: &Value) -> Option<String> {
    doc.pointer("/links/next")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

/// Parse a single program document, either enveloped in `data` or bare.
pub fn parse_program_document(doc: &Value) -> Result<ProgramRecord> {
    let program = match doc.get("data") {
        Some(data) if data.is_object() => data,
        _ => doc,
    };

    let attrs = program.get("attributes").ok_or_else(|| {
        DataSourceError::MalformedDocument("program has no attributes".to_string())
    })?;

    let handle = str_attr(attrs, "handle")
        .ok_or_else(|| DataSourceError::MalformedDocument("program has no handle".to_string()))?;
    let name = str_attr(attrs, "name").unwrap_or_else(|| handle.clone());
    let submission_state = str_attr(attrs, "submission_state");

    let state = str_attr(attrs, "state")
        .or_else(|| submission_state.clone())
        .map(|s| ProgramState::parse(&s))
        .unwrap_or(ProgramState::Open);

    let scope = match program.pointer("/relationships/structured_scopes/data") {
        Some(Value::Array(items)) => items.iter().filter_map(parse_scope_entry).collect(),
        _ => Vec::new(),
    };

    Ok(ProgramRecord {
        handle,
        name,
        policy: str_attr(attrs, "policy").unwrap_or_default(),
        scope,
        state,
        submission_state,
        offers_bounties: bool_attr(attrs, "offers_bounties"),
        open_scope: bool_attr(attrs, "open_scope"),
        currency: str_attr(attrs, "currency"),
    })
}

fn parse_scope_entry(item: &Value) -> Option<ScopeEntry> {
    let attrs = item.get("attributes")?;
    let asset_identifier = str_attr(attrs, "asset_identifier")?;
    Some(ScopeEntry {
        asset_identifier,
        asset_type: str_attr(attrs, "asset_type").unwrap_or_else(|| "OTHER".to_string()),
        eligible_for_submission: bool_attr(attrs, "eligible_for_submission"),
        instruction: str_attr(attrs, "instruction"),
    })
}

/// Parse one page of `/hackers/programs`.
pub fn parse_program_list(doc: &Value) -> Result<Vec<ProgramSummary>> {
    let items = doc
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| DataSourceError::MalformedDocument("expected a data array".to_string()))?;

    Ok(items
        .iter()
        .filter_map(|item| {
            let attrs = item.get("attributes")?;
            let handle = str_attr(attrs, "handle")?;
            let name = str_attr(attrs, "name")
                .or_else(|| item.get("id").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| handle.clone());
            Some(ProgramSummary { handle, name })
        })
        .collect())
}

/// Unique programs referenced by a page of `/hackers/hacktivity`,
/// in first-seen order.
pub fn parse_hacktivity(doc: &Value) -> Result<Vec<ProgramSummary>> {
    let items = doc
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| DataSourceError::MalformedDocument("expected a data array".to_string()))?;

    let mut seen = HashSet::new();
    let mut programs = Vec::new();
    for item in items {
        let Some(attrs) = item.pointer("/relationships/program/data/attributes") else {
            continue;
        };
        let Some(handle) = str_attr(attrs, "handle") else {
            continue;
        };
        if seen.insert(handle.clone()) {
            let name = str_attr(attrs, "name").unwrap_or_else(|| handle.clone());
            programs.push(ProgramSummary { handle, name });
        }
    }
    Ok(programs)
}
