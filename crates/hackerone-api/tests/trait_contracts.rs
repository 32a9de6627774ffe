//! Trait contract tests for ProgramSource.
//!
//! These use the in-memory fake; any conforming source must behave the
//! same way for lookups, listing and search.

use hackerone_api::{
    find_programs_by_name, parse_program_document, DataSourceError, MemoryProgramSource,
    ProgramRecord, ProgramSource, ScopeEntry,
};
use serde_json::json;

fn source() -> MemoryProgramSource {
    MemoryProgramSource::new()
        .with_program(
            ProgramRecord::new("acme", "Acme Corp", "Be nice.").with_scope(vec![ScopeEntry::new(
                "api.acme.com",
                "URL",
                true,
            )]),
        )
        .with_program(ProgramRecord::new("globex", "Globex", "Policy."))
}

// ===========================================================================
// fetch_program
// ===========================================================================

#[tokio::test]
async fn fetch_returns_full_record() {
    let source = source();
    let dyn_source: &dyn ProgramSource = &source;

    let record = dyn_source.fetch_program("acme").await.unwrap();

    assert_eq!(record.name, "Acme Corp");
    assert!(record.has_structured_scope());
    assert_eq!(record.scope[0].asset_identifier, "api.acme.com");
}

#[tokio::test]
async fn fetch_unknown_handle_is_not_found() {
    let err = source().fetch_program("initech").await.unwrap_err();
    assert!(matches!(err, DataSourceError::NotFound(ref h) if h == "initech"));
}

// ===========================================================================
// list / search
// ===========================================================================

#[tokio::test]
async fn listing_summarizes_every_program() {
    let programs = source().list_accessible_programs().await.unwrap();
    let handles: Vec<_> = programs.iter().map(|p| p.handle.as_str()).collect();
    assert_eq!(handles, vec!["acme", "globex"]);
}

#[tokio::test]
async fn listing_feeds_local_name_filter() {
    let programs = source().list_accessible_programs().await.unwrap();
    let matches = find_programs_by_name(&programs, "corp");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].to_string(), "Acme Corp (acme)");
}

#[tokio::test]
async fn search_requires_a_term() {
    let err = source().search_hacktivity("   ").await.unwrap_err();
    assert!(matches!(err, DataSourceError::InvalidQuery(_)));
}

#[tokio::test]
async fn search_matches_name_or_handle() {
    let found = source().search_hacktivity("GLOB").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].handle, "globex");
}

// ===========================================================================
// Documents to records
// ===========================================================================

#[tokio::test]
async fn parsed_document_is_servable() {
    let doc = json!({
        "data": {
            "id": "13",
            "type": "program",
            "attributes": {
                "handle": "initech",
                "name": "Initech",
                "policy": "TPS reports only.",
                "state": "public_mode",
                "offers_bounties": true
            },
            "relationships": {
                "structured_scopes": {
                    "data": [
                        {"attributes": {"asset_identifier": "*.initech.com", "asset_type": "WILDCARD", "eligible_for_submission": true}}
                    ]
                }
            }
        }
    });
    let record = parse_program_document(&doc).unwrap();
    let source = MemoryProgramSource::new().with_program(record);

    let fetched = source.fetch_program("initech").await.unwrap();
    assert!(fetched.offers_bounties);
    assert_eq!(fetched.scope.len(), 1);
    assert_eq!(source.fetches(), vec!["initech"]);
}
