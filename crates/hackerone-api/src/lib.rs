//! hackerone-api: HackerOne program registry access for h1brief
//!
//! This crate is the data source layer. It owns the program data model,
//! reads API credentials, talks to the HackerOne hacker API and parses
//! its JSON:API documents.
//!
//! ## Layer 0 - Program Data Source
//!
//! Focus: faithful program records. Transport and auth failures are
//! returned as [`DataSourceError`]; nothing here retries.

pub mod client;
pub mod config;
pub mod discovery;
pub mod document;
pub mod error;
pub mod fakes;
pub mod model;

pub use client::{HackerOneClient, ProgramSource};
pub use config::{Credentials, HackerOneConfig, CREDENTIALS_FILE};
pub use discovery::{find_programs_by_name, resolve_selection, Selection};
pub use document::{parse_hacktivity, parse_program_document, parse_program_list};
pub use error::DataSourceError;
pub use fakes::MemoryProgramSource;
pub use model::{ProgramRecord, ProgramState, ProgramSummary, ScopeEntry};

/// Result type for data source operations
pub type Result<T> = std::result::Result<T, DataSourceError>;
