//! In-memory program source (testing only)

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::ProgramSource;
use crate::error::DataSourceError;
use crate::model::{ProgramRecord, ProgramSummary};
use crate::Result;

/// Program source backed by a `BTreeMap<handle, ProgramRecord>`.
///
/// Hacktivity search matches handles and names by substring.
#[derive(Debug, Default)]
pub struct MemoryProgramSource {
    programs: BTreeMap<String, ProgramRecord>,
    fetches: Mutex<Vec<String>>,
}

impl MemoryProgramSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, record: ProgramRecord) -> Self {
        self.programs.insert(record.handle.clone(), record);
        self
    }

    /// Handles passed to `fetch_program`, in call order.
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgramSource for MemoryProgramSource {
    async fn fetch_program(&self, handle: &str) -> Result<ProgramRecord> {
        self.fetches.lock().unwrap().push(handle.to_string());
        self.programs
            .get(handle)
            .cloned()
            .ok_or_else(|| DataSourceError::NotFound(handle.to_string()))
    }

    async fn list_accessible_programs(&self) -> Result<Vec<ProgramSummary>> {
        Ok(self.programs.values().map(ProgramRecord::summary).collect())
    }

    async fn search_hacktivity(&self, query: &str) -> Result<Vec<ProgramSummary>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(DataSourceError::InvalidQuery(
                "search term cannot be empty".to_string(),
            ));
        }
        Ok(self
            .programs
            .values()
            .filter(|p| {
                p.handle.to_lowercase().contains(&query) || p.name.to_lowercase().contains(&query)
            })
            .map(ProgramRecord::summary)
            .collect())
    }
}
