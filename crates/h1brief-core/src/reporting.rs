//! Persisting finished briefs.
//!
//! The Markdown report goes to `hackerone_summary.md` by default. A
//! review artifact (`<stem>.review.json` plus a SHA-256 `.review.digest`)
//! records how the report was judged so a degraded brief stays auditable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::{AnalysisError, AnalysisOutcome, Result, RunStatus};

/// Default report location, relative to the working directory.
pub const DEFAULT_REPORT_PATH: &str = "hackerone_summary.md";

const ARTIFACT_SCHEMA_VERSION: &str = "1.0";

/// Text written to disk for an outcome.
///
/// Complete reports are written as generated. Degraded reports get a
/// leading notice listing what review found missing.
pub fn render_document(outcome: &AnalysisOutcome) -> String {
    match outcome.status {
        RunStatus::Complete => outcome.report_text.clone(),
        RunStatus::Degraded => {
            let mut out = String::from(
                "> **Incomplete report**: this brief did not pass automated review.\n>\n",
            );
            for d in &outcome.deficiencies {
                out.push_str(&format!("> - {}\n", d));
            }
            out.push('\n');
            out.push_str(&outcome.report_text);
            out
        }
    }
}

/// Write the rendered report to `path`.
pub fn write_report(path: &Path, outcome: &AnalysisOutcome) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_document(outcome))?;
    info!("Summary saved to: {:?}", path);
    Ok(())
}

/// Audit record persisted next to the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub handle: String,
    pub status: RunStatus,
    pub deficiencies: Vec<String>,
    pub retries: u32,
    pub generator_calls: u32,
    pub generator: String,
    /// SHA-256 of the rendered report as written.
    pub report_sha256: String,
}

impl ReviewArtifact {
    pub fn from_outcome(outcome: &AnalysisOutcome, generator: &str) -> Self {
        Self {
            schema_version: ARTIFACT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            handle: outcome.handle.clone(),
            status: outcome.status,
            deficiencies: outcome.deficiencies.clone(),
            retries: outcome.retries,
            generator_calls: outcome.generator_calls,
            generator: generator.to_string(),
            report_sha256: sha256_hex(render_document(outcome).as_bytes()),
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn artifact_paths(report_path: &Path) -> (PathBuf, PathBuf) {
    (
        report_path.with_extension("review.json"),
        report_path.with_extension("review.digest"),
    )
}

/// Persist `<stem>.review.json` and `<stem>.review.digest` beside the report.
pub fn write_review_artifact(report_path: &Path, artifact: &ReviewArtifact) -> Result<PathBuf> {
    let (path, digest_path) = artifact_paths(report_path);
    let json = serde_json::to_vec_pretty(artifact)?;

    std::fs::write(&path, &json)?;
    std::fs::write(&digest_path, sha256_hex(&json).as_bytes())?;

    Ok(path)
}

/// Read the review artifact for `report_path` and verify its digest.
pub fn read_review_artifact(report_path: &Path) -> Result<ReviewArtifact> {
    let (path, digest_path) = artifact_paths(report_path);

    let json = std::fs::read(&path)?;
    let expected = std::fs::read_to_string(&digest_path)?.trim().to_string();
    let actual = sha256_hex(&json);
    if actual != expected {
        return Err(AnalysisError::DigestMismatch { expected, actual });
    }

    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn outcome(status: RunStatus) -> AnalysisOutcome {
        AnalysisOutcome {
            handle: "acme".to_string(),
            status,
            report_text: "# HackerOne Program Summary\n".to_string(),
            deficiencies: match status {
                RunStatus::Complete => vec![],
                RunStatus::Degraded => vec!["missing section: Key Takeaways".to_string()],
            },
            retries: 0,
            generator_calls: 3,
        }
    }

    #[test]
    fn test_complete_document_is_report_text() {
        let o = outcome(RunStatus::Complete);
        assert_eq!(render_document(&o), o.report_text);
    }

    #[test]
    fn test_degraded_document_is_flagged() {
        let doc = render_document(&outcome(RunStatus::Degraded));
        assert!(doc.starts_with("> **Incomplete report**"));
        assert!(doc.contains("> - missing section: Key Takeaways\n"));
        assert!(doc.ends_with("# HackerOne Program Summary\n"));
    }

    #[test]
    fn test_write_report_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join(DEFAULT_REPORT_PATH);
        write_report(&path, &outcome(RunStatus::Complete)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# HackerOne Program Summary\n"
        );
    }

    #[test]
    fn test_artifact_paths_sit_beside_report() {
        let (json, digest) = artifact_paths(Path::new("/tmp/hackerone_summary.md"));
        assert_eq!(json, Path::new("/tmp/hackerone_summary.review.json"));
        assert_eq!(digest, Path::new("/tmp/hackerone_summary.review.digest"));
    }

    #[test]
    fn test_tampered_artifact_is_rejected() {
        let dir = tempdir().unwrap();
        let report = dir.path().join(DEFAULT_REPORT_PATH);
        let artifact = ReviewArtifact::from_outcome(&outcome(RunStatus::Degraded), "scripted");
        let path = write_review_artifact(&report, &artifact).unwrap();

        let tampered = std::fs::read_to_string(&path)
            .unwrap()
            .replace("degraded", "complete");
        std::fs::write(&path, tampered).unwrap();

        assert!(matches!(
            read_review_artifact(&report),
            Err(AnalysisError::DigestMismatch { .. })
        ));
    }
}
