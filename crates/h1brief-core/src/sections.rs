//! The fixed section layout of a program brief.

use serde::{Deserialize, Serialize};

/// Required report sections, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    Overview,
    ScopeAndAssets,
    VulnerabilityTypesAccepted,
    ExclusionsAndOutOfScope,
    RewardStructure,
    TestingGuidelines,
    KeyTakeaways,
}

impl ReportSection {
    pub const ALL: [ReportSection; 7] = [
        ReportSection::Overview,
        ReportSection::ScopeAndAssets,
        ReportSection::VulnerabilityTypesAccepted,
        ReportSection::ExclusionsAndOutOfScope,
        ReportSection::RewardStructure,
        ReportSection::TestingGuidelines,
        ReportSection::KeyTakeaways,
    ];

    /// Heading text exactly as it should appear after `## `.
    pub fn heading(&self) -> &'static str {
        match self {
            ReportSection::Overview => "Overview",
            ReportSection::ScopeAndAssets => "Scope & Assets",
            ReportSection::VulnerabilityTypesAccepted => "Vulnerability Types Accepted",
            ReportSection::ExclusionsAndOutOfScope => "Exclusions & Out of Scope",
            ReportSection::RewardStructure => "Reward Structure",
            ReportSection::TestingGuidelines => "Testing Guidelines",
            ReportSection::KeyTakeaways => "Key Takeaways",
        }
    }
}

impl std::fmt::Display for ReportSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.heading())
    }
}
