//! Review gate for generated briefs.
//!
//! Checks rendered Markdown against the fixed checklist: every
//! [`ReportSection`] heading present, and a Markdown table under
//! Scope & Assets when the program had structured scope entries.
//! Pure and deterministic; the pipeline uses the verdict to decide
//! whether to re-summarize.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::sections::ReportSection;

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}(#{1,6})[ \t]+(.*?)[ \t]*#*[ \t]*$").expect("valid regex"))
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*\|?\s*:?-{3,}:?\s*(\|\s*:?-{3,}:?\s*)*\|?\s*$").expect("valid regex")
    })
}

/// Outcome of reviewing one rendered report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub is_acceptable: bool,
    /// Missing section headings, in document order.
    pub missing_sections: Vec<String>,
    /// Structured scope existed but no table was found under Scope & Assets.
    pub table_required_but_missing: bool,
}

impl ReviewResult {
    fn new(missing_sections: Vec<String>, table_required_but_missing: bool) -> Self {
        Self {
            is_acceptable: missing_sections.is_empty() && !table_required_but_missing,
            missing_sections,
            table_required_but_missing,
        }
    }

    /// One line per problem, suitable for showing to a reader.
    pub fn deficiencies(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .missing_sections
            .iter()
            .map(|s| format!("missing section: {}", s))
            .collect();
        if self.table_required_but_missing {
            out.push(format!(
                "{} must present the structured scope as a Markdown table",
                ReportSection::ScopeAndAssets
            ));
        }
        out
    }

    /// Instructions appended to the next generation attempt.
    pub fn feedback(&self) -> Option<String> {
        if self.is_acceptable {
            return None;
        }
        let mut out = String::from("The previous draft was rejected by review:\n");
        for d in self.deficiencies() {
            out.push_str(&format!("- {}\n", d));
        }
        out.push_str("Rewrite the complete report and fix every item above.");
        Some(out)
    }
}

#[derive(Debug)]
struct Heading {
    line: usize,
    level: usize,
    text: String,
}

/// Lowercase, `&` spelled `and`, emphasis and trailing colon stripped,
/// whitespace collapsed.
fn normalize_heading(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect();
    cleaned
        .trim()
        .trim_end_matches(':')
        .to_lowercase()
        .replace('&', " and ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// `true` for every line that is a fence marker or sits inside a fenced block.
fn fenced_lines(lines: &[&str]) -> Vec<bool> {
    let mut in_fence = false;
    lines
        .iter()
        .map(|line| {
            if is_fence(line) {
                in_fence = !in_fence;
                return true;
            }
            in_fence
        })
        .collect()
}

fn collect_headings(lines: &[&str]) -> Vec<Heading> {
    let fenced = fenced_lines(lines);
    let mut headings = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if fenced[idx] {
            continue;
        }
        if let Some(caps) = heading_re().captures(line) {
            headings.push(Heading {
                line: idx,
                level: caps[1].len(),
                text: normalize_heading(&caps[2]),
            });
        }
    }
    headings
}

/// Header row, separator row and at least one data row, all outside
/// fenced code.
fn has_table(lines: &[&str]) -> bool {
    let fenced = fenced_lines(lines);
    let visible: Vec<&str> = lines
        .iter()
        .zip(&fenced)
        .map(|(line, fenced)| if *fenced { "" } else { *line })
        .collect();

    visible.windows(3).any(|rows| {
        rows[0].contains('|')
            && separator_re().is_match(rows[1])
            && rows[2].contains('|')
            && !separator_re().is_match(rows[2])
    })
}

/// Remove one code fence wrapping the entire reply.
///
/// Accepts an opening line of ```` ``` ````, ```` ```markdown ```` or
/// ```` ```md ```` and a closing ```` ``` ```` as the last line. Inner
/// blocks must open with an info string (```` ```bash ````). Anything else,
/// including a wrapper that closes before the end, is returned unchanged.
pub fn strip_wrapping_fence(text: &str) -> String {
    let trimmed = text.trim();
    let (first, rest) = match trimmed.split_once('\n') {
        Some(split) => split,
        None => return text.to_string(),
    };

    let opener = first.trim_end();
    if !opener.starts_with("```") {
        return text.to_string();
    }
    let info = opener[3..].trim().to_lowercase();
    if !matches!(info.as_str(), "" | "markdown" | "md") {
        return text.to_string();
    }

    let (body, last) = match rest.rsplit_once('\n') {
        Some(split) => split,
        None => return text.to_string(),
    };
    if last.trim() != "```" {
        return text.to_string();
    }

    // A bare ``` closes the wrapper unless an inner block (opened with an
    // info string) is still open.
    let mut inner_open = false;
    for line in body.lines() {
        let line = line.trim();
        if !line.starts_with("```") {
            continue;
        }
        let bare = line.trim_start_matches('`').trim().is_empty();
        match (inner_open, bare) {
            (false, true) => return text.to_string(),
            (false, false) => inner_open = true,
            (true, true) => inner_open = false,
            (true, false) => {}
        }
    }
    if inner_open {
        return text.to_string();
    }

    format!("{}\n", body.trim_end())
}

/// Review `markdown` against the section checklist.
///
/// `expects_table` should be true exactly when the program had structured
/// scope entries.
pub fn review_report(markdown: &str, expects_table: bool) -> ReviewResult {
    let lines: Vec<&str> = markdown.lines().collect();
    let headings = collect_headings(&lines);

    let find = |section: ReportSection| {
        let wanted = normalize_heading(section.heading());
        headings.iter().position(|h| h.text == wanted)
    };

    let missing_sections: Vec<String> = ReportSection::ALL
        .iter()
        .filter(|s| find(**s).is_none())
        .map(|s| s.heading().to_string())
        .collect();

    let table_required_but_missing = expects_table
        && match find(ReportSection::ScopeAndAssets) {
            Some(pos) => {
                let scope = &headings[pos];
                let end = headings[pos + 1..]
                    .iter()
                    .find(|h| h.level <= scope.level)
                    .map(|h| h.line)
                    .unwrap_or(lines.len());
                !has_table(&lines[scope.line + 1..end])
            }
            None => true,
        };

    ReviewResult::new(missing_sections, table_required_but_missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(scope_body: &str) -> String {
        format!(
            "# HackerOne Program Summary\n\n## Overview\nAcme.\n\n## Scope & Assets\n{}\n\n## Vulnerability Types Accepted\n- XSS\n\n## Exclusions & Out of Scope\n- DoS\n\n## Reward Structure\nUSD.\n\n## Testing Guidelines\nBe nice.\n\n## Key Takeaways\nGo.\n",
            scope_body
        )
    }

    const TABLE: &str =
        "| Asset | Type | Eligible | Notes |\n|---|---|---|---|\n| api.acme.com | URL | true | prod |";

    #[test]
    fn test_complete_prose_report_passes() {
        let result = review_report(&report("Only the staging site."), false);
        assert!(result.is_acceptable);
        assert!(result.missing_sections.is_empty());
        assert!(result.deficiencies().is_empty());
        assert_eq!(result.feedback(), None);
    }

    #[test]
    fn test_table_required_and_present() {
        let result = review_report(&report(TABLE), true);
        assert!(result.is_acceptable);
    }

    #[test]
    fn test_table_required_but_prose() {
        let result = review_report(&report("api.acme.com is in scope."), true);
        assert!(!result.is_acceptable);
        assert!(result.table_required_but_missing);
        assert!(result.missing_sections.is_empty());
        assert_eq!(result.deficiencies().len(), 1);
    }

    #[test]
    fn test_table_in_other_section_does_not_count() {
        let md = report("see below").replace("Be nice.", TABLE);
        let result = review_report(&md, true);
        assert!(result.table_required_but_missing);
    }

    #[test]
    fn test_table_under_scope_subheading_counts() {
        let md = report(&format!("### In scope\n{}", TABLE));
        assert!(review_report(&md, true).is_acceptable);
    }

    #[test]
    fn test_missing_sections_in_document_order() {
        let md = "## Key Takeaways\nx\n## Overview\ny\n";
        let result = review_report(md, false);
        assert_eq!(
            result.missing_sections,
            vec![
                "Scope & Assets",
                "Vulnerability Types Accepted",
                "Exclusions & Out of Scope",
                "Reward Structure",
                "Testing Guidelines",
            ]
        );
    }

    #[test]
    fn test_missing_scope_section_also_misses_table() {
        let md = report(TABLE).replace("## Scope & Assets", "Scope and assets:");
        let result = review_report(&md, true);
        assert_eq!(result.missing_sections, vec!["Scope & Assets"]);
        assert!(result.table_required_but_missing);
    }

    #[test]
    fn test_headings_case_insensitive_and_spelling_variants() {
        let md = report("x")
            .replace("## Overview", "## OVERVIEW")
            .replace("## Scope & Assets", "### **Scope and Assets:**")
            .replace("## Key Takeaways", "## Key Takeaways ##");
        assert!(review_report(&md, false).is_acceptable);
    }

    #[test]
    fn test_headings_inside_code_fence_ignored() {
        let md = "```\n## Overview\n```\n";
        let result = review_report(md, false);
        assert!(result.missing_sections.contains(&"Overview".to_string()));
    }

    #[test]
    fn test_table_inside_code_fence_does_not_count() {
        let md = report(&format!("```\n{}\n```", TABLE));
        let result = review_report(&md, true);
        assert!(!result.is_acceptable);
        assert!(result.table_required_but_missing);
    }

    #[test]
    fn test_table_needs_a_data_row() {
        let header_only = "| Asset | Type | Eligible | Notes |\n|---|---|---|---|";
        let result = review_report(&report(header_only), true);
        assert!(result.table_required_but_missing);
    }

    #[test]
    fn test_strip_wrapping_markdown_fence() {
        let body = report(TABLE);
        for opener in ["```markdown", "```md", "```", "```Markdown "] {
            let wrapped = format!("{}\n{}```\n", opener, body);
            let stripped = strip_wrapping_fence(&wrapped);
            assert_eq!(stripped, body);
            assert!(review_report(&stripped, true).is_acceptable);
        }
    }

    #[test]
    fn test_strip_leaves_unwrapped_and_partial_fences() {
        let plain = report("x");
        assert_eq!(strip_wrapping_fence(&plain), plain);

        let code_then_text = "```rust\nfn main() {}\n```\n";
        assert_eq!(strip_wrapping_fence(code_then_text), code_then_text);

        let early_close = "```\nA\n```\nB\n```\nC\n```";
        assert_eq!(strip_wrapping_fence(early_close), early_close);

        let inner_block = "```markdown\n## Overview\n```bash\ncurl x\n```\nafter\n```";
        assert_eq!(
            strip_wrapping_fence(inner_block),
            "## Overview\n```bash\ncurl x\n```\nafter\n"
        );
    }

    #[test]
    fn test_bold_line_is_not_a_heading() {
        let md = report("x").replace("## Reward Structure", "**Reward Structure**");
        let result = review_report(&md, false);
        assert_eq!(result.missing_sections, vec!["Reward Structure"]);
    }

    #[test]
    fn test_feedback_lists_every_deficiency() {
        let result = review_report("## Overview\n", true);
        let feedback = result.feedback().unwrap();
        assert!(feedback.contains("missing section: Key Takeaways"));
        assert!(feedback.contains("Markdown table"));
    }

    #[test]
    fn test_review_is_idempotent() {
        let md = report("prose only");
        assert_eq!(review_report(&md, true), review_report(&md, true));
        assert_eq!(review_report(&md, false), review_report(&md, false));
    }
}
