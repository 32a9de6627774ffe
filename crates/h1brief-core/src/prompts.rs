//! Prompt construction for the model-calling stages.

use hackerone_api::{ProgramRecord, ScopeEntry};

use crate::sections::ReportSection;

fn table_cell(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

/// Render structured scope as a Markdown table, one row per entry.
///
/// Columns: Asset, Type, Eligible, Notes.
pub fn render_scope_table(entries: &[ScopeEntry]) -> String {
    let mut out = String::from("| Asset | Type | Eligible | Notes |\n|---|---|---|---|\n");
    for entry in entries {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            table_cell(&entry.asset_identifier),
            table_cell(&entry.asset_type),
            entry.eligible_for_submission,
            table_cell(entry.instruction.as_deref().unwrap_or("")),
        ));
    }
    out
}

fn scope_listing(program: &ProgramRecord) -> String {
    if !program.has_structured_scope() {
        return "Structured Scope: none (scope is described only in the policy)\n".to_string();
    }
    let mut out = String::from("Structured Scope:\n");
    for entry in &program.scope {
        out.push_str(&format!(
            "- {} [{}] eligible={}{}\n",
            entry.asset_identifier,
            entry.asset_type,
            entry.eligible_for_submission,
            entry
                .instruction
                .as_deref()
                .map(|i| format!(" notes: {}", table_cell(i)))
                .unwrap_or_default(),
        ));
    }
    out
}

/// Stage 1: working analysis of the program.
pub fn analyze_prompt(program: &ProgramRecord) -> String {
    format!(
        "Analyze the following HackerOne program information and identify:\n\
         1. Key vulnerability types they're looking for\n\
         2. Scope and assets included\n\
         3. Any critical restrictions or out-of-scope items\n\
         4. Reward information if available\n\n\
         Program Content:\n{}\n{}\n\
         Provide a structured analysis.",
        program.program_sheet(),
        scope_listing(program),
    )
}

/// Stage 2: normalize the analysis into the report's fact sheet.
pub fn extract_prompt(program: &ProgramRecord, analysis: &str) -> String {
    format!(
        "Based on this HackerOne program and the analysis below, extract and summarize:\n\
         - Program name and scope\n\
         - In-scope technologies and platforms\n\
         - Vulnerability types accepted\n\
         - Exclusions and restrictions\n\
         - Reward structure\n\
         - Key testing guidelines\n\n\
         Program Content:\n{}\n{}\n\
         Analysis:\n{}\n\n\
         Format the response as bullet points for clarity.",
        program.program_sheet(),
        scope_listing(program),
        analysis.trim(),
    )
}

/// Stage 3: the final Markdown brief.
///
/// With structured scope the pre-rendered table is embedded and must be
/// reproduced; without it the model is told to describe scope in prose.
pub fn summarize_prompt(
    program: &ProgramRecord,
    analysis: &str,
    extraction: &str,
    feedback: Option<&str>,
) -> String {
    let mut out = String::from(
        "Create a professional, well-formatted Markdown summary of a HackerOne bug bounty program.\n\n\
         Use exactly these headings, in this order:\n# HackerOne Program Summary\n",
    );
    for section in ReportSection::ALL {
        out.push_str(&format!("## {}\n", section.heading()));
    }

    out.push('\n');
    if program.has_structured_scope() {
        out.push_str(&format!(
            "Under \"## {}\" include this table verbatim, one row per asset, then add any scope limits from the policy:\n\n{}\n",
            ReportSection::ScopeAndAssets,
            render_scope_table(&program.scope),
        ));
    } else {
        out.push_str(&format!(
            "The program has no structured scope entries. Under \"## {}\" describe the in-scope assets, \
             boundaries and any geographic or jurisdictional limits in prose. Do not use a table.\n\n",
            ReportSection::ScopeAndAssets,
        ));
    }

    out.push_str(&format!(
        "Program: {} ({})\n\nProgram Analysis:\n{}\n\n{}\n\n",
        program.name,
        program.handle,
        analysis.trim(),
        extraction.trim(),
    ));

    if let Some(feedback) = feedback {
        out.push_str(feedback.trim());
        out.push_str("\n\n");
    }

    out.push_str(
        "Make it professional, concise, and actionable for security researchers. \
         Do not abbreviate or generalize the Scope & Assets section.",
    );
    out
}
