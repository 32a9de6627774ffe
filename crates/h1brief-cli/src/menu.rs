//! Interactive program selection for `h1brief analyze` without a handle.
//!
//! Shows the accessible programs as a numbered list with a trailing
//! "Search for another program" entry. Search goes through hacktivity
//! first and falls back to a direct handle lookup.

use std::io::Write;

use anyhow::{bail, Context, Result};
use h1brief_core::{
    resolve_selection, DataSourceError, ProgramRecord, ProgramSource, ProgramSummary, Selection,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Numbered listing, one program per line, plus the search entry.
pub fn render_listing(programs: &[ProgramSummary]) -> String {
    let mut out = String::new();
    for (idx, program) in programs.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", idx + 1, program));
    }
    out.push_str(&format!(
        "{}. Search for another program\n",
        programs.len() + 1
    ));
    out
}

async fn ask<R, W>(input: &mut R, out: &mut W, question: &str) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{}", question)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        bail!("Input closed before a program was selected");
    }
    Ok(line.trim().to_string())
}

/// Run the selection menu until a program has been fetched.
pub async fn select_program<R, W>(
    source: &dyn ProgramSource,
    programs: &[ProgramSummary],
    input: &mut R,
    out: &mut W,
) -> Result<ProgramRecord>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "\nFound {} program(s):\n", programs.len())?;
    write!(out, "{}", render_listing(programs))?;

    loop {
        let question = format!("\nChoose a program (1-{}): ", programs.len() + 1);
        let choice = ask(input, out, &question).await?;

        match resolve_selection(programs.len(), &choice) {
            Selection::Listed(idx) => {
                let handle = &programs[idx].handle;
                return source
                    .fetch_program(handle)
                    .await
                    .with_context(|| format!("Failed to fetch program '{}'", handle));
            }
            Selection::Search => {
                if let Some(program) = search(source, input, out).await? {
                    return Ok(program);
                }
            }
            Selection::Invalid(message) => writeln!(out, "{}", message)?,
        }
    }
}

async fn search<R, W>(
    source: &dyn ProgramSource,
    input: &mut R,
    out: &mut W,
) -> Result<Option<ProgramRecord>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let query = ask(input, out, "Enter program handle or name to search: ").await?;
    if query.is_empty() {
        writeln!(out, "Search term cannot be empty.")?;
        return Ok(None);
    }

    let matches = match source.search_hacktivity(&query).await {
        Ok(matches) => matches,
        Err(e) => {
            writeln!(out, "Error searching programs via hacktivity: {}", e)?;
            Vec::new()
        }
    };

    if !matches.is_empty() {
        writeln!(out, "Programs found via hacktivity search:")?;
        for (idx, program) in matches.iter().enumerate() {
            writeln!(out, "{}. {}", idx + 1, program)?;
        }

        let question = format!(
            "Choose one (1-{}) or press enter to treat '{}' as a handle: ",
            matches.len(),
            query
        );
        let pick = ask(input, out, &question).await?;
        let picked = pick
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| matches.get(idx));

        if let Some(program) = picked {
            writeln!(out, "Selected program {} from hacktivity results", program.name)?;
            return source
                .fetch_program(&program.handle)
                .await
                .map(Some)
                .with_context(|| format!("Failed to fetch program '{}'", program.handle));
        }
    }

    writeln!(out, "\nSearching for program by handle: {}...", query)?;
    match source.fetch_program(&query).await {
        Ok(program) => Ok(Some(program)),
        Err(DataSourceError::NotFound(_)) | Err(DataSourceError::Status { .. }) => {
            writeln!(
                out,
                "Program '{}' not found or you don't have access.",
                query
            )?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h1brief_core::MemoryProgramSource;

    fn source() -> MemoryProgramSource {
        MemoryProgramSource::new()
            .with_program(ProgramRecord::new("acme", "Acme Corp", "policy"))
            .with_program(ProgramRecord::new("globex", "Globex", "policy"))
            .with_program(ProgramRecord::new("initech", "Initech", "policy"))
    }

    fn listing() -> Vec<ProgramSummary> {
        vec![
            ProgramSummary {
                handle: "acme".to_string(),
                name: "Acme Corp".to_string(),
            },
            ProgramSummary {
                handle: "globex".to_string(),
                name: "Globex".to_string(),
            },
        ]
    }

    async fn run(source: &MemoryProgramSource, typed: &str) -> (Result<ProgramRecord>, String) {
        let mut input = typed.as_bytes();
        let mut out = Vec::new();
        let result = select_program(source, &listing(), &mut input, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_render_listing() {
        assert_eq!(
            render_listing(&listing()),
            "1. Acme Corp (acme)\n2. Globex (globex)\n3. Search for another program\n"
        );
        assert_eq!(render_listing(&[]), "1. Search for another program\n");
    }

    #[tokio::test]
    async fn test_pick_listed_program() {
        let source = source();
        let (result, _) = run(&source, "2\n").await;
        assert_eq!(result.unwrap().handle, "globex");
        assert_eq!(source.fetches(), vec!["globex"]);
    }

    #[tokio::test]
    async fn test_invalid_choices_reprompt() {
        let source = source();
        let (result, out) = run(&source, "abc\n9\n1\n").await;
        assert_eq!(result.unwrap().handle, "acme");
        assert!(out.contains("Invalid input. Please enter a number."));
        assert!(out.contains("Please enter a number between 1 and 3"));
    }

    #[tokio::test]
    async fn test_search_picks_hacktivity_match() {
        let source = source();
        let (result, out) = run(&source, "3\nini\n1\n").await;
        assert_eq!(result.unwrap().handle, "initech");
        assert!(out.contains("Programs found via hacktivity search:"));
        assert!(out.contains("1. Initech (initech)"));
    }

    #[tokio::test]
    async fn test_search_enter_falls_back_to_handle() {
        let source = source();
        let (result, out) = run(&source, "3\ninitech\n\n").await;
        assert_eq!(result.unwrap().handle, "initech");
        assert!(out.contains("Searching for program by handle: initech"));
    }

    #[tokio::test]
    async fn test_unknown_handle_returns_to_menu() {
        let source = source();
        let (result, out) = run(&source, "3\nnope\n3\n\n1\n").await;
        assert_eq!(result.unwrap().handle, "acme");
        assert!(out.contains("Program 'nope' not found or you don't have access."));
        assert!(out.contains("Search term cannot be empty."));
    }

    #[tokio::test]
    async fn test_closed_input_is_an_error() {
        let source = source();
        let (result, _) = run(&source, "").await;
        assert!(result.is_err());
        assert!(source.fetches().is_empty());
    }
}
