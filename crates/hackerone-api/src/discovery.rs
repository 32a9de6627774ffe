//! Local program discovery helpers used by the selection menu.

use crate::model::ProgramSummary;

/// Programs whose name or handle contains `needle`, case-insensitively.
pub fn find_programs_by_name(programs: &[ProgramSummary], needle: &str) -> Vec<ProgramSummary> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    programs
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.handle.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// A parsed menu choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Zero-based index into the listing
    Listed(usize),
    /// The trailing "search for another program" entry
    Search,
    Invalid(String),
}

/// Interpret a 1-based menu choice over `listing_len` programs plus the
/// search entry at `listing_len + 1`.
pub fn resolve_selection(listing_len: usize, input: &str) -> Selection {
    let choice: usize = match input.trim().parse() {
        Ok(n) => n,
        Err(_) => return Selection::Invalid("Invalid input. Please enter a number.".to_string()),
    };

    match choice {
        n if n >= 1 && n <= listing_len => Selection::Listed(n - 1),
        n if n == listing_len + 1 => Selection::Search,
        _ => Selection::Invalid(format!(
            "Please enter a number between 1 and {}",
            listing_len + 1
        )),
    }
}
