//! Rename assignment.
//!
//! Gives each extracted identifier a fresh sequential name. The sequence
//! starts at 1 and follows extraction order, so a given input always maps
//! the same way within a run.

use crate::error::{AnonymizerError, Result};
use crate::models::{Language, RenameTable};
use std::collections::HashSet;
use tracing::debug;

/// Assign a replacement name to every identifier.
///
/// Replacements are `<prefix><n>` with the prefix chosen per language, so
/// C and OCaml output can never collide. A duplicate assignment means the
/// extractor handed us a non-deduplicated set; that is a programming
/// defect, surfaced as [`AnonymizerError::MalformedRenameTable`].
pub fn assign(identifiers: &[String], language: Language) -> Result<RenameTable> {
    let mut table = RenameTable::new();
    let prefix = language.rename_prefix();
    let taken: HashSet<&str> = identifiers.iter().map(|s| s.as_str()).collect();

    let mut sequence = 0usize;
    for identifier in identifiers {
        // Skip indices whose generated name already exists in the file;
        // the rewriter replaces one identifier at a time, so a replacement
        // equal to a later original would be substituted twice.
        let replacement = loop {
            sequence += 1;
            let candidate = format!("{}{}", prefix, sequence);
            if !taken.contains(candidate.as_str()) {
                break candidate;
            }
        };
        if !table.insert(identifier, &replacement) {
            return Err(AnonymizerError::MalformedRenameTable(format!(
                "duplicate assignment for '{}'",
                identifier
            )));
        }
    }

    debug!("assigned {} replacement names", table.len());
    Ok(table)
}
