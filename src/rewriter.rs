//! Token-safe rewriting.
//!
//! Substitutes replacement names into the buffer. Correctness rests on
//! exact token-boundary matching: an occurrence only counts when delimited
//! on both sides by a non-word delimiter, a bracket, or a buffer edge, and
//! it is skipped inside string/comment regions and after reserved
//! `Module.` qualifications. All occurrences of one identifier are
//! replaced before the next identifier is processed, so replacement text
//! inserted by one pass can never be matched by a later pass.

use crate::classifier::{is_numeric_literal, TokenClassifier};
use crate::error::{AnonymizerError, Result};
use crate::models::{Language, RenameTable};
use crate::resolver::Resolution;
use tracing::{debug, trace};

/// Replace every safe occurrence of each table entry in the buffer.
pub fn rewrite(
    buffer: &mut String,
    table: &RenameTable,
    language: Language,
    resolution: &Resolution,
    classifier: &dyn TokenClassifier,
) -> Result<()> {
    for (original, replacement) in table.entries() {
        if original.is_empty() || replacement.is_empty() {
            return Err(AnonymizerError::MalformedRenameTable(
                "empty identifier or replacement".to_string(),
            ));
        }
        if original == replacement {
            return Err(AnonymizerError::MalformedRenameTable(format!(
                "identifier '{}' maps to itself",
                original
            )));
        }
        if is_numeric_literal(original) {
            continue;
        }

        let matches = collect_matches(buffer, original, language, resolution, classifier);
        trace!("{} -> {}: {} occurrences", original, replacement, matches.len());

        // Replace back-to-front so earlier offsets stay valid.
        for (start, end) in matches.into_iter().rev() {
            buffer.replace_range(start..end, replacement);
        }
    }

    debug!("rewrite complete: {} identifiers", table.len());
    Ok(())
}

/// One left-to-right scan for boundary-safe occurrences of `original`.
fn collect_matches(
    buffer: &str,
    original: &str,
    language: Language,
    resolution: &Resolution,
    classifier: &dyn TokenClassifier,
) -> Vec<(usize, usize)> {
    let mut matches = Vec::new();

    for (start, _) in buffer.match_indices(original) {
        let end = start + original.len();

        if !boundary_before(buffer, start, language) || !boundary_after(buffer, end, language) {
            continue;
        }
        if classifier.classify(buffer, start).is_protected() {
            continue;
        }
        if language == Language::OCaml && is_reserved_qualified(buffer, start, resolution) {
            continue;
        }

        matches.push((start, end));
    }
    matches
}

fn is_boundary_char(c: char, language: Language) -> bool {
    c.is_whitespace() || language.delimiters().contains(c) || language.brackets().contains(c)
}

fn boundary_before(buffer: &str, start: usize, language: Language) -> bool {
    match buffer[..start].chars().next_back() {
        Some(c) => is_boundary_char(c, language),
        None => true,
    }
}

fn boundary_after(buffer: &str, end: usize, language: Language) -> bool {
    match buffer[end..].chars().next() {
        Some(c) => is_boundary_char(c, language),
        None => true,
    }
}

/// Whether the occurrence at `start` is the member of a `Module.name`
/// qualified reference whose module belongs to the standard library.
fn is_reserved_qualified(buffer: &str, start: usize, resolution: &Resolution) -> bool {
    let before = &buffer[..start];
    let Some('.') = before.chars().next_back() else {
        return false;
    };

    let module_end = before.len() - 1;
    let module_start = buffer[..module_end]
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i);

    match module_start {
        Some(s) if s < module_end => resolution
            .stdlib_modules
            .contains(&buffer[s..module_end]),
        _ => false,
    }
}
