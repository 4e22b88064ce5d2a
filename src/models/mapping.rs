//! Rename table and anonymization result models.

use super::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Bidirectional mapping between original and replacement identifiers.
///
/// Built once by the [`mapper`](crate::mapper), read-only afterward. The
/// reverse direction lets callers map diagnostics produced on anonymized
/// output back to the original names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameTable {
    /// Original -> replacement
    forward: HashMap<String, String>,

    /// Replacement -> original
    reverse: HashMap<String, String>,

    /// Originals in assignment order (drives the rewrite pass)
    order: Vec<String>,
}

impl RenameTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an assignment. Returns false if the original already has an
    /// entry or the replacement is already taken.
    pub fn insert(&mut self, original: &str, replacement: &str) -> bool {
        if self.forward.contains_key(original) || self.reverse.contains_key(replacement) {
            return false;
        }
        self.forward
            .insert(original.to_string(), replacement.to_string());
        self.reverse
            .insert(replacement.to_string(), original.to_string());
        self.order.push(original.to_string());
        true
    }

    /// Look up the replacement for an original identifier.
    pub fn replacement_for(&self, original: &str) -> Option<&str> {
        self.forward.get(original).map(|s| s.as_str())
    }

    /// Look up the original identifier behind a replacement.
    pub fn original_for(&self, replacement: &str) -> Option<&str> {
        self.reverse.get(replacement).map(|s| s.as_str())
    }

    /// Iterate (original, replacement) pairs in assignment order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|orig| self.forward.get(orig).map(|rep| (orig.as_str(), rep.as_str())))
    }

    /// Number of assigned identifiers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Restore original names inside a free-form message (e.g. a compiler
    /// diagnostic produced on the anonymized file).
    pub fn restore_message(&self, message: &str) -> String {
        let mut result = message.to_string();
        for (replacement, original) in &self.reverse {
            result = result.replace(replacement, original);
        }
        result
    }
}

/// Non-fatal conditions recorded during a run.
///
/// These never abort the primary run; the output is emitted anyway, possibly
/// less thoroughly anonymized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    /// An `#include` target could not be resolved against the search paths.
    UnresolvedInclude { path: String },

    /// An auxiliary file (header, stdlib module) could not be read.
    MissingAuxiliaryFile { path: PathBuf },

    /// Extraction found no renamable identifiers; buffer passed through.
    EmptyIdentifierSet,
}

impl std::fmt::Display for RunWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunWarning::UnresolvedInclude { path } => {
                write!(f, "unresolved include: {}", path)
            }
            RunWarning::MissingAuxiliaryFile { path } => {
                write!(f, "missing auxiliary file: {}", path.display())
            }
            RunWarning::EmptyIdentifierSet => {
                write!(f, "no renamable identifiers found; output unchanged")
            }
        }
    }
}

/// Statistics for a single anonymization run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Distinct identifiers renamed
    pub identifiers_renamed: usize,

    /// Reserved names excluded from renaming
    pub reserved_names: usize,

    /// Header/module files visited while building the reserved set
    pub auxiliary_files_visited: usize,

    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

/// Result of anonymizing one source buffer.
#[derive(Debug, Clone)]
pub struct AnonymizedSource {
    /// The anonymized source code.
    pub code: String,

    /// Mapping between original and replacement identifiers.
    pub table: RenameTable,

    /// Language of the source.
    pub language: Language,

    /// Recoverable conditions hit during the run.
    pub warnings: Vec<RunWarning>,

    /// Run statistics.
    pub stats: RunStats,
}

impl AnonymizedSource {
    /// Restore an identifier to its original form.
    pub fn restore_identifier(&self, replacement: &str) -> Option<&str> {
        self.table.original_for(replacement)
    }

    /// Whether the run completed without recoverable warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
