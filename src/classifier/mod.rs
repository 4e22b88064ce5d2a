//! Token classification for source buffers.
//!
//! The core never decides on its own what kind of token lives at a given
//! offset; it asks a [`TokenClassifier`]. The implementations shipped here
//! are heuristic scanners (no full parse): they index comment and string
//! regions in one pass and answer identifier-kind queries from local
//! context. Any other implementation honoring the same point-offset query
//! contract can be substituted.

mod c;
mod ocaml;

pub use c::CClassifier;
pub use ocaml::OCamlClassifier;

use crate::error::{AnonymizerError, Result};
use crate::models::{Language, LexicalCategory};
use regex::Regex;
use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// Reports the lexical category of the token at a byte offset.
pub trait TokenClassifier {
    /// Classify the token covering `offset` in `buffer`.
    ///
    /// Returns [`LexicalCategory::Other`] when no classification applies.
    fn classify(&self, buffer: &str, offset: usize) -> LexicalCategory;
}

/// Create the classifier registered for a language.
pub fn classifier_for(language: Language) -> Result<Box<dyn TokenClassifier>> {
    match language {
        Language::C => Ok(Box::new(CClassifier::new())),
        Language::OCaml => Ok(Box::new(OCamlClassifier::new())),
        #[allow(unreachable_patterns)]
        _ => Err(AnonymizerError::unsupported(language)),
    }
}

/// A contiguous byte span with a fixed lexical category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Region {
    pub start: usize,
    pub end: usize,
    pub category: LexicalCategory,
}

/// Sorted, non-overlapping comment/string regions for one buffer state.
///
/// Rewrites mutate the buffer between queries, so the index is keyed by a
/// fingerprint and rebuilt whenever the buffer changes.
#[derive(Debug, Default)]
pub(crate) struct RegionCache {
    cached: RefCell<Option<(u64, Vec<Region>)>>,
}

impl RegionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the region covering `offset`, rebuilding the index via
    /// `scan` if the buffer changed since the last query.
    pub fn lookup(
        &self,
        buffer: &str,
        offset: usize,
        scan: impl FnOnce(&str) -> Vec<Region>,
    ) -> Option<LexicalCategory> {
        let fp = fingerprint(buffer);
        let mut cached = self.cached.borrow_mut();

        let rebuild = match cached.as_ref() {
            Some((stored, _)) => *stored != fp,
            None => true,
        };
        if rebuild {
            *cached = Some((fp, scan(buffer)));
        }

        let (_, regions) = cached.as_ref()?;
        let idx = regions.partition_point(|r| r.end <= offset);
        regions
            .get(idx)
            .filter(|r| r.start <= offset && offset < r.end)
            .map(|r| r.category)
    }
}

fn fingerprint(buffer: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    buffer.len().hash(&mut hasher);
    buffer.hash(&mut hasher);
    hasher.finish()
}

/// Whether `c` can be part of an identifier/word run.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `token` matches a numeric-literal shape: hex, decimal, or
/// scientific notation. A known-imperfect heuristic (hexadecimal floats are
/// not recognized); kept in one place so the rule can be refined.
pub fn is_numeric_literal(token: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(0[xX][0-9a-fA-F]+[uUlL]*|[0-9]+[uUlLfF]*|[0-9]*\.[0-9]+([eE][+-]?[0-9]+)?[fFlL]?|[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?[fFlL]?|[0-9]+[eE][+-]?[0-9]+[fFlL]?)$")
            .unwrap()
    });
    !token.is_empty() && re.is_match(token)
}

/// Extent of the word run covering `offset`, if the byte at `offset`
/// starts or continues a run of word characters.
pub(crate) fn word_run_at(buffer: &str, offset: usize) -> Option<(usize, usize)> {
    if !buffer.is_char_boundary(offset) {
        return None;
    }
    let c = buffer[offset..].chars().next()?;
    if !is_word_char(c) {
        return None;
    }

    let start = buffer[..offset]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(offset);
    let end = buffer[offset..]
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map(|(i, _)| offset + i)
        .unwrap_or(buffer.len());

    Some((start, end))
}

/// The last word token strictly before `offset`, skipping whitespace.
pub(crate) fn preceding_word(buffer: &str, offset: usize) -> Option<&str> {
    let before = buffer[..offset].trim_end();
    let end = before.len();
    if end == 0 {
        return None;
    }
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(i, _)| i)?;
    if start == end {
        return None;
    }
    Some(&before[start..end])
}

/// First non-whitespace character at or after `offset`.
pub(crate) fn following_char(buffer: &str, offset: usize) -> Option<char> {
    buffer[offset..].chars().find(|c| !c.is_whitespace())
}
