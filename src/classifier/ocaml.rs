//! Heuristic token classifier for OCaml.

use super::{
    is_numeric_literal, is_word_char, preceding_word, word_run_at, Region, RegionCache,
    TokenClassifier,
};
use crate::models::LexicalCategory;

/// Keywords that terminate a backwards walk over a binding head.
const HEAD_BREAKERS: &[&str] = &[
    "in", "if", "then", "else", "match", "with", "begin", "end", "while", "do", "done", "for",
    "type", "module", "open", "struct", "sig", "function",
];

/// Scan-based classifier for OCaml source.
///
/// Indexes nested `(* *)` comments and string literals in one pass.
/// Identifier kinds come from declaration context: names after `type` or
/// `module` are type-like, names inside a `let`/`and`/`fun` binding head are
/// functions or parameters, capitalized names are treated as type-level
/// (constructors, module references). Everything else is unclassified.
#[derive(Debug, Default)]
pub struct OCamlClassifier {
    regions: RegionCache,
}

impl OCamlClassifier {
    pub fn new() -> Self {
        Self {
            regions: RegionCache::new(),
        }
    }
}

impl TokenClassifier for OCamlClassifier {
    fn classify(&self, buffer: &str, offset: usize) -> LexicalCategory {
        if offset >= buffer.len() {
            return LexicalCategory::Other;
        }

        if let Some(category) = self.regions.lookup(buffer, offset, scan_regions) {
            return category;
        }

        let Some((start, end)) = word_run_at(buffer, offset) else {
            return LexicalCategory::Other;
        };
        let token = &buffer[start..end];

        if is_numeric_literal(token) {
            return LexicalCategory::NumericLiteral;
        }

        match preceding_word(buffer, start) {
            Some("type") | Some("module") => return LexicalCategory::IdentifierType,
            Some("rec") => return LexicalCategory::IdentifierFunction,
            _ => {}
        }

        if let Some(depth) = binding_head_depth(buffer, start) {
            return if depth == 0 {
                LexicalCategory::IdentifierFunction
            } else {
                LexicalCategory::IdentifierVariable
            };
        }

        if token.chars().next().is_some_and(|c| c.is_uppercase()) {
            return LexicalCategory::IdentifierType;
        }

        LexicalCategory::Other
    }
}

/// Walk backwards from `start` over whitespace-separated word tokens.
///
/// Returns `Some(n)` when the walk reaches `let`/`and`/`fun` having crossed
/// `n` intervening words (so the token at `start` is the bound name when
/// `n == 0`, a parameter otherwise). Returns `None` when any other
/// character or keyword intervenes, meaning `start` is not in a binding
/// head.
fn binding_head_depth(buffer: &str, start: usize) -> Option<usize> {
    let mut pos = start;
    let mut crossed = 0usize;

    loop {
        let before = buffer[..pos].trim_end();
        if before.len() < pos {
            pos = before.len();
        }
        if pos == 0 {
            return None;
        }

        let last = before.chars().last()?;
        if !is_word_char(last) {
            return None;
        }

        let word_start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_word_char(*c))
            .last()
            .map(|(i, _)| i)?;
        let word = &before[word_start..pos];

        match word {
            "let" | "and" | "fun" => return Some(crossed),
            "rec" => {}
            w if HEAD_BREAKERS.contains(&w) => return None,
            _ => crossed += 1,
        }
        pos = word_start;
    }
}

/// One-pass scan producing sorted comment/string regions.
///
/// OCaml comments nest; a char literal is only recognized when a closing
/// quote is present, so type variables (`'a`) and primed names are left
/// alone.
fn scan_regions(buffer: &str) -> Vec<Region> {
    let bytes = buffer.as_bytes();
    let mut regions = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'(' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
            let start = i;
            let mut depth = 1;
            i += 2;
            while i < bytes.len() && depth > 0 {
                if bytes[i] == b'(' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
                    depth += 1;
                    i += 2;
                } else if bytes[i] == b'*' && i + 1 < bytes.len() && bytes[i + 1] == b')' {
                    depth -= 1;
                    i += 2;
                } else {
                    i += 1;
                }
            }
            regions.push(Region {
                start,
                end: i,
                category: LexicalCategory::Comment,
            });
        } else if bytes[i] == b'"' {
            let start = i;
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            regions.push(Region {
                start,
                end: i,
                category: LexicalCategory::StringLiteral,
            });
        } else if bytes[i] == b'\'' {
            // Char literal: 'x' or an escape like '\n'; otherwise a type
            // variable or prime, which is not a region.
            let lit_end = if i + 2 < bytes.len() && bytes[i + 1] == b'\\' {
                let mut j = i + 2;
                while j < bytes.len() && bytes[j] != b'\'' && j - i <= 4 {
                    j += 1;
                }
                (j < bytes.len() && bytes[j] == b'\'').then_some(j + 1)
            } else if i + 2 < bytes.len() && bytes[i + 2] == b'\'' {
                Some(i + 3)
            } else {
                None
            };

            if let Some(end) = lit_end {
                regions.push(Region {
                    start: i,
                    end,
                    category: LexicalCategory::StringLiteral,
                });
                i = end;
            } else {
                i += 1;
            }
        } else {
            i += 1;
        }
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_at(src: &str, needle: &str) -> LexicalCategory {
        let classifier = OCamlClassifier::new();
        let offset = src.find(needle).unwrap();
        classifier.classify(src, offset)
    }

    #[test]
    fn test_nested_comment_region() {
        let src = "(* outer (* inner *) still *) let x = 1";
        assert_eq!(classify_at(src, "inner"), LexicalCategory::Comment);
        assert_eq!(classify_at(src, "still"), LexicalCategory::Comment);
        assert_eq!(classify_at(src, "x"), LexicalCategory::IdentifierFunction);
    }

    #[test]
    fn test_string_region() {
        let src = "let msg = \"count is high\"";
        assert_eq!(classify_at(src, "high"), LexicalCategory::StringLiteral);
    }

    #[test]
    fn test_let_binding_kinds() {
        let src = "let rec walk tree acc = acc";
        assert_eq!(classify_at(src, "walk"), LexicalCategory::IdentifierFunction);
        assert_eq!(classify_at(src, "tree"), LexicalCategory::IdentifierVariable);
        assert_eq!(classify_at(src, "acc"), LexicalCategory::IdentifierVariable);
    }

    #[test]
    fn test_type_and_module_decls() {
        let src = "type shape = Circle\nmodule Geometry = struct end";
        assert_eq!(classify_at(src, "shape"), LexicalCategory::IdentifierType);
        assert_eq!(
            classify_at(src, "Geometry"),
            LexicalCategory::IdentifierType
        );
        assert_eq!(classify_at(src, "Circle"), LexicalCategory::IdentifierType);
    }

    #[test]
    fn test_type_keyword_in_string_not_type_decl() {
        let src = "let s = \"type shape = circle\"";
        assert_eq!(classify_at(src, "shape"), LexicalCategory::StringLiteral);
    }

    #[test]
    fn test_char_literal_vs_type_variable() {
        let src = "let c = 'x' in fun (a : 'a) -> a";
        let lit = src.find("'x'").unwrap() + 1;
        let classifier = OCamlClassifier::new();
        assert_eq!(
            classifier.classify(src, lit),
            LexicalCategory::StringLiteral
        );
        // 'a is a type variable, not a char literal region.
        let tv = src.find("'a)").unwrap() + 1;
        assert_ne!(
            classifier.classify(src, tv),
            LexicalCategory::StringLiteral
        );
    }

    #[test]
    fn test_usage_is_unclassified() {
        let src = "let total = count + offset";
        assert_eq!(classify_at(src, "count"), LexicalCategory::Other);
    }
}
