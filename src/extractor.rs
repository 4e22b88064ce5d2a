//! Identifier extraction.
//!
//! Finds the distinct set of renamable identifiers in a buffer. Candidate
//! boundaries come from a delimiter-based tokenizer (approximate,
//! language-agnostic); what kind of word each candidate is comes from the
//! [`TokenClassifier`]. The two questions are kept separate on purpose.

use crate::classifier::{is_numeric_literal, TokenClassifier};
use crate::models::{Language, LexicalCategory};
use crate::resolver::Resolution;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

fn record_type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"type\s+(?:[a-z'(),\s]*?\s)?([a-z_][A-Za-z0-9_']*)\s*=\s*\{([^}]*)\}")
            .unwrap()
    })
}

fn record_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z_][A-Za-z0-9_']*)\s*:").unwrap())
}

fn module_decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"module\s+([A-Z][A-Za-z0-9_']*)\s*=").unwrap())
}

/// Extract the ordered, deduplicated set of renamable identifiers.
pub fn extract(
    buffer: &str,
    language: Language,
    resolution: &Resolution,
    classifier: &dyn TokenClassifier,
) -> Vec<String> {
    let mut identifiers = Vec::new();
    let mut seen = HashSet::new();

    let push = |candidate: &str, identifiers: &mut Vec<String>, seen: &mut HashSet<String>| {
        if candidate.is_empty() {
            return;
        }
        // C and OCaml identifiers cannot start with a digit; anything that
        // does is a numeric fragment the shape patterns may miss (`1e`).
        if candidate.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return;
        }
        if is_numeric_literal(candidate) || resolution.is_reserved(candidate) {
            return;
        }
        if seen.insert(candidate.to_string()) {
            identifiers.push(candidate.to_string());
        }
    };

    for (start, run) in candidate_runs(buffer, language) {
        let category = classifier.classify(buffer, start);
        let eligible = match language {
            // Permissive default: an unclassified run still counts, a
            // deliberate choice favoring recall over precision.
            Language::C => category.is_identifier() || category == LexicalCategory::Other,
            Language::OCaml => category.is_identifier(),
        };
        if !eligible {
            continue;
        }

        // Split on brackets so array-indexed expressions separate into
        // their component tokens.
        for token in run.split(['[', ']']) {
            push(token, &mut identifiers, &mut seen);
        }
    }

    if language == Language::OCaml {
        collect_record_fields(buffer, classifier, |name| {
            push(name, &mut identifiers, &mut seen)
        });
        collect_module_names(buffer, classifier, |name| {
            push(name, &mut identifiers, &mut seen)
        });
    }

    debug!("extracted {} candidate identifiers", identifiers.len());
    identifiers
}

/// Maximal runs of characters outside the language's delimiter set.
fn candidate_runs(buffer: &str, language: Language) -> Vec<(usize, &str)> {
    let delimiters = language.delimiters();
    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, c) in buffer.char_indices() {
        let is_delimiter = c.is_whitespace() || delimiters.contains(c);
        match (run_start, is_delimiter) {
            (None, false) => run_start = Some(i),
            (Some(start), true) => {
                runs.push((start, &buffer[start..i]));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        runs.push((start, &buffer[start..]));
    }
    runs
}

/// Collect field names of `type name = { f1 : …; f2 : … }` declarations.
///
/// The declared type name must itself classify as type-like; this guards
/// against matching inside comments or strings that merely contain the
/// keyword.
fn collect_record_fields(
    buffer: &str,
    classifier: &dyn TokenClassifier,
    mut sink: impl FnMut(&str),
) {
    for caps in record_type_re().captures_iter(buffer) {
        let (Some(name), Some(body)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if classifier.classify(buffer, name.start()) != LexicalCategory::IdentifierType {
            continue;
        }
        for field in record_field_re().captures_iter(body.as_str()) {
            if let Some(field_name) = field.get(1) {
                sink(field_name.as_str());
            }
        }
    }
}

/// Collect names of `module Name = …` declarations, with the same
/// type-like guard as record declarations.
fn collect_module_names(
    buffer: &str,
    classifier: &dyn TokenClassifier,
    mut sink: impl FnMut(&str),
) {
    for caps in module_decl_re().captures_iter(buffer) {
        let Some(name) = caps.get(1) else { continue };
        if classifier.classify(buffer, name.start()) != LexicalCategory::IdentifierType {
            continue;
        }
        sink(name.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classifier_for;
    use crate::config::Config;
    use crate::resolver;

    fn extract_c(src: &str) -> Vec<String> {
        let config = Config {
            c: crate::config::CConfig {
                include_dirs: Vec::new(),
                ..Default::default()
            },
            ..Config::default()
        };
        let resolution = resolver::resolve(src, None, Language::C, &config);
        let classifier = classifier_for(Language::C).unwrap();
        extract(src, Language::C, &resolution, classifier.as_ref())
    }

    fn extract_ocaml(src: &str) -> Vec<String> {
        let config = Config::builder()
            .stdlib_dir("/nonexistent/ocaml/stdlib")
            .build();
        let resolution = resolver::resolve(src, None, Language::OCaml, &config);
        let classifier = classifier_for(Language::OCaml).unwrap();
        extract(src, Language::OCaml, &resolution, classifier.as_ref())
    }

    #[test]
    fn test_c_basic_extraction() {
        let idents = extract_c("int foo2 = foo + 1;\n");
        assert!(idents.contains(&"foo".to_string()));
        assert!(idents.contains(&"foo2".to_string()));
        assert!(!idents.contains(&"int".to_string()));
        assert!(!idents.contains(&"1".to_string()));
    }

    #[test]
    fn test_c_reserved_and_builtin_excluded() {
        let idents = extract_c("size_t len = strlen_local(buf);\n");
        assert!(!idents.contains(&"size_t".to_string()));
        assert!(idents.contains(&"len".to_string()));
        assert!(idents.contains(&"buf".to_string()));
    }

    #[test]
    fn test_c_string_contents_excluded() {
        let idents = extract_c("printf(\"total is %d\", total);\n");
        assert!(idents.contains(&"total".to_string()));
        assert!(!idents.contains(&"is".to_string()));
        // printf comes back only when the standard headers are resolvable;
        // with an empty search path it is a plain candidate.
        assert!(idents.contains(&"printf".to_string()));
    }

    #[test]
    fn test_c_bracket_splitting() {
        let idents = extract_c("values[cursor] = values[cursor + 1];\n");
        assert!(idents.contains(&"values".to_string()));
        assert!(idents.contains(&"cursor".to_string()));
        assert!(!idents.iter().any(|i| i.contains('[')));
    }

    #[test]
    fn test_c_numeric_shapes_excluded() {
        let idents = extract_c("double x = 0xFF + 1e9 + 2.5;\n");
        assert_eq!(idents, vec!["x".to_string()]);
    }

    #[test]
    fn test_c_deduplication_preserves_first_occurrence_order() {
        let idents = extract_c("int alpha; int beta; alpha = beta;\n");
        assert_eq!(idents, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn test_ocaml_let_bindings() {
        let idents = extract_ocaml("let rec walk tree acc = walk tree acc\n");
        assert!(idents.contains(&"walk".to_string()));
        assert!(idents.contains(&"tree".to_string()));
        assert!(idents.contains(&"acc".to_string()));
        assert!(!idents.contains(&"let".to_string()));
        assert!(!idents.contains(&"rec".to_string()));
    }

    #[test]
    fn test_ocaml_record_fields() {
        let idents = extract_ocaml("type circle = { radius : float; center : float }\n");
        assert!(idents.contains(&"circle".to_string()));
        assert!(idents.contains(&"radius".to_string()));
        assert!(idents.contains(&"center".to_string()));
    }

    #[test]
    fn test_ocaml_record_keyword_in_string_ignored() {
        let idents = extract_ocaml("let s = \"type fake = { field : int }\"\n");
        assert!(!idents.contains(&"field".to_string()));
        assert!(!idents.contains(&"fake".to_string()));
    }

    #[test]
    fn test_ocaml_module_declaration() {
        let idents = extract_ocaml("module Geometry = struct let area r = r end\n");
        assert!(idents.contains(&"Geometry".to_string()));
        assert!(idents.contains(&"area".to_string()));
    }

    #[test]
    fn test_empty_extraction() {
        let idents = extract_c("int main(void) { return 0; }\n");
        assert!(idents.is_empty());
    }
}
