//! src_anonymizer - Source Code Anonymization Engine
//!
//! Anonymizes C and OCaml source files for sharing in bug reports or
//! datasets: comments are stripped and every user-defined identifier is
//! rewritten to a sequential meaningless name, while keywords, library
//! symbols, string contents, and numeric literals are left untouched.
//!
//! # Features
//!
//! - **Reserved symbol resolution**: walks the `#include` graph (C) or
//!   scans the standard library (OCaml) so externally defined names are
//!   never renamed
//! - **Token-safe rewriting**: word-boundary matching that never touches
//!   substrings, string literals, comments, or qualified stdlib references
//! - **Reversible mapping**: every run produces a bidirectional rename
//!   table for mapping diagnostics back to original names
//! - **Best-effort formatting**: comment stripping and re-indentation of
//!   the anonymized output
//!
//! # Architecture
//!
//! A single-threaded, synchronous pipeline per file:
//! strip -> resolve reserved symbols -> extract identifiers -> assign
//! replacements -> rewrite -> re-indent. The only process-wide state is a
//! pair of lazily-built standard-library symbol caches shared read-only
//! across runs.
//!
//! # Example Usage
//!
//! ```no_run
//! use src_anonymizer::{Anonymizer, Config, Language};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let anonymizer = Anonymizer::new(Config::default());
//!     let result = anonymizer.anonymize("int counter = 0;", Language::C)?;
//!     println!("{}", result.code);
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod format;
pub mod mapper;
pub mod models;
pub mod resolver;
pub mod rewriter;
pub mod strip;

// Re-export commonly used types
pub use config::Config;
pub use error::{AnonymizerError, Result};
pub use models::{AnonymizedSource, Language, LexicalCategory, RenameTable, RunStats, RunWarning};

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Main engine orchestrating the anonymization pipeline.
pub struct Anonymizer {
    /// Configuration
    config: Config,
}

impl Anonymizer {
    /// Create a new anonymizer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Anonymize an in-memory source buffer.
    pub fn anonymize(&self, source: &str, language: Language) -> Result<AnonymizedSource> {
        self.run(source, None, language)
    }

    /// Anonymize a file on disk.
    ///
    /// The language is detected from the extension; quoted `#include`
    /// directives resolve relative to the file's directory.
    pub fn anonymize_file(&self, path: &Path) -> Result<AnonymizedSource> {
        let language = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Language::from_extension)
            .ok_or_else(|| {
                AnonymizerError::UnsupportedLanguage(path.display().to_string())
            })?;
        let source = std::fs::read_to_string(path)?;
        self.run(&source, Some(path), language)
    }

    fn run(
        &self,
        source: &str,
        source_path: Option<&Path>,
        language: Language,
    ) -> Result<AnonymizedSource> {
        let start_time = Instant::now();
        info!("anonymizing {} source ({} bytes)", language, source.len());

        let mut code = source.to_string();
        if self.config.output.strip_comments {
            code = strip::strip_comments(&code, language);
        }
        if self.config.output.strip_blank_lines {
            code = strip::strip_blank_lines(&code);
        }

        let classifier = classifier::classifier_for(language)?;
        let resolution = resolver::resolve(&code, source_path, language, &self.config);
        for warning in &resolution.warnings {
            warn!("{}", warning);
        }

        let identifiers =
            extractor::extract(&code, language, &resolution, classifier.as_ref());

        let mut warnings = resolution.warnings.clone();
        let table = if identifiers.is_empty() {
            // Nothing to rename: the buffer passes through the mapping and
            // rewrite stages unchanged.
            warn!("{}", RunWarning::EmptyIdentifierSet);
            warnings.push(RunWarning::EmptyIdentifierSet);
            RenameTable::new()
        } else {
            let table = mapper::assign(&identifiers, language)?;
            rewriter::rewrite(&mut code, &table, language, &resolution, classifier.as_ref())?;
            table
        };

        if self.config.output.reindent {
            code = format::reindent(&code, language);
        }

        let stats = RunStats {
            identifiers_renamed: table.len(),
            reserved_names: resolution.reserved.len(),
            auxiliary_files_visited: resolution.files_visited,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };
        debug!(
            "renamed {} identifiers in {}ms",
            stats.identifiers_renamed, stats.duration_ms
        );

        Ok(AnonymizedSource {
            code,
            table,
            language,
            warnings,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn test_config() -> Config {
        // Empty search paths: runs never depend on the host's headers or
        // OCaml installation.
        Config {
            c: config::CConfig {
                include_dirs: Vec::new(),
                ..Default::default()
            },
            ocaml: config::OCamlConfig {
                stdlib_dir: std::path::PathBuf::from("/nonexistent/ocaml/stdlib"),
                ..Default::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_c_pipeline() {
        let anonymizer = Anonymizer::new(test_config());
        let src = "// running total\nint total = 0;\nint total2 = total + 1;\n";
        let result = anonymizer.anonymize(src, Language::C).unwrap();

        assert!(!result.code.contains("total"));
        assert!(!result.code.contains("running"));
        assert!(result.code.contains("int"));

        let total = result.table.replacement_for("total").unwrap();
        let total2 = result.table.replacement_for("total2").unwrap();
        assert_ne!(total, total2);
        assert_eq!(result.stats.identifiers_renamed, 2);
    }

    #[test]
    fn test_string_contents_survive() {
        let anonymizer = Anonymizer::new(test_config());
        let src = "void report(int foo) { printf(\"foo is %d\", foo); }\n";
        let result = anonymizer.anonymize(src, Language::C).unwrap();

        assert!(result.code.contains("\"foo is %d\""));
        let foo = result.table.replacement_for("foo").unwrap();
        assert!(result.code.contains(&format!(", {})", foo)));
    }

    #[test]
    fn test_builtin_type_name_not_renamed() {
        let anonymizer = Anonymizer::new(test_config());
        let src = "size_t size_t_count = 0;\n";
        let result = anonymizer.anonymize(src, Language::C).unwrap();

        assert!(result.code.contains("size_t "));
        assert!(result.table.replacement_for("size_t").is_none());
        assert!(result.table.replacement_for("size_t_count").is_some());
    }

    #[test]
    fn test_empty_extraction_passes_buffer_through() {
        let config = Config::builder()
            .include_dirs(Vec::new())
            .strip_comments(false)
            .strip_blank_lines(false)
            .reindent(false)
            .build();
        let anonymizer = Anonymizer::new(config);
        let src = "int main(void) { return 0; }\n";
        let result = anonymizer.anonymize(src, Language::C).unwrap();

        assert_eq!(result.code, src);
        assert!(result.warnings.contains(&RunWarning::EmptyIdentifierSet));
        assert!(result.table.is_empty());
    }

    #[test]
    fn test_round_trip_stability() {
        let anonymizer = Anonymizer::new(test_config());
        let src = "int apples = 1;\nint oranges = apples + 2;\n";
        let result = anonymizer.anonymize(src, Language::C).unwrap();

        // The original names are gone from the output.
        let classifier = classifier::classifier_for(Language::C).unwrap();
        let resolution =
            resolver::resolve(&result.code, None, Language::C, &test_config());
        let again = extractor::extract(
            &result.code,
            Language::C,
            &resolution,
            classifier.as_ref(),
        );
        assert!(!again.contains(&"apples".to_string()));
        assert!(!again.contains(&"oranges".to_string()));

        // Rewriting again with the fixed table changes nothing.
        let mut code = result.code.clone();
        rewriter::rewrite(
            &mut code,
            &result.table,
            Language::C,
            &resolution,
            classifier.as_ref(),
        )
        .unwrap();
        assert_eq!(code, result.code);
    }

    #[test]
    fn test_replacements_unique_across_run() {
        let anonymizer = Anonymizer::new(test_config());
        let src = "int a1c = 1; int b2c = 2; int c3c = a1c + b2c;\n";
        let result = anonymizer.anonymize(src, Language::C).unwrap();

        let replacements: Vec<&str> =
            result.table.entries().map(|(_, r)| r).collect();
        let unique: HashSet<&str> = replacements.iter().copied().collect();
        assert_eq!(replacements.len(), unique.len());
        assert_eq!(replacements.len(), 3);
    }

    #[test]
    fn test_ocaml_pipeline() {
        let anonymizer = Anonymizer::new(test_config());
        let src = "(* tree walker *)\nlet rec walk tree = walk tree\n";
        let result = anonymizer.anonymize(src, Language::OCaml).unwrap();

        assert!(!result.code.contains("walk"));
        assert!(!result.code.contains("tree walker"));
        assert!(result.code.contains("let rec"));

        let walk = result.table.replacement_for("walk").unwrap();
        assert!(walk.starts_with('a'));
    }

    #[test]
    fn test_missing_stdlib_reported_not_fatal() {
        let anonymizer = Anonymizer::new(test_config());
        let result = anonymizer
            .anonymize("let x = 1\n", Language::OCaml)
            .unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, RunWarning::MissingAuxiliaryFile { .. })));
        assert!(result.table.replacement_for("x").is_some());
    }

    #[test]
    fn test_unreadable_file_is_fatal() {
        let anonymizer = Anonymizer::new(test_config());
        let err = anonymizer
            .anonymize_file(Path::new("/nonexistent/input.c"))
            .unwrap_err();
        assert!(matches!(err, AnonymizerError::Io(_)));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let anonymizer = Anonymizer::new(test_config());
        let err = anonymizer
            .anonymize_file(Path::new("/tmp/input.xyz"))
            .unwrap_err();
        assert!(matches!(err, AnonymizerError::UnsupportedLanguage(_)));
    }
}
