//! Reserved symbol resolution.
//!
//! Computes, per language and per file, the set of names that must never be
//! renamed: language keywords, fixed builtins, and symbols defined outside
//! the file under analysis (included headers for C, the standard library for
//! OCaml). Auxiliary-file failures are recorded as warnings and never abort
//! the run; the set is simply smaller.

mod c;
mod ocaml;

use crate::config::Config;
use crate::models::{Language, RunWarning};
use std::collections::HashSet;
use std::path::Path;

/// Output of reserved symbol resolution for one run.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Names excluded from renaming. Grows monotonically while the
    /// include/module graph is traversed; immutable afterward.
    pub reserved: HashSet<String>,

    /// Implicitly-opened names (OCaml pervasives); empty for C.
    pub pervasives: HashSet<String>,

    /// Standard-library module names, used to suppress rewriting of
    /// `Module.name` qualified references (OCaml); empty for C.
    pub stdlib_modules: HashSet<String>,

    /// Recoverable conditions hit during resolution.
    pub warnings: Vec<RunWarning>,

    /// Header/module files visited.
    pub files_visited: usize,
}

impl Resolution {
    /// Whether a name must not be renamed.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name) || self.pervasives.contains(name)
    }
}

/// Compute the reserved symbol set for a source buffer.
///
/// `source_path` locates quoted includes relative to the file under
/// analysis; pass `None` when anonymizing an in-memory buffer.
pub fn resolve(
    source: &str,
    source_path: Option<&Path>,
    language: Language,
    config: &Config,
) -> Resolution {
    let mut resolution = match language {
        Language::C => c::resolve(source, source_path, &config.c),
        Language::OCaml => ocaml::resolve(&config.ocaml),
    };

    for kw in keywords(language) {
        resolution.reserved.insert((*kw).to_string());
    }
    resolution
}

/// Language keywords, always reserved.
pub fn keywords(language: Language) -> &'static [&'static str] {
    match language {
        Language::C => &[
            "auto", "break", "case", "char", "const", "continue", "default", "do", "double",
            "else", "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long",
            "register", "restrict", "return", "short", "signed", "sizeof", "static", "struct",
            "switch", "typedef", "union", "unsigned", "void", "volatile", "while",
            // Preprocessor directive words; '#' is a delimiter so these
            // surface as bare word runs.
            "include", "define", "undef", "ifdef", "ifndef", "endif", "elif", "pragma",
            "defined", "error", "warning",
        ],
        Language::OCaml => &[
            "and", "as", "assert", "begin", "class", "constraint", "do", "done", "downto",
            "else", "end", "exception", "external", "false", "for", "fun", "function",
            "functor", "if", "in", "include", "inherit", "initializer", "lazy", "let", "match",
            "method", "module", "mutable", "new", "nonrec", "object", "of", "open", "or",
            "private", "rec", "sig", "struct", "then", "to", "true", "try", "type", "val",
            "virtual", "when", "while", "with",
            // Pervasive type names, reserved like builtins.
            "int", "float", "bool", "string", "char", "unit", "list", "array", "option",
            "ref", "exn",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_reserved_for_both_languages() {
        let config = Config::default();

        let c = resolve("int main(void) { return 0; }", None, Language::C, &config);
        assert!(c.is_reserved("return"));
        assert!(c.is_reserved("include"));

        let ml = resolve("let x = 1", None, Language::OCaml, &config);
        assert!(ml.is_reserved("let"));
        assert!(ml.is_reserved("match"));
    }

    #[test]
    fn test_c_builtins_reserved() {
        let config = Config::default();
        let resolution = resolve("int x;", None, Language::C, &config);
        assert!(resolution.is_reserved("size_t"));
        assert!(resolution.is_reserved("main"));
        assert!(resolution.is_reserved("EXIT_SUCCESS"));
    }
}
