//! Language and lexical category data models.

use serde::{Deserialize, Serialize};

/// Supported source languages.
///
/// Exactly one language is active per anonymization run; mixed-language
/// files are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    OCaml,
}

impl Language {
    /// Detect language from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "c" | "h" => Some(Language::C),
            "ml" | "mli" => Some(Language::OCaml),
            _ => None,
        }
    }

    /// Parse a language name as given on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "c" => Some(Language::C),
            "ocaml" | "ml" => Some(Language::OCaml),
            _ => None,
        }
    }

    /// Prefix used when generating replacement names.
    ///
    /// The two prefixes must never collide with each other: C identifiers
    /// become `_1`, `_2`, …, OCaml identifiers become `a1`, `a2`, ….
    pub fn rename_prefix(&self) -> &'static str {
        match self {
            Language::C => "_",
            Language::OCaml => "a",
        }
    }

    /// Characters that terminate a word run, in addition to whitespace.
    pub fn delimiters(&self) -> &'static str {
        match self {
            Language::C => "+-*/%=<>!&|^~?:;,.(){}'\"\\#",
            Language::OCaml => "+-*/=<>!&|^~?:;,.(){}'\"\\@",
        }
    }

    /// Bracket characters that also count as token boundaries.
    pub fn brackets(&self) -> &'static str {
        "[]"
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::C => write!(f, "C"),
            Language::OCaml => write!(f, "OCaml"),
        }
    }
}

/// Lexical category of a token at a given buffer offset.
///
/// Produced on demand by a [`TokenClassifier`](crate::classifier::TokenClassifier);
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalCategory {
    Comment,
    StringLiteral,
    IdentifierVariable,
    IdentifierFunction,
    IdentifierType,
    NumericLiteral,
    Other,
}

impl LexicalCategory {
    /// Whether this category names a user-level identifier.
    pub fn is_identifier(&self) -> bool {
        matches!(
            self,
            LexicalCategory::IdentifierVariable
                | LexicalCategory::IdentifierFunction
                | LexicalCategory::IdentifierType
        )
    }

    /// Whether tokens of this category are opaque to rewriting.
    pub fn is_protected(&self) -> bool {
        matches!(self, LexicalCategory::Comment | LexicalCategory::StringLiteral)
    }
}
