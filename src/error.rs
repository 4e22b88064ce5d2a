//! Error types for the source anonymizer.

use crate::models::Language;
use thiserror::Error;

/// Main error type for the anonymizer.
///
/// Only conditions tied to the primary input are errors; failures on
/// auxiliary files (headers, stdlib modules) are downgraded to
/// [`RunWarning`](crate::models::RunWarning)s and never abort a run.
#[derive(Error, Debug)]
pub enum AnonymizerError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("malformed rename table: {0}")]
    MalformedRenameTable(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnonymizerError {
    /// Convenience constructor for language errors from a parsed language.
    pub fn unsupported(language: Language) -> Self {
        AnonymizerError::UnsupportedLanguage(language.to_string())
    }
}

/// Result type alias for anonymizer operations.
pub type Result<T> = std::result::Result<T, AnonymizerError>;
