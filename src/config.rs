//! Configuration management for the anonymizer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the anonymizer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// C language settings
    #[serde(default)]
    pub c: CConfig,

    /// OCaml language settings
    #[serde(default)]
    pub ocaml: OCamlConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// C-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CConfig {
    /// Directories searched for angle-bracket includes
    #[serde(default = "default_include_dirs")]
    pub include_dirs: Vec<PathBuf>,

    /// Standard headers whose symbols are always reserved
    #[serde(default = "default_standard_headers")]
    pub standard_headers: Vec<String>,

    /// Names reserved even without an explicit include
    #[serde(default = "default_c_builtins")]
    pub builtins: Vec<String>,

    /// Maximum include recursion depth
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,
}

/// OCaml-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OCamlConfig {
    /// Directory containing the OCaml standard library sources
    #[serde(default = "default_ocaml_stdlib_dir")]
    pub stdlib_dir: PathBuf,

    /// Module files scanned for implicitly-opened (pervasive) names
    #[serde(default = "default_pervasives_modules")]
    pub pervasives_modules: Vec<String>,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Strip comments before anonymizing
    #[serde(default = "default_true")]
    pub strip_comments: bool,

    /// Remove blank lines left behind by stripping
    #[serde(default = "default_true")]
    pub strip_blank_lines: bool,

    /// Re-indent the anonymized output (best effort, C only)
    #[serde(default = "default_true")]
    pub reindent: bool,

    /// Suffix appended to output file stems in batch mode
    #[serde(default = "default_output_suffix")]
    pub suffix: String,
}

// Default value functions
fn default_include_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/include"),
        PathBuf::from("/usr/local/include"),
    ]
}

fn default_standard_headers() -> Vec<String> {
    ["stdlib.h", "stdio.h", "stddef.h", "string.h", "unistd.h"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_c_builtins() -> Vec<String> {
    // Names linkers recognize even without an explicit include.
    [
        "main",
        "EXIT_SUCCESS",
        "EXIT_FAILURE",
        "NULL",
        "size_t",
        "ssize_t",
        "ptrdiff_t",
        "wchar_t",
        "FILE",
        "stdin",
        "stdout",
        "stderr",
        "errno",
        "argc",
        "argv",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_include_depth() -> usize {
    32
}

fn default_ocaml_stdlib_dir() -> PathBuf {
    PathBuf::from("/usr/lib/ocaml")
}

fn default_pervasives_modules() -> Vec<String> {
    vec!["stdlib.ml".to_string(), "pervasives.ml".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_output_suffix() -> String {
    "_anon".to_string()
}

impl Default for CConfig {
    fn default() -> Self {
        Self {
            include_dirs: default_include_dirs(),
            standard_headers: default_standard_headers(),
            builtins: default_c_builtins(),
            max_include_depth: default_max_include_depth(),
        }
    }
}

impl Default for OCamlConfig {
    fn default() -> Self {
        Self {
            stdlib_dir: default_ocaml_stdlib_dir(),
            pervasives_modules: default_pervasives_modules(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            strip_comments: true,
            strip_blank_lines: true,
            reindent: true,
            suffix: default_output_suffix(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Create a configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for creating configurations programmatically.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.c.include_dirs.push(dir.into());
        self
    }

    pub fn include_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.config.c.include_dirs = dirs;
        self
    }

    pub fn stdlib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.ocaml.stdlib_dir = dir.into();
        self
    }

    pub fn strip_comments(mut self, enable: bool) -> Self {
        self.config.output.strip_comments = enable;
        self
    }

    pub fn strip_blank_lines(mut self, enable: bool) -> Self {
        self.config.output.strip_blank_lines = enable;
        self
    }

    pub fn reindent(mut self, enable: bool) -> Self {
        self.config.output.reindent = enable;
        self
    }

    pub fn output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.output.suffix = suffix.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.output.strip_comments);
        assert!(config.c.builtins.iter().any(|b| b == "size_t"));
        assert_eq!(config.c.standard_headers.len(), 5);
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .include_dir("/opt/include")
            .strip_comments(false)
            .output_suffix("_scrubbed")
            .build();

        assert!(!config.output.strip_comments);
        assert_eq!(config.output.suffix, "_scrubbed");
        assert!(config
            .c
            .include_dirs
            .iter()
            .any(|d| d == &PathBuf::from("/opt/include")));
    }

    #[test]
    fn test_from_toml() {
        let toml_src = r#"
            [output]
            strip_comments = false

            [ocaml]
            stdlib_dir = "/opt/ocaml/lib"
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert!(!config.output.strip_comments);
        assert!(config.output.reindent);
        assert_eq!(config.ocaml.stdlib_dir, PathBuf::from("/opt/ocaml/lib"));
    }
}
