//! OCaml reserved symbol resolution: standard library scan.
//!
//! Unlike C, the reserved set is not per-file: it is computed once from the
//! fixed standard library location and shared across runs.

use super::Resolution;
use crate::config::OCamlConfig;
use crate::models::RunWarning;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, warn};

fn let_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*let\s+(?:rec\s+)?([a-z_][A-Za-z0-9_']*)").unwrap())
}

fn external_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*external\s+([a-z_][A-Za-z0-9_']*)").unwrap())
}

/// Index built from one scan of the standard library directory.
#[derive(Debug, Default, Clone)]
struct StdlibIndex {
    /// `let`-bound exports of every stdlib module
    reserved: HashSet<String>,

    /// `external` names of the pervasive module(s), implicitly opened
    pervasives: HashSet<String>,

    /// Module names (capitalized file stems), for `Module.name` lookups
    modules: HashSet<String>,

    /// `.ml` files read
    files_visited: usize,
}

/// Scan a standard library directory. Pure; the cached entry point is
/// [`stdlib_index`].
fn scan_stdlib(config: &OCamlConfig) -> StdlibIndex {
    let mut index = StdlibIndex::default();

    let entries = match std::fs::read_dir(&config.stdlib_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                "could not read OCaml stdlib dir {}: {}",
                config.stdlib_dir.display(),
                e
            );
            return index;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("ml") {
            continue;
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!("skipping unreadable stdlib module {}: {}", path.display(), e);
                continue;
            }
        };
        index.files_visited += 1;

        for caps in let_re().captures_iter(&content) {
            index.reserved.insert(caps[1].to_string());
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if config.pervasives_modules.iter().any(|m| m == name) {
                for caps in external_re().captures_iter(&content) {
                    index.pervasives.insert(caps[1].to_string());
                }
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                index.modules.insert(capitalize(stem));
            }
        }
    }

    debug!(
        "OCaml stdlib cache built: {} reserved, {} pervasives, {} modules",
        index.reserved.len(),
        index.pervasives.len(),
        index.modules.len()
    );
    index
}

/// Cached stdlib index, computed once per configured location and shared
/// read-only across runs. Rebuilding would yield an identical index.
fn stdlib_index(config: &OCamlConfig) -> Arc<StdlibIndex> {
    static CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<StdlibIndex>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    let mut cache = cache.lock().unwrap();
    if let Some(index) = cache.get(&config.stdlib_dir) {
        return Arc::clone(index);
    }
    let index = Arc::new(scan_stdlib(config));
    cache.insert(config.stdlib_dir.clone(), Arc::clone(&index));
    index
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Build the OCaml reserved set from the standard library index.
pub(crate) fn resolve(config: &OCamlConfig) -> Resolution {
    let index = stdlib_index(config);

    let mut resolution = Resolution {
        reserved: index.reserved.clone(),
        pervasives: index.pervasives.clone(),
        stdlib_modules: index.modules.clone(),
        files_visited: index.files_visited,
        ..Resolution::default()
    };
    resolution.reserved.extend(index.modules.iter().cloned());

    if index.files_visited == 0 {
        resolution.warnings.push(RunWarning::MissingAuxiliaryFile {
            path: config.stdlib_dir.clone(),
        });
    }
    resolution
}
