//! C reserved symbol resolution: include-graph traversal and symbol
//! extraction from headers.

use super::Resolution;
use crate::config::CConfig;
use crate::models::RunWarning;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, warn};

fn include_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*#\s*include\s*(?:<([^>\n]+)>|"([^"\n]+)")"#).unwrap()
    })
}

fn extern_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*extern\s+[^;(){}=]*?[\s*]([A-Za-z_][A-Za-z0-9_]*)\s*[(\[;,]").unwrap()
    })
}

fn define_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*#\s*define\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap())
}

fn typedef_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*typedef\s+[^;{}]*[\s*]([A-Za-z_][A-Za-z0-9_]*)\s*;").unwrap()
    })
}

fn typedef_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Single-level bodies only; nested braces are a known gap of this
        // heuristic.
        Regex::new(r"typedef\s+(?:struct|union|enum)[^{;]*\{[^}]*\}\s*\**\s*([A-Za-z_][A-Za-z0-9_]*)\s*;")
            .unwrap()
    })
}

/// Symbols declared by the fixed standard headers.
///
/// Never depends on the file under analysis, so it is computed once per
/// process (per configured search path) and shared read-only across runs.
/// Rebuilding from scratch would yield an identical set.
fn standard_symbols(config: &CConfig) -> Arc<HashSet<String>> {
    static CACHE: OnceLock<Mutex<HashMap<String, Arc<HashSet<String>>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let key = format!("{:?}|{:?}", config.include_dirs, config.standard_headers);

    let mut cache = cache.lock().unwrap();
    if let Some(symbols) = cache.get(&key) {
        return Arc::clone(symbols);
    }

    let mut symbols = HashSet::new();
    for header in &config.standard_headers {
        match find_in_search_dirs(Path::new(header), &config.include_dirs) {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(content) => extract_symbols(&content, &mut symbols),
                Err(e) => warn!("could not read standard header {}: {}", path.display(), e),
            },
            None => warn!("standard header {} not found in search path", header),
        }
    }
    debug!("standard header cache built: {} symbols", symbols.len());

    let symbols = Arc::new(symbols);
    cache.insert(key, Arc::clone(&symbols));
    symbols
}

/// An `#include` directive as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
enum IncludeDirective {
    /// `#include <target>`, resolved against the search directories
    Angle(String),
    /// `#include "target"`, resolved relative to the including file first
    Quoted(String),
}

impl IncludeDirective {
    fn target(&self) -> &str {
        match self {
            IncludeDirective::Angle(t) | IncludeDirective::Quoted(t) => t,
        }
    }
}

fn parse_includes(source: &str) -> Vec<IncludeDirective> {
    include_re()
        .captures_iter(source)
        .filter_map(|caps| {
            if let Some(angle) = caps.get(1) {
                Some(IncludeDirective::Angle(angle.as_str().trim().to_string()))
            } else {
                caps.get(2)
                    .map(|q| IncludeDirective::Quoted(q.as_str().trim().to_string()))
            }
        })
        .collect()
}

/// Extract `extern` declarations, `#define` macro names, and `typedef`
/// names (leading pointer markers stripped) from a header.
fn extract_symbols(content: &str, out: &mut HashSet<String>) {
    for caps in extern_re().captures_iter(content) {
        out.insert(caps[1].to_string());
    }
    for caps in define_re().captures_iter(content) {
        out.insert(caps[1].to_string());
    }
    for caps in typedef_re().captures_iter(content) {
        out.insert(caps[1].to_string());
    }
    for caps in typedef_block_re().captures_iter(content) {
        out.insert(caps[1].to_string());
    }
}

/// Depth-first traversal over the include graph of one source file.
struct IncludeWalker<'a> {
    config: &'a CConfig,

    /// file path -> directives parsed from it; repeated transitive
    /// references are not re-parsed
    memo: HashMap<PathBuf, Vec<IncludeDirective>>,

    /// files already traversed by this resolver instance
    visited: HashSet<PathBuf>,

    /// current traversal path; a file already on it is not re-descended
    stack: Vec<PathBuf>,

    warnings: Vec<RunWarning>,
    files_visited: usize,
}

impl<'a> IncludeWalker<'a> {
    fn new(config: &'a CConfig) -> Self {
        Self {
            config,
            memo: HashMap::new(),
            visited: HashSet::new(),
            stack: Vec::new(),
            warnings: Vec::new(),
            files_visited: 0,
        }
    }

    fn walk_source(
        &mut self,
        source: &str,
        source_dir: Option<&Path>,
        reserved: &mut HashSet<String>,
    ) {
        for directive in parse_includes(source) {
            self.descend(&directive, source_dir, reserved, 0);
        }
    }

    fn descend(
        &mut self,
        directive: &IncludeDirective,
        from_dir: Option<&Path>,
        reserved: &mut HashSet<String>,
        depth: usize,
    ) {
        if depth >= self.config.max_include_depth {
            warn!(
                "include depth limit ({}) reached at {}",
                self.config.max_include_depth,
                directive.target()
            );
            return;
        }

        let Some(path) = self.resolve_target(directive, from_dir) else {
            debug!("unresolved include: {}", directive.target());
            self.warnings.push(RunWarning::UnresolvedInclude {
                path: directive.target().to_string(),
            });
            return;
        };
        let path = path.canonicalize().unwrap_or(path);

        if self.stack.contains(&path) || self.visited.contains(&path) {
            return;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!("could not read header {}: {}", path.display(), e);
                self.warnings
                    .push(RunWarning::MissingAuxiliaryFile { path });
                return;
            }
        };

        self.visited.insert(path.clone());
        self.files_visited += 1;
        extract_symbols(&content, reserved);

        let directives = self
            .memo
            .entry(path.clone())
            .or_insert_with(|| parse_includes(&content))
            .clone();

        let dir = path.parent().map(Path::to_path_buf);
        self.stack.push(path);
        for directive in &directives {
            self.descend(directive, dir.as_deref(), reserved, depth + 1);
        }
        self.stack.pop();
    }

    fn resolve_target(
        &self,
        directive: &IncludeDirective,
        from_dir: Option<&Path>,
    ) -> Option<PathBuf> {
        let target = Path::new(directive.target());
        if let IncludeDirective::Quoted(_) = directive {
            if let Some(dir) = from_dir {
                let candidate = dir.join(target);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        find_in_search_dirs(target, &self.config.include_dirs)
    }
}

fn find_in_search_dirs(target: &Path, dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(target))
        .find(|candidate| candidate.is_file())
}

/// Build the C reserved set: fixed builtins, standard-header symbols, and
/// everything declared by the file's transitive includes.
pub(crate) fn resolve(source: &str, source_path: Option<&Path>, config: &CConfig) -> Resolution {
    let mut resolution = Resolution::default();
    resolution.reserved.extend(config.builtins.iter().cloned());
    resolution
        .reserved
        .extend(standard_symbols(config).iter().cloned());

    let mut walker = IncludeWalker::new(config);
    let source_dir = source_path.and_then(Path::parent);
    let mut reserved = std::mem::take(&mut resolution.reserved);
    walker.walk_source(source, source_dir, &mut reserved);

    resolution.reserved = reserved;
    resolution.warnings = walker.warnings;
    resolution.files_visited = walker.files_visited;
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn config_for(dir: &TempDir) -> CConfig {
        CConfig {
            include_dirs: vec![dir.path().to_path_buf()],
            ..CConfig::default()
        }
    }

    #[test]
    fn test_extract_symbol_categories() {
        let header = r#"
#define BUF_SIZE 4096
#define MAX(a, b) ((a) > (b) ? (a) : (b))
extern int printf(const char *fmt, ...);
extern char *strcpy(char *dest, const char *src);
extern int errno_local;
typedef unsigned long count_t;
typedef struct node *node_ptr;
typedef struct { int x; int y; } point;
"#;
        let mut out = HashSet::new();
        extract_symbols(header, &mut out);

        assert!(out.contains("BUF_SIZE"));
        assert!(out.contains("MAX"));
        assert!(out.contains("printf"));
        assert!(out.contains("strcpy"));
        assert!(out.contains("errno_local"));
        assert!(out.contains("count_t"));
        assert!(out.contains("node_ptr"));
        assert!(out.contains("point"));
    }

    #[test]
    fn test_transitive_includes() {
        let dir = TempDir::new().unwrap();
        write(&dir, "outer.h", "#include <inner.h>\n#define OUTER 1\n");
        write(&dir, "inner.h", "extern int inner_fn(void);\n");

        let config = config_for(&dir);
        let resolution = resolve("#include <outer.h>\nint x;\n", None, &config);

        assert!(resolution.reserved.contains("OUTER"));
        assert!(resolution.reserved.contains("inner_fn"));
        assert_eq!(resolution.files_visited, 2);
    }

    #[test]
    fn test_include_cycle_terminates() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.h", "#include <b.h>\n#define FROM_A 1\n");
        write(&dir, "b.h", "#include <a.h>\n#define FROM_B 1\n");

        let config = config_for(&dir);
        let resolution = resolve("#include <a.h>\n", None, &config);

        assert!(resolution.reserved.contains("FROM_A"));
        assert!(resolution.reserved.contains("FROM_B"));
        // Each header is traversed exactly once.
        assert_eq!(resolution.files_visited, 2);
    }

    #[test]
    fn test_unresolved_include_is_warning() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);
        let resolution = resolve("#include <no_such_header.h>\nint x;\n", None, &config);

        assert!(resolution
            .warnings
            .iter()
            .any(|w| matches!(w, RunWarning::UnresolvedInclude { path } if path == "no_such_header.h")));
    }

    #[test]
    fn test_quoted_include_relative_to_source() {
        let dir = TempDir::new().unwrap();
        write(&dir, "local.h", "#define LOCAL_MACRO 1\n");
        let source_path = dir.path().join("main.c");

        // Search path deliberately empty: only the source-relative lookup
        // can find local.h.
        let config = CConfig {
            include_dirs: Vec::new(),
            ..CConfig::default()
        };
        let resolution = resolve(
            "#include \"local.h\"\nint x;\n",
            Some(&source_path),
            &config,
        );

        assert!(resolution.reserved.contains("LOCAL_MACRO"));
    }

    #[test]
    fn test_shared_header_parsed_once() {
        let dir = TempDir::new().unwrap();
        write(&dir, "top.h", "#include <shared.h>\n#include <mid.h>\n");
        write(&dir, "mid.h", "#include <shared.h>\n");
        write(&dir, "shared.h", "#define SHARED 1\n");

        let config = config_for(&dir);
        let resolution = resolve("#include <top.h>\n", None, &config);

        assert!(resolution.reserved.contains("SHARED"));
        // shared.h reached twice, traversed once.
        assert_eq!(resolution.files_visited, 3);
    }
}
