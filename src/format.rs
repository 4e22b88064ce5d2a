//! Best-effort re-indentation of anonymized output.
//!
//! Cosmetic only: renaming shortens most identifiers, so original column
//! alignment is gone anyway. C output is re-indented by brace depth;
//! OCaml indentation carries meaning for readers and has no simple
//! depth-based rule, so it only gets trailing-whitespace normalization.

use crate::models::Language;

const INDENT: &str = "    ";

/// Re-indent a buffer according to the language's conventions.
pub fn reindent(source: &str, language: Language) -> String {
    match language {
        Language::C => reindent_c(source),
        Language::OCaml => normalize_whitespace(source),
    }
}

fn reindent_c(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut depth: usize = 0;

    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            out.push('\n');
            continue;
        }

        let leading_closers = trimmed
            .chars()
            .take_while(|c| *c == '}')
            .count();
        let line_depth = depth.saturating_sub(leading_closers);

        // Preprocessor directives stay in column zero.
        if !trimmed.starts_with('#') {
            for _ in 0..line_depth {
                out.push_str(INDENT);
            }
        }
        out.push_str(trimmed);
        out.push('\n');

        let (opens, closes) = brace_balance(trimmed);
        depth = depth.saturating_sub(closes).saturating_add(opens);
    }
    out
}

/// Count braces outside string and char literals.
fn brace_balance(line: &str) -> (usize, usize) {
    let bytes = line.as_bytes();
    let mut opens = 0;
    let mut closes = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'{' => opens += 1,
            b'}' => closes += 1,
            _ => {}
        }
        i += 1;
    }
    (opens, closes)
}

fn normalize_whitespace(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for line in source.lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
