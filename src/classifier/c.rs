//! Heuristic token classifier for C.

use super::{
    following_char, is_numeric_literal, preceding_word, word_run_at, Region, RegionCache,
    TokenClassifier,
};
use crate::models::LexicalCategory;

/// Scan-based classifier for C source.
///
/// Comment, string, and char-literal regions are indexed in a single pass;
/// identifier kinds are decided from the immediate context of the word run.
/// `#include` targets are treated as string regions so header path
/// components are never mistaken for identifiers.
#[derive(Debug, Default)]
pub struct CClassifier {
    regions: RegionCache,
}

impl CClassifier {
    pub fn new() -> Self {
        Self {
            regions: RegionCache::new(),
        }
    }
}

impl TokenClassifier for CClassifier {
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

        if following_char(buffer, end) == Some('(') {
            return LexicalCategory::IdentifierFunction;
        }

        match preceding_word(buffer, start) {
            Some("struct") | Some("enum") | Some("union") | Some("typedef") => {
                return LexicalCategory::IdentifierType;
            }
            _ => {}
        }
        if token.ends_with("_t") {
            return LexicalCategory::IdentifierType;
        }

        LexicalCategory::IdentifierVariable
    }
}

/// One-pass scan producing sorted comment/string regions.
fn scan_regions(buffer: &str) -> Vec<Region> {
    let bytes = buffer.as_bytes();
    let mut regions = Vec::new();
    let mut i = 0;
    let mut at_line_start = true;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                let start = i;
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                regions.push(Region {
                    start,
                    end: i,
                    category: LexicalCategory::Comment,
                });
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                let start = i;
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
                regions.push(Region {
                    start,
                    end: i,
                    category: LexicalCategory::Comment,
                });
            }
            b'"' => {
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
            }
            b'\'' => {
                let start = i;
                i += 1;
                while i < bytes.len() && bytes[i] != b'\'' {
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
            }
            b'#' if at_line_start => {
                // Preprocessor directive: protect an <angle-bracket> include
                // target the same way a quoted one is protected.
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() && bytes[i] != b'\n' {
                    i += 1;
                }
                let word_start = i;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                if &buffer[word_start..i] == "include" {
                    while i < bytes.len() && bytes[i] != b'<' && bytes[i] != b'"' && bytes[i] != b'\n'
                    {
                        i += 1;
                    }
                    if i < bytes.len() && bytes[i] == b'<' {
                        let start = i;
                        while i < bytes.len() && bytes[i] != b'>' && bytes[i] != b'\n' {
                            i += 1;
                        }
                        i = (i + 1).min(bytes.len());
                        regions.push(Region {
                            start,
                            end: i,
                            category: LexicalCategory::StringLiteral,
                        });
                    }
                }
                continue;
            }
            b'\n' => {
                at_line_start = true;
                i += 1;
                continue;
            }
            c => {
                if !c.is_ascii_whitespace() {
                    at_line_start = false;
                }
                i += 1;
                continue;
            }
        }
        at_line_start = false;
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_at(src: &str, needle: &str) -> LexicalCategory {
        let classifier = CClassifier::new();
        let offset = src.find(needle).unwrap();
        classifier.classify(src, offset)
    }

    #[test]
    fn test_string_region() {
        let src = r#"printf("foo is %d", foo);"#;
        let offset = src.find("foo is").unwrap();
        let classifier = CClassifier::new();
        assert_eq!(
            classifier.classify(src, offset),
            LexicalCategory::StringLiteral
        );
        // The trailing argument is a plain identifier.
        let arg = src.rfind("foo").unwrap();
        assert_eq!(
            classifier.classify(src, arg),
            LexicalCategory::IdentifierVariable
        );
    }

    #[test]
    fn test_line_comment_region() {
        let src = "int x; // counter for foo\nint y;";
        assert_eq!(classify_at(src, "counter"), LexicalCategory::Comment);
        assert_eq!(classify_at(src, "y"), LexicalCategory::IdentifierVariable);
    }

    #[test]
    fn test_block_comment_region() {
        let src = "/* foo\n   bar */ int baz;";
        assert_eq!(classify_at(src, "bar"), LexicalCategory::Comment);
        assert_eq!(classify_at(src, "baz"), LexicalCategory::IdentifierVariable);
    }

    #[test]
    fn test_function_and_type_kinds() {
        let src = "struct point make_point(int x);";
        assert_eq!(classify_at(src, "point"), LexicalCategory::IdentifierType);
        assert_eq!(
            classify_at(src, "make_point"),
            LexicalCategory::IdentifierFunction
        );
        assert_eq!(classify_at(src, "x"), LexicalCategory::IdentifierVariable);
    }

    #[test]
    fn test_numeric_literal() {
        let src = "int x = 0xFF;";
        assert_eq!(classify_at(src, "0xFF"), LexicalCategory::NumericLiteral);
    }

    #[test]
    fn test_include_target_protected() {
        let src = "#include <stdio.h>\nint foo;";
        assert_eq!(classify_at(src, "stdio"), LexicalCategory::StringLiteral);
        assert_eq!(classify_at(src, "foo"), LexicalCategory::IdentifierVariable);
    }

    #[test]
    fn test_char_literal_protected() {
        let src = "char c = 'a'; int abc;";
        let offset = src.find("'a'").unwrap() + 1;
        let classifier = CClassifier::new();
        assert_eq!(
            classifier.classify(src, offset),
            LexicalCategory::StringLiteral
        );
    }
}
