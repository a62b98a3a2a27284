//! Name and line matching, either case-insensitive substring or regex search.

use super::CoreError;
use regex::Regex;

/// A compiled search pattern.
///
/// Regex patterns are searched anywhere in the candidate, never anchored to
/// the start or required to match in full.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Case-insensitive containment. Holds the lowercased needle.
    Literal(String),
    Regex(Regex),
}

impl Matcher {
    /// Compiles `pattern`. An invalid regex is a `CoreError::Match` carrying
    /// the compiler's diagnostic.
    pub fn new(pattern: &str, use_regex: bool) -> Result<Self, CoreError> {
        if use_regex {
            Regex::new(pattern)
                .map(Matcher::Regex)
                .map_err(|e| CoreError::Match {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })
        } else {
            Ok(Matcher::Literal(pattern.to_lowercase()))
        }
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        match self {
            // Empty needle matches everything.
            Matcher::Literal(needle) => {
                needle.is_empty() || candidate.to_lowercase().contains(needle.as_str())
            }
            Matcher::Regex(regex) => regex.is_match(candidate),
        }
    }
}

/// One-shot form of [`Matcher`]: compiles `pattern` and tests `candidate`.
pub fn matches(candidate: &str, pattern: &str, use_regex: bool) -> Result<bool, CoreError> {
    Ok(Matcher::new(pattern, use_regex)?.is_match(candidate))
}
