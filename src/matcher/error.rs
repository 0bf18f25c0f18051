use crate::workflow::TaskIndex;
use thiserror::Error;

/// Pattern compilation failures. Deterministic for a given pattern string,
/// so callers can validate patterns ahead of time (e.g. at argument parsing).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("task match pattern is invalid: {pattern}")]
    NoFragments { pattern: String },

    #[error("match patterns addressing a direct child (+name+name) are not supported: {pattern}")]
    DirectChildFragment { pattern: String },
}

impl SyntaxError {
    pub fn pattern(&self) -> &str {
        match self {
            SyntaxError::NoFragments { pattern } => pattern,
            SyntaxError::DirectChildFragment { pattern } => pattern,
        }
    }
}

/// Matching failures. Both carry the original pattern text; the ambiguous
/// case additionally carries the complete ordered index -> full-name mapping
/// so callers can render a disambiguation prompt instead of reparsing a
/// message string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("task pattern '{pattern}' doesn't match with any tasks")]
    NoMatch { pattern: String },

    #[error("task pattern '{pattern}' is ambiguous, matching candidates are {}", candidate_names(.matches))]
    Ambiguous {
        pattern: String,
        matches: Vec<(TaskIndex, String)>,
    },
}

impl MatchError {
    pub fn pattern(&self) -> &str {
        match self {
            MatchError::NoMatch { pattern } => pattern,
            MatchError::Ambiguous { pattern, .. } => pattern,
        }
    }
}

fn candidate_names(matches: &[(TaskIndex, String)]) -> String {
    let names: Vec<&str> = matches.iter().map(|(_, name)| name.as_str()).collect();
    names.join(", ")
}
