//! External encyclopedia lookup boundary.
//!
//! # Responsibility
//! - Define the contract consumed by the enrichment service.
//! - Keep "no results" distinguishable from transport failures.
//!
//! # Invariants
//! - Implementations never panic on unexpected remote payloads; they return
//!   `LookupError::Malformed` instead.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod wikipedia;

pub use wikipedia::WikipediaLookup;

/// Placeholder used when the remote article has no summary text.
pub const NO_SUMMARY_PLACEHOLDER: &str = "No summary available.";

pub type LookupResult<T> = Result<T, LookupError>;

/// Best match returned by a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupHit {
    pub title: String,
    pub link: String,
    /// First paragraph of the article, or [`NO_SUMMARY_PLACEHOLDER`].
    pub summary: String,
}

/// Lookup failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Search succeeded but matched nothing. Not worth retrying.
    NotFound(String),
    /// Network or HTTP failure. Safe to retry.
    Transport(String),
    /// Remote answered with an unexpected shape.
    Malformed(String),
}

impl LookupError {
    /// Whether repeating the same lookup could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(_) => write!(f, "No results found"),
            Self::Transport(details) => write!(f, "lookup transport error: {details}"),
            Self::Malformed(details) => write!(f, "unexpected lookup response: {details}"),
        }
    }
}

impl Error for LookupError {}

/// Encyclopedia search collaborator.
pub trait EncyclopediaLookup: Send + Sync {
    /// Resolves `term` to its best-matching article.
    fn lookup(&self, term: &str) -> LookupResult<LookupHit>;

    /// Label written in front of the title in enriched notes.
    fn source_label(&self) -> &str;
}

/// Returns the first line of `extract`, or the placeholder when blank.
pub fn first_paragraph(extract: Option<&str>) -> String {
    extract
        .and_then(|text| text.lines().next())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| NO_SUMMARY_PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::{first_paragraph, LookupError, NO_SUMMARY_PLACEHOLDER};

    #[test]
    fn first_paragraph_keeps_only_first_line() {
        let summary = first_paragraph(Some("Go is a language.\nIt was designed at Google."));
        assert_eq!(summary, "Go is a language.");
    }

    #[test]
    fn first_paragraph_falls_back_to_placeholder() {
        assert_eq!(first_paragraph(None), NO_SUMMARY_PLACEHOLDER);
        assert_eq!(first_paragraph(Some("")), NO_SUMMARY_PLACEHOLDER);
        assert_eq!(first_paragraph(Some("  \nsecond")), NO_SUMMARY_PLACEHOLDER);
    }

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(LookupError::Transport("timeout".into()).is_retryable());
        assert!(!LookupError::NotFound("x".into()).is_retryable());
        assert!(!LookupError::Malformed("x".into()).is_retryable());
    }
}
