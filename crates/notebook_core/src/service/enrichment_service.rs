//! Topic enrichment from an external encyclopedia.
//!
//! # Responsibility
//! - Look up a search term, format the hit as a note, append it to a topic.
//! - Report lookup failure and storage failure as distinct outcomes.
//!
//! # Invariants
//! - The lookup runs outside any store critical section.
//! - A failed lookup never touches storage.
//! - An invalid topic is rejected before any lookup is made.
//! - Lookup and append are two stages, not one transaction.

use crate::lookup::{EncyclopediaLookup, LookupError, LookupHit};
use crate::model::note::Note;
use crate::repo::note_repo::{validate_topic, NoteRepository};
use crate::repo::RepoError;
use log::{info, warn};
use std::sync::Arc;

/// Result of one enrichment attempt.
#[derive(Debug)]
pub enum EnrichOutcome {
    /// Topic name was rejected; neither lookup nor storage ran.
    InvalidTopic(RepoError),
    /// Lookup succeeded and the note was appended.
    Stored { hit: LookupHit, note: Note },
    /// Lookup succeeded but appending the note failed.
    StoreFailed { hit: LookupHit, error: RepoError },
    /// Lookup failed; storage was not touched.
    LookupFailed(LookupError),
}

/// Enrichment service over a lookup collaborator and a note repository.
pub struct EnrichmentService<R: NoteRepository + ?Sized, L: EncyclopediaLookup + ?Sized> {
    repo: Arc<R>,
    lookup: Arc<L>,
}

impl<R: NoteRepository + ?Sized, L: EncyclopediaLookup + ?Sized> EnrichmentService<R, L> {
    pub fn new(repo: Arc<R>, lookup: Arc<L>) -> Self {
        Self { repo, lookup }
    }

    /// Runs only the lookup stage.
    pub fn search(&self, term: &str) -> Result<LookupHit, LookupError> {
        self.lookup.lookup(term)
    }

    /// Looks up `search_term` (or `topic` when absent/empty) and appends the
    /// formatted hit to `topic`.
    pub fn enrich_topic(&self, topic: &str, search_term: Option<&str>) -> EnrichOutcome {
        if let Err(err) = validate_topic(topic) {
            info!("event=enrich module=service status=invalid_topic topic={topic:?}");
            return EnrichOutcome::InvalidTopic(err);
        }
        let term = resolve_search_term(topic, search_term);

        let hit = match self.lookup.lookup(term) {
            Ok(hit) => hit,
            Err(err) => {
                info!(
                    "event=enrich module=service status=lookup_failed topic={topic:?} term={term:?} error={err}"
                );
                return EnrichOutcome::LookupFailed(err);
            }
        };

        let text = format_enriched_note(self.lookup.source_label(), &hit);
        match self.repo.add_note(topic, &text, None) {
            Ok(note) => {
                info!(
                    "event=enrich module=service status=ok topic={topic:?} title={:?}",
                    hit.title
                );
                EnrichOutcome::Stored { hit, note }
            }
            Err(error) => {
                warn!(
                    "event=enrich module=service status=store_failed topic={topic:?} error={error}"
                );
                EnrichOutcome::StoreFailed { hit, error }
            }
        }
    }
}

/// Empty or missing search terms fall back to the topic name.
pub fn resolve_search_term<'a>(topic: &'a str, search_term: Option<&'a str>) -> &'a str {
    search_term.filter(|term| !term.is_empty()).unwrap_or(topic)
}

/// Formats a lookup hit as a three-line note body.
pub fn format_enriched_note(label: &str, hit: &LookupHit) -> String {
    format!(
        "{label}: {}\nLink: {}\nSummary: {}",
        hit.title, hit.link, hit.summary
    )
}

#[cfg(test)]
mod tests {
    use super::{format_enriched_note, resolve_search_term};
    use crate::lookup::LookupHit;

    #[test]
    fn search_term_defaults_to_topic() {
        assert_eq!(resolve_search_term("lang", None), "lang");
        assert_eq!(resolve_search_term("lang", Some("")), "lang");
        assert_eq!(resolve_search_term("lang", Some("Go")), "Go");
    }

    #[test]
    fn enriched_note_embeds_title_link_and_summary() {
        let hit = LookupHit {
            title: "Rust".to_string(),
            link: "https://example.org/Rust".to_string(),
            summary: "A language.".to_string(),
        };
        assert_eq!(
            format_enriched_note("Wikipedia", &hit),
            "Wikipedia: Rust\nLink: https://example.org/Rust\nSummary: A language."
        );
    }
}
