//! Service facade exposed at the RPC boundary.
//!
//! # Responsibility
//! - Expose the notebook use-cases as total functions returning wire values.
//! - Translate repository and lookup errors into success flags or reason strings.
//!
//! # Invariants
//! - No operation returns `Err` or panics across the RPC boundary.
//! - No operation spans more than one store critical section.
//! - Enrichment reports lookup failure and storage failure differently.

use log::error;
use notebook_core::{
    EncyclopediaLookup, EnrichOutcome, EnrichmentService, LookupHit, Note, NoteRepository,
    TopicSummary,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One note as returned by `get_notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteItem {
    pub timestamp: String,
    pub text: String,
}

/// One topic as returned by `list_topics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicItem {
    pub name: String,
    pub note_count: usize,
}

/// List-shaped response: the items on success, or an error reason when
/// storage could not be read. An unknown topic is an empty `Items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Items(Vec<T>),
    Failed { error: String },
}

impl<T> ListResponse<T> {
    /// Items on success, `None` on failure.
    pub fn items(&self) -> Option<&[T]> {
        match self {
            Self::Items(items) => Some(items.as_slice()),
            Self::Failed { .. } => None,
        }
    }
}

/// `search_lookup` response: the hit fields, or an error reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Found {
        title: String,
        link: String,
        summary: String,
    },
    Failed {
        error: String,
    },
}

/// `add_enriched_note` response.
///
/// `Completed.success` is `false` when the lookup worked but storing failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnrichResponse {
    Completed {
        success: bool,
        info: LookupHit,
        message: String,
    },
    Failed {
        error: String,
    },
}

/// The notebook operations callable over RPC.
pub struct NotebookApi {
    repo: Arc<dyn NoteRepository>,
    enrichment: EnrichmentService<dyn NoteRepository, dyn EncyclopediaLookup>,
}

impl NotebookApi {
    pub fn new(repo: Arc<dyn NoteRepository>, lookup: Arc<dyn EncyclopediaLookup>) -> Self {
        let enrichment = EnrichmentService::new(Arc::clone(&repo), lookup);
        Self { repo, enrichment }
    }

    /// Appends a note; `true` when it was persisted.
    pub fn add_note(&self, topic: &str, text: &str, timestamp: Option<String>) -> bool {
        match self.repo.add_note(topic, text, timestamp) {
            Ok(_) => true,
            Err(err) => {
                error!("event=rpc_add_note module=api status=error topic={topic:?} error={err}");
                false
            }
        }
    }

    /// Notes of `topic` in insertion order; empty for unknown topics.
    ///
    /// Storage failures come back as `Failed` with the reason.
    pub fn get_notes(&self, topic: &str) -> ListResponse<NoteItem> {
        match self.repo.get_notes(topic) {
            Ok(notes) => ListResponse::Items(notes.into_iter().map(to_note_item).collect()),
            Err(err) => {
                error!("event=rpc_get_notes module=api status=error topic={topic:?} error={err}");
                ListResponse::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    /// Runs only the lookup stage.
    pub fn search_lookup(&self, query: &str) -> SearchResponse {
        match self.enrichment.search(query) {
            Ok(hit) => SearchResponse::Found {
                title: hit.title,
                link: hit.link,
                summary: hit.summary,
            },
            Err(err) => SearchResponse::Failed {
                error: err.to_string(),
            },
        }
    }

    /// Looks up `search_term` (default: `topic`) and appends the result to `topic`.
    pub fn add_enriched_note(&self, topic: &str, search_term: Option<&str>) -> EnrichResponse {
        match self.enrichment.enrich_topic(topic, search_term) {
            EnrichOutcome::Stored { hit, .. } => EnrichResponse::Completed {
                success: true,
                info: hit,
                message: format!("Note added successfully to topic '{topic}'"),
            },
            EnrichOutcome::StoreFailed { hit, error } => EnrichResponse::Completed {
                success: false,
                info: hit,
                message: format!("Error adding note: {error}"),
            },
            EnrichOutcome::LookupFailed(err) => EnrichResponse::Failed {
                error: err.to_string(),
            },
            EnrichOutcome::InvalidTopic(err) => EnrichResponse::Failed {
                error: err.to_string(),
            },
        }
    }

    /// Every topic with its note count, in document order.
    pub fn list_topics(&self) -> ListResponse<TopicItem> {
        match self.repo.list_topics() {
            Ok(topics) => ListResponse::Items(topics.into_iter().map(to_topic_item).collect()),
            Err(err) => {
                error!("event=rpc_list_topics module=api status=error error={err}");
                ListResponse::Failed {
                    error: err.to_string(),
                }
            }
        }
    }
}

fn to_note_item(note: Note) -> NoteItem {
    NoteItem {
        timestamp: note.timestamp,
        text: note.text,
    }
}

fn to_topic_item(topic: TopicSummary) -> TopicItem {
    TopicItem {
        name: topic.name,
        note_count: topic.note_count,
    }
}
