//! Core domain logic for the notebook service.
//! Owns the on-disk note document and every invariant over it.

pub mod logging;
pub mod lookup;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use lookup::{
    EncyclopediaLookup, LookupError, LookupHit, LookupResult, WikipediaLookup,
    NO_SUMMARY_PLACEHOLDER,
};
pub use model::note::{Note, NoteDocument, Topic, TIMESTAMP_FORMAT};
pub use repo::note_repo::{FileNoteRepository, NoteRepository, TopicSummary};
pub use repo::{RepoError, RepoResult};
pub use service::enrichment_service::{EnrichOutcome, EnrichmentService};
pub use store::{DocumentStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
