//! Note repository contract and file-backed implementation.
//!
//! # Responsibility
//! - Append notes to topics, creating topics lazily.
//! - Read a topic's notes in insertion order.
//!
//! # Invariants
//! - Topic lookup is a linear scan with exact, case-sensitive equality.
//! - An unknown topic reads as an empty note list, not an error.
//! - Empty topic names are rejected before storage is touched.

use super::{RepoError, RepoResult};
use crate::model::note::Note;
use crate::store::DocumentStore;
use log::info;
use std::sync::Arc;

/// Topic name with its note count, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSummary {
    pub name: String,
    pub note_count: usize,
}

/// Repository interface for note operations.
pub trait NoteRepository: Send + Sync {
    /// Appends one note to `topic` and returns the stored note.
    fn add_note(&self, topic: &str, text: &str, timestamp: Option<String>) -> RepoResult<Note>;
    /// Returns the notes of `topic` in insertion order.
    fn get_notes(&self, topic: &str) -> RepoResult<Vec<Note>>;
    /// Returns every topic with its note count.
    fn list_topics(&self) -> RepoResult<Vec<TopicSummary>>;
}

/// Note repository backed by a shared [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct FileNoteRepository {
    store: Arc<DocumentStore>,
}

impl FileNoteRepository {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}

impl NoteRepository for FileNoteRepository {
    fn add_note(&self, topic: &str, text: &str, timestamp: Option<String>) -> RepoResult<Note> {
        validate_topic(topic)?;
        let note = Note::new(text, timestamp);

        let count = self.store.with_document(|doc| -> RepoResult<usize> {
            let entry = doc.topic_mut_or_insert(topic);
            entry.notes.push(note.clone());
            Ok(entry.notes.len())
        })?;

        info!(
            "event=note_add module=repo status=ok topic={topic:?} text_len={} topic_notes={count}",
            text.len()
        );
        Ok(note)
    }

    fn get_notes(&self, topic: &str) -> RepoResult<Vec<Note>> {
        let notes = self.store.read_document(|doc| {
            doc.topic(topic)
                .map(|entry| entry.notes.clone())
                .unwrap_or_default()
        })?;

        info!(
            "event=note_list module=repo status=ok topic={topic:?} count={}",
            notes.len()
        );
        Ok(notes)
    }

    fn list_topics(&self) -> RepoResult<Vec<TopicSummary>> {
        let topics = self.store.read_document(|doc| {
            doc.topics
                .iter()
                .map(|topic| TopicSummary {
                    name: topic.name.clone(),
                    note_count: topic.notes.len(),
                })
                .collect::<Vec<_>>()
        })?;
        Ok(topics)
    }
}

/// Rejects empty or whitespace-only topic names.
pub fn validate_topic(topic: &str) -> RepoResult<()> {
    if topic.trim().is_empty() {
        return Err(RepoError::InvalidTopic(topic.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{FileNoteRepository, NoteRepository};
    use crate::repo::RepoError;
    use crate::store::DocumentStore;
    use std::sync::Arc;

    fn temp_repo() -> (tempfile::TempDir, FileNoteRepository) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = DocumentStore::open(dir.path().join("notebook.json")).expect("open store");
        (dir, FileNoteRepository::new(Arc::new(store)))
    }

    #[test]
    fn add_note_rejects_blank_topic_without_writing() {
        let (_dir, repo) = temp_repo();
        let err = repo.add_note("   ", "text", None).unwrap_err();
        assert!(matches!(err, RepoError::InvalidTopic(_)));
        assert!(repo.list_topics().unwrap().is_empty());
    }

    #[test]
    fn list_topics_keeps_document_order_and_counts() {
        let (_dir, repo) = temp_repo();
        repo.add_note("b", "1", None).unwrap();
        repo.add_note("a", "2", None).unwrap();
        repo.add_note("b", "3", None).unwrap();

        let topics = repo.list_topics().unwrap();
        let names: Vec<_> = topics.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(topics[0].note_count, 2);
        assert_eq!(topics[1].note_count, 1);
    }

    #[test]
    fn add_note_returns_stored_note() {
        let (_dir, repo) = temp_repo();
        let note = repo
            .add_note("t", "hello", Some("2020-01-01 00:00:00".to_string()))
            .unwrap();
        assert_eq!(note.timestamp, "2020-01-01 00:00:00");
        assert_eq!(repo.get_notes("t").unwrap(), vec![note]);
    }
}
