//! Note document model.
//!
//! # Responsibility
//! - Define `NoteDocument`, `Topic` and `Note` with their serde shape.
//! - Provide exact-match topic lookup and lazy topic creation.
//!
//! # Invariants
//! - Topic matching is exact, case-sensitive string equality.
//! - `topic_mut_or_insert` never creates a second topic with an existing name.
//! - A `Note` is never edited after it is appended.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// `strftime` pattern used for generated note timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One immutable timestamped text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// `YYYY-MM-DD HH:MM:SS`, caller supplied or generated at creation.
    pub timestamp: String,
    /// Free text body; may span lines.
    pub text: String,
}

impl Note {
    /// Creates a note, generating the timestamp when none is supplied.
    ///
    /// An empty supplied timestamp counts as absent.
    pub fn new(text: impl Into<String>, timestamp: Option<String>) -> Self {
        let timestamp = timestamp
            .filter(|value| !value.is_empty())
            .unwrap_or_else(now_timestamp);
        Self {
            timestamp,
            text: text.into(),
        }
    }
}

/// Named group of notes; the name is the document's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: Vec::new(),
        }
    }
}

/// The whole persisted store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDocument {
    #[serde(default)]
    pub topics: Vec<Topic>,
}

impl NoteDocument {
    /// Finds a topic by exact name.
    pub fn topic(&self, name: &str) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.name == name)
    }

    /// Finds a topic by exact name, appending a new empty one when absent.
    pub fn topic_mut_or_insert(&mut self, name: &str) -> &mut Topic {
        let index = match self.topics.iter().position(|topic| topic.name == name) {
            Some(index) => index,
            None => {
                self.topics.push(Topic::new(name));
                self.topics.len() - 1
            }
        };
        &mut self.topics[index]
    }

    /// Returns the first topic name that appears more than once, if any.
    pub fn first_duplicate_topic(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.topics
            .iter()
            .map(|topic| topic.name.as_str())
            .find(|name| !seen.insert(*name))
    }

    /// Total number of notes across all topics.
    pub fn note_count(&self) -> usize {
        self.topics.iter().map(|topic| topic.notes.len()).sum()
    }
}

/// Current local time formatted with [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
