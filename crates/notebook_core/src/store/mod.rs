//! File-backed document storage.
//!
//! # Responsibility
//! - Own the on-disk representation of the note document.
//! - Serialize every load/mutate/save cycle behind one exclusive lock.
//!
//! # Invariants
//! - At most one critical section runs at a time per store.
//! - The file on disk is only replaced after a mutation succeeds.
//! - A corrupt file is reported, never overwritten.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod document_store;

pub use document_store::DocumentStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failures surfaced by [`DocumentStore`].
#[derive(Debug)]
pub enum StoreError {
    /// Document is unreadable or malformed.
    Corruption { path: PathBuf, reason: String },
    /// Persisting the document failed; the previous file is still in place.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn corruption(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corruption {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Corruption { .. } => "storage_corruption",
            Self::Write { .. } => "storage_write",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corruption { path, reason } => {
                write!(f, "note document `{}` is unreadable: {reason}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "failed to write note document `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Corruption { .. } => None,
            Self::Write { source, .. } => Some(source),
        }
    }
}
