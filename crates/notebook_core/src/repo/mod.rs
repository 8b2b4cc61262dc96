//! Repository layer over the document store.
//!
//! # Responsibility
//! - Define use-case oriented note access contracts.
//! - Keep document scanning details away from services and the RPC facade.
//!
//! # Invariants
//! - Every repository call maps to exactly one store critical section.
//! - Storage failures are surfaced, never swallowed.

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note operations.
#[derive(Debug)]
pub enum RepoError {
    /// Topic name is empty or whitespace only.
    InvalidTopic(String),
    /// Underlying document store failure.
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTopic(name) => write!(f, "invalid topic name: `{name}`"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTopic(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
