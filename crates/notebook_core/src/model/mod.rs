//! Notebook domain model.
//!
//! # Responsibility
//! - Define the persisted document tree: document -> topics -> notes.
//! - Keep lookup helpers next to the data they scan.
//!
//! # Invariants
//! - Topic names are unique within one document.
//! - Notes are append-only; insertion order is chronological order.

pub mod note;
