//! RPC surface for the notebook service.
//!
//! # Responsibility
//! - `api`: total, wire-shaped wrappers over the core use-cases.
//! - `server`: JSON-RPC 2.0 over HTTP with a worker pool.
//! - `config`: environment-driven server settings.

pub mod api;
pub mod config;
pub mod server;

pub use api::{EnrichResponse, ListResponse, NoteItem, NotebookApi, SearchResponse, TopicItem};
pub use config::{ConfigError, ServerConfig};
pub use server::{dispatch, RpcServer, METHODS};
