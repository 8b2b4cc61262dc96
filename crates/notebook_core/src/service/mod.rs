//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate lookup and repository calls into use-case level APIs.
//! - Keep the RPC facade decoupled from storage and network details.

pub mod enrichment_service;
