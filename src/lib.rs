//! Knowledge and memory context engine for an AI pair-programming assistant.
//!
//! Tandem gives a coding assistant two retrieval surfaces over a shared
//! embedding space:
//!
//! - a **knowledge store** built by scanning a workspace: items are faceted
//!   by category (directory) and tags (extracted labels), queried by cosine
//!   similarity with threshold and top-k selection
//! - a **memory ring**: an append-only, capacity-bounded log of timestamped
//!   conversational entries with similarity + kind + time-window retrieval
//!
//! Both persist as JSON documents and share one [`embedding::EmbeddingProvider`].
//! The [`agent::Agent`] composes them into conversational turns.
//!
//! # Modules
//!
//! - [`config`] — configuration from TOML files and environment variables
//! - [`embedding`] — text-to-vector providers (local ONNX, offline hashing)
//! - [`vector`] — cosine similarity and the linear-scan vector index
//! - [`knowledge`] — knowledge store, extractors, faceted query, persistence
//! - [`memory`] — the bounded memory ring
//! - [`agent`] — the conversation orchestrator

pub mod agent;
pub mod config;
pub mod embedding;
pub mod error;
pub mod knowledge;
pub mod memory;
pub mod vector;

pub use error::{Error, Result};
