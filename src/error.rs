//! Typed error taxonomy for the core engine.
//!
//! Per-file extraction failures are contained by directory scans (logged,
//! skipped); everything else propagates to the caller through [`Error`].

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An operation requires a prerequisite that has not been set up.
    #[error("not configured: {0}")]
    NotConfigured(&'static str),

    /// A persisted-state file or referenced id is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A single file's content extractor failed.
    #[error("extraction failed for {}: {message}", file.display())]
    Extraction { file: PathBuf, message: String },

    /// Two vectors of differing length were compared.
    #[error("vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// Cosine similarity was requested against a zero-norm vector.
    #[error("degenerate vector: zero norm has no cosine similarity")]
    DegenerateVector,

    /// The embedding provider failed.
    #[error("embedding provider failed: {0}")]
    Embedding(String),

    /// A persisted document was malformed or missing required fields.
    #[error("malformed document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a provider failure, flattening the anyhow chain into one message.
    pub(crate) fn embedding(err: anyhow::Error) -> Self {
        Self::Embedding(format!("{err:#}"))
    }
}
