//! Memory entry and persisted-document definitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A timestamped, capacity-bounded record of conversational content.
///
/// `kind` is a free-form classification ("conversation", "code", "prompt",
/// ...) used as a filter dimension, not an enum — any string is legal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub content: String,
    /// Always computed eagerly at creation time, never deferred.
    pub embedding: Vec<f32>,
    /// Creation time, unix seconds.
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// On-disk memory document. Threshold and capacity persist alongside the
/// entries and are restored as one unit.
#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub memory_threshold: f32,
    pub max_memories: usize,
    pub memories: Vec<MemoryEntry>,
}

/// A retrieval hit: the matched entry plus its cosine score.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryMatch {
    pub entry: MemoryEntry,
    pub score: f32,
}

/// Aggregate counts over the ring. Timestamps are `None` when the ring is
/// empty.
#[derive(Debug, Serialize)]
pub struct MemoryStats {
    pub total_memories: usize,
    pub by_kind: HashMap<String, usize>,
    pub oldest: Option<f64>,
    pub newest: Option<f64>,
}
