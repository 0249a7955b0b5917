//! Bounded recency-biased memory log with similarity retrieval.
//!
//! Entries are kept sorted by timestamp at all times: a normal append lands
//! at the back, an out-of-order timestamp (adjusted clock) is placed by
//! binary search. Overflow eviction is therefore a constant-time pop from
//! the front rather than a full re-sort, while the observable contract stays
//! "keep the newest `max_memories`".

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::memory::types::{MemoryDocument, MemoryEntry, MemoryMatch, MemoryStats};
use crate::vector::{cosine_similarity, sort_by_score_desc};

pub struct MemoryRing {
    embedder: Arc<dyn EmbeddingProvider>,
    memory_threshold: f32,
    max_memories: usize,
    entries: VecDeque<MemoryEntry>,
}

impl MemoryRing {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        memory_threshold: f32,
        max_memories: usize,
    ) -> Self {
        Self {
            embedder,
            memory_threshold,
            max_memories,
            entries: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_memories
    }

    pub fn threshold(&self) -> f32 {
        self.memory_threshold
    }

    /// Append a new entry, evicting the oldest past capacity.
    ///
    /// The embedding is computed eagerly, before the entry sequence is
    /// touched. Returns a copy of the created entry.
    pub fn append(
        &mut self,
        content: &str,
        kind: &str,
        metadata: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<MemoryEntry> {
        let embedding = self.embedder.embed(content).map_err(Error::embedding)?;
        let entry = MemoryEntry {
            content: content.to_string(),
            embedding,
            timestamp: super::now_secs(),
            kind: kind.to_string(),
            metadata: metadata.unwrap_or_default(),
        };

        let created = entry.clone();
        self.insert_sorted(entry);
        while self.entries.len() > self.max_memories {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(timestamp = evicted.timestamp, kind = %evicted.kind, "memory evicted");
            }
        }
        Ok(created)
    }

    /// Insert keeping the sequence sorted by timestamp ascending. Appends
    /// under a monotonic clock hit the fast path at the back.
    fn insert_sorted(&mut self, entry: MemoryEntry) {
        match self.entries.back() {
            Some(last) if last.timestamp > entry.timestamp => {
                let at = self
                    .entries
                    .partition_point(|e| e.timestamp <= entry.timestamp);
                self.entries.insert(at, entry);
            }
            _ => self.entries.push_back(entry),
        }
    }

    /// Similarity retrieval with optional kind and time-window filters.
    ///
    /// Survivors must score at least the ring's configured threshold; the
    /// threshold is a ring-level constant, not a per-call override. A window
    /// excluding every entry (including 0) yields an empty result.
    pub fn retrieve_relevant(
        &self,
        query: &str,
        k: usize,
        kind: Option<&str>,
        time_window_secs: Option<f64>,
    ) -> Result<Vec<MemoryMatch>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let query_embedding = self.embedder.embed(query).map_err(Error::embedding)?;
        let now = super::now_secs();

        let mut scored = Vec::new();
        for entry in &self.entries {
            if let Some(kind) = kind {
                if entry.kind != kind {
                    continue;
                }
            }
            if let Some(window) = time_window_secs {
                if now - entry.timestamp > window {
                    continue;
                }
            }
            let score = cosine_similarity(&query_embedding, &entry.embedding)?;
            if score >= self.memory_threshold {
                scored.push((entry, score));
            }
        }

        sort_by_score_desc(&mut scored);
        scored.truncate(k);
        Ok(scored
            .into_iter()
            .map(|(entry, score)| MemoryMatch {
                entry: entry.clone(),
                score,
            })
            .collect())
    }

    /// Remove all entries, or only those of one kind.
    pub fn clear(&mut self, kind: Option<&str>) {
        match kind {
            Some(kind) => self.entries.retain(|e| e.kind != kind),
            None => self.entries.clear(),
        }
    }

    pub fn statistics(&self) -> MemoryStats {
        let mut by_kind: HashMap<String, usize> = HashMap::new();
        for entry in &self.entries {
            *by_kind.entry(entry.kind.clone()).or_default() += 1;
        }
        MemoryStats {
            total_memories: self.entries.len(),
            by_kind,
            oldest: self.entries.front().map(|e| e.timestamp),
            newest: self.entries.back().map(|e| e.timestamp),
        }
    }

    /// Serialize threshold, capacity, and all entries as one document.
    pub fn save(&self, path: &Path) -> Result<()> {
        let doc = MemoryDocument {
            memory_threshold: self.memory_threshold,
            max_memories: self.max_memories,
            memories: self.entries.iter().cloned().collect(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&doc)?)?;
        debug!(path = %path.display(), entries = self.entries.len(), "memories saved");
        Ok(())
    }

    /// Replace entries, threshold, and capacity wholesale from the document
    /// at `path`. A reload can change the live configuration; that is the
    /// intended contract.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let doc: MemoryDocument = serde_json::from_str(&std::fs::read_to_string(path)?)?;

        self.memory_threshold = doc.memory_threshold;
        self.max_memories = doc.max_memories;
        self.entries = doc.memories.into();
        self.entries
            .make_contiguous()
            .sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        while self.entries.len() > self.max_memories {
            self.entries.pop_front();
        }
        info!(path = %path.display(), entries = self.entries.len(), "memories loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::hash::HashEmbeddingProvider;

    fn test_ring(threshold: f32, max: usize) -> MemoryRing {
        MemoryRing::new(Arc::new(HashEmbeddingProvider::default()), threshold, max)
    }

    #[test]
    fn append_never_exceeds_capacity() {
        let mut ring = test_ring(0.0, 2);
        ring.append("first entry", "conversation", None).unwrap();
        ring.append("second entry", "conversation", None).unwrap();
        ring.append("third entry", "conversation", None).unwrap();

        assert_eq!(ring.len(), 2);
        let contents: Vec<&str> = ring.entries.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["second entry", "third entry"]);
    }

    #[test]
    fn eviction_keeps_newest_by_timestamp() {
        let mut ring = test_ring(0.0, 3);
        for i in 0..10 {
            ring.append(&format!("entry number {i}"), "code", None).unwrap();
        }
        assert_eq!(ring.len(), 3);
        let stats = ring.statistics();
        assert!(stats.oldest.unwrap() <= stats.newest.unwrap());
        assert_eq!(
            ring.entries.back().unwrap().content,
            "entry number 9"
        );
    }

    #[test]
    fn out_of_order_timestamp_is_placed_by_binary_search() {
        let mut ring = test_ring(0.0, 10);
        ring.append("a", "t", None).unwrap();
        ring.append("b", "t", None).unwrap();

        // Simulate a clock that jumped backwards.
        let mut stale = ring.entries.back().unwrap().clone();
        stale.content = "stale".into();
        stale.timestamp = ring.entries.front().unwrap().timestamp - 100.0;
        ring.insert_sorted(stale);

        assert_eq!(ring.entries.front().unwrap().content, "stale");
    }

    #[test]
    fn clear_by_kind_is_selective() {
        let mut ring = test_ring(0.0, 10);
        ring.append("one", "conversation", None).unwrap();
        ring.append("two", "code", None).unwrap();
        ring.append("three", "conversation", None).unwrap();

        ring.clear(Some("conversation"));
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.entries[0].kind, "code");

        ring.clear(None);
        assert!(ring.is_empty());
    }

    #[test]
    fn empty_ring_stats_have_no_timestamps() {
        let ring = test_ring(0.7, 10);
        let stats = ring.statistics();
        assert_eq!(stats.total_memories, 0);
        assert!(stats.oldest.is_none());
        assert!(stats.newest.is_none());
    }

    #[test]
    fn retrieval_respects_kind_filter_and_threshold() {
        let mut ring = test_ring(0.2, 10);
        ring.append("rust borrow checker notes", "code", None).unwrap();
        ring.append("rust borrow checker notes", "conversation", None)
            .unwrap();

        let matches = ring
            .retrieve_relevant("rust borrow checker notes", 10, Some("code"), None)
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].entry.kind, "code");
        assert!(matches[0].score >= 0.2);
    }

    #[test]
    fn zero_capacity_ring_holds_nothing() {
        let mut ring = test_ring(0.0, 0);
        ring.append("gone immediately", "conversation", None).unwrap();
        assert!(ring.is_empty());
    }
}
