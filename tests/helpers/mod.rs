#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use tandem::agent::Agent;
use tandem::embedding::hash::HashEmbeddingProvider;
use tandem::embedding::EmbeddingProvider;
use tandem::knowledge::{KnowledgeItem, KnowledgeStore};
use tandem::memory::MemoryRing;

/// Deterministic offline embedder shared by the integration suites.
pub fn test_embedder() -> Arc<dyn EmbeddingProvider> {
    Arc::new(HashEmbeddingProvider::default())
}

pub fn test_store() -> KnowledgeStore {
    KnowledgeStore::new(test_embedder())
}

pub fn test_ring(threshold: f32, max_memories: usize) -> MemoryRing {
    MemoryRing::new(test_embedder(), threshold, max_memories)
}

pub fn test_agent(memory_threshold: f32, max_memories: usize) -> Agent {
    Agent::new(test_embedder(), memory_threshold, max_memories)
}

/// A knowledge item with a category and tags, embedding left for the store.
pub fn item(
    id: &str,
    title: &str,
    content: &str,
    category: &str,
    tags: &[&str],
) -> KnowledgeItem {
    KnowledgeItem::new(id, title, content)
        .with_category(category)
        .with_tags(tags.iter().map(|t| t.to_string()).collect())
}

/// Write a file under `dir`, creating parent directories as needed.
pub fn write_file(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}
