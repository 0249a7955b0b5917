//! Knowledge item and persisted-document definitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Category assigned when ingestion context provides none.
pub const DEFAULT_CATEGORY: &str = "general";

/// A durable, searchable unit derived from an ingested file or inserted
/// directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeItem {
    /// Stable content-derived identifier (12 hex chars for ingested files).
    pub id: String,
    pub title: String,
    pub content: String,
    /// Single classification label, typically the containing directory name.
    #[serde(default = "default_category")]
    pub category: String,
    /// Short labels from extraction; order preserved, duplicates meaningless.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Provenance path, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Computed lazily from `title + "\n" + content` on first insertion.
    pub embedding: Option<Vec<f32>>,
    /// Open mapping: extraction timestamp, file size, file type, etc.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl KnowledgeItem {
    /// Minimal constructor for directly inserted items.
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            category: default_category(),
            tags: Vec::new(),
            source_file: None,
            embedding: None,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// On-disk knowledge base document.
#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub items: Vec<KnowledgeItem>,
}

/// A query hit: the matched item plus its cosine score.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeMatch {
    pub item: KnowledgeItem,
    pub score: f32,
}

/// Aggregate counts over the store.
#[derive(Debug, Serialize)]
pub struct KnowledgeStats {
    pub total_items: usize,
    /// Item count per category.
    pub categories: HashMap<String, usize>,
    /// Number of distinct tags.
    pub total_tags: usize,
    /// Top-10 tags by item count, ties broken by tag name.
    pub popular_tags: Vec<(String, usize)>,
}

/// Outcome of a directory scan. Failures are contained per file and reported
/// here rather than raised.
#[derive(Debug, Default, Serialize)]
pub struct ScanReport {
    pub imported: usize,
    /// Files skipped because no extractor was registered for their extension.
    pub skipped: usize,
    pub failed: usize,
}
