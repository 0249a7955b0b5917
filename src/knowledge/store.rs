//! The knowledge store: ingestion, faceted similarity query, statistics, and
//! persistence.
//!
//! The authoritative state is the `id -> item` map; category and tag buckets
//! are derived indexes that preserve per-bucket insertion order. Embeddings
//! live both on the item (for persistence) and in a [`VectorIndex`] (for
//! scoring).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::knowledge::extract::{ContentExtractor, MarkdownExtractor, PythonExtractor};
use crate::knowledge::types::{
    KnowledgeDocument, KnowledgeItem, KnowledgeMatch, KnowledgeStats, ScanReport,
    DEFAULT_CATEGORY,
};
use crate::vector::{sort_by_score_desc, VectorIndex};

/// Length of the hex id derived for ingested files.
const ID_LEN: usize = 12;

pub struct KnowledgeStore {
    embedder: Arc<dyn EmbeddingProvider>,
    items: HashMap<String, KnowledgeItem>,
    index: VectorIndex,
    categories: HashMap<String, Vec<String>>,
    tags: HashMap<String, Vec<String>>,
    extractors: HashMap<String, Arc<dyn ContentExtractor>>,
}

impl KnowledgeStore {
    /// Create an empty store with the Markdown and Python extractors
    /// pre-registered.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        let mut store = Self {
            embedder,
            items: HashMap::new(),
            index: VectorIndex::new(),
            categories: HashMap::new(),
            tags: HashMap::new(),
            extractors: HashMap::new(),
        };
        store.register_extractor(Arc::new(MarkdownExtractor::new()));
        store.register_extractor(Arc::new(PythonExtractor::new()));
        store
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&KnowledgeItem> {
        self.items.get(id)
    }

    /// Register an extractor for every extension it supports, replacing any
    /// previous registration for those extensions.
    pub fn register_extractor(&mut self, extractor: Arc<dyn ContentExtractor>) {
        for ext in extractor.supported_extensions() {
            self.extractors
                .insert((*ext).to_string(), Arc::clone(&extractor));
        }
    }

    /// Walk `dir` and import every file with a registered extension.
    ///
    /// Per-file failures are logged and counted, never raised: one bad file
    /// must not block the rest of the scan. Files are visited in sorted path
    /// order so repeated scans are deterministic.
    pub fn scan_directory(&mut self, dir: &Path, recursive: bool) -> Result<ScanReport> {
        let mut files = Vec::new();
        collect_files(dir, recursive, &mut files)?;
        files.sort();

        let mut report = ScanReport::default();
        for file in files {
            match self.import_file(&file) {
                Ok(Some(id)) => {
                    debug!(file = %file.display(), id, "imported");
                    report.imported += 1;
                }
                Ok(None) => report.skipped += 1,
                Err(err) => {
                    warn!(file = %file.display(), error = %err, "import failed, skipping");
                    report.failed += 1;
                }
            }
        }

        info!(
            dir = %dir.display(),
            imported = report.imported,
            skipped = report.skipped,
            failed = report.failed,
            "directory scan complete"
        );
        Ok(report)
    }

    /// Import a single file. Returns the new item's id, or `None` when no
    /// extractor is registered for the file's extension.
    pub fn import_file(&mut self, path: &Path) -> Result<Option<String>> {
        let Some(ext) = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
        else {
            return Ok(None);
        };
        let Some(extractor) = self.extractors.get(&ext).cloned() else {
            return Ok(None);
        };

        let raw = std::fs::read_to_string(path)?;
        let extracted = extractor
            .extract_content(&raw)
            .map_err(|err| Error::Extraction {
                file: path.to_path_buf(),
                message: err.to_string(),
            })?;

        let id = derive_id(path, &raw);
        let category = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();

        let mut metadata = serde_json::Map::new();
        metadata.insert("file_type".into(), format!(".{ext}").into());
        metadata.insert("file_size".into(), (raw.len() as u64).into());
        metadata.insert("imported_at".into(), crate::memory::now_secs().into());

        let item = KnowledgeItem {
            id: id.clone(),
            title: extracted.title,
            content: extracted.body,
            category,
            tags: extracted.tags,
            source_file: Some(path.display().to_string()),
            embedding: None,
            metadata,
        };
        self.insert(item)?;
        Ok(Some(id))
    }

    /// Insert an item, computing its embedding from `title + "\n" + content`
    /// when absent.
    ///
    /// Overwriting an existing id fully reindexes: the old item's category
    /// and tag bucket memberships are removed before the new ones are added,
    /// so buckets never hold stale references.
    pub fn insert(&mut self, mut item: KnowledgeItem) -> Result<()> {
        let embedding = match item.embedding.clone() {
            Some(e) => e,
            None => {
                let text = format!("{}\n{}", item.title, item.content);
                let e = self.embedder.embed(&text).map_err(Error::embedding)?;
                item.embedding = Some(e.clone());
                e
            }
        };

        if let Some(old) = self.items.remove(&item.id) {
            self.unindex(&old);
        }

        self.index.add(item.id.clone(), embedding);
        push_bucket(&mut self.categories, &item.category, &item.id);
        for tag in &item.tags {
            push_bucket(&mut self.tags, tag, &item.id);
        }
        self.items.insert(item.id.clone(), item);
        Ok(())
    }

    /// Similarity query with optional category and tag faceting.
    ///
    /// Candidates are restricted to the category bucket, then to the union of
    /// the given tag buckets, scored by linear-scan cosine, filtered by
    /// `threshold`, and returned best-first (at most `k`). An empty candidate
    /// set yields an empty result, not an error.
    pub fn query(
        &self,
        text: &str,
        k: usize,
        category: Option<&str>,
        tags: Option<&[String]>,
        threshold: f32,
    ) -> Result<Vec<KnowledgeMatch>> {
        if self.items.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let query_embedding = self.embedder.embed(text).map_err(Error::embedding)?;

        let candidates: Vec<&str> = match category {
            Some(c) => self
                .categories
                .get(c)
                .map(|bucket| bucket.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            None => self.index.keys().collect(),
        };

        let tagged: Option<HashSet<&str>> = tags.map(|wanted| {
            wanted
                .iter()
                .filter_map(|t| self.tags.get(t))
                .flatten()
                .map(String::as_str)
                .collect()
        });

        let mut scored = Vec::new();
        for id in candidates {
            if let Some(ref tagged) = tagged {
                if !tagged.contains(id) {
                    continue;
                }
            }
            let Some(score) = self.index.score(id, &query_embedding)? else {
                continue;
            };
            if score >= threshold {
                scored.push((id, score));
            }
        }

        sort_by_score_desc(&mut scored);
        scored.truncate(k);
        Ok(scored
            .into_iter()
            .map(|(id, score)| KnowledgeMatch {
                item: self.items[id].clone(),
                score,
            })
            .collect())
    }

    /// Aggregate counts: totals, per-category counts, and the top-10 tags.
    pub fn statistics(&self) -> KnowledgeStats {
        let categories = self
            .categories
            .iter()
            .map(|(label, bucket)| (label.clone(), bucket.len()))
            .collect();

        let mut popular_tags: Vec<(String, usize)> = self
            .tags
            .iter()
            .map(|(tag, bucket)| (tag.clone(), bucket.len()))
            .collect();
        // Count descending, then tag name for a deterministic tie order.
        popular_tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        popular_tags.truncate(10);

        KnowledgeStats {
            total_items: self.items.len(),
            categories,
            total_tags: self.tags.len(),
            popular_tags,
        }
    }

    /// Serialize all items (embeddings included) to a JSON document.
    pub fn save(&self, path: &Path) -> Result<()> {
        let items = self
            .index
            .keys()
            .filter_map(|id| self.items.get(id))
            .cloned()
            .collect();
        let doc = KnowledgeDocument { items };
        std::fs::write(path, serde_json::to_string_pretty(&doc)?)?;
        debug!(path = %path.display(), items = self.items.len(), "knowledge base saved");
        Ok(())
    }

    /// Replace the entire in-memory state with the document at `path`,
    /// rebuilding category and tag indexes from scratch.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let doc: KnowledgeDocument = serde_json::from_str(&std::fs::read_to_string(path)?)?;

        self.items.clear();
        self.index.clear();
        self.categories.clear();
        self.tags.clear();
        for item in doc.items {
            self.insert(item)?;
        }
        info!(path = %path.display(), items = self.items.len(), "knowledge base loaded");
        Ok(())
    }
}

/// Append `id` to the named bucket, creating it if new. Buckets keep
/// insertion order; a duplicate id within one bucket is skipped.
fn push_bucket(buckets: &mut HashMap<String, Vec<String>>, label: &str, id: &str) {
    let bucket = buckets.entry(label.to_string()).or_default();
    if !bucket.iter().any(|existing| existing == id) {
        bucket.push(id.to_string());
    }
}

/// Stable content-derived id: SHA-256 over `"{path}:{content-hash}"`,
/// truncated to 12 hex chars.
fn derive_id(path: &Path, content: &str) -> String {
    let content_hash = hex_digest(content.as_bytes());
    let id_hash = hex_digest(format!("{}:{}", path.display(), content_hash).as_bytes());
    id_hash[..ID_LEN].to_string()
}

fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Collect regular files under `dir`, recursing when asked.
fn collect_files(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_files(&path, true, out)?;
            }
        } else {
            out.push(path);
        }
    }
    Ok(())
}

impl KnowledgeStore {
    /// Remove an item's id from every derived index.
    fn unindex(&mut self, old: &KnowledgeItem) {
        self.index.remove(&old.id);
        remove_from_bucket(&mut self.categories, &old.category, &old.id);
        for tag in &old.tags {
            remove_from_bucket(&mut self.tags, tag, &old.id);
        }
    }
}

fn remove_from_bucket(buckets: &mut HashMap<String, Vec<String>>, label: &str, id: &str) {
    if let Some(bucket) = buckets.get_mut(label) {
        bucket.retain(|existing| existing != id);
        if bucket.is_empty() {
            buckets.remove(label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::hash::HashEmbeddingProvider;

    fn test_store() -> KnowledgeStore {
        KnowledgeStore::new(Arc::new(HashEmbeddingProvider::default()))
    }

    fn item(id: &str, title: &str, content: &str) -> KnowledgeItem {
        KnowledgeItem::new(id, title, content)
    }

    #[test]
    fn insert_computes_missing_embedding() {
        let mut store = test_store();
        store
            .insert(item("a1", "Borrowing", "rust borrow checker rules"))
            .unwrap();
        let stored = store.get("a1").unwrap();
        assert!(stored.embedding.is_some());
    }

    #[test]
    fn insert_keeps_supplied_embedding() {
        let mut store = test_store();
        let mut it = item("a1", "T", "C");
        it.embedding = Some(vec![1.0; 384]);
        store.insert(it).unwrap();
        assert_eq!(store.get("a1").unwrap().embedding.as_ref().unwrap()[0], 1.0);
    }

    #[test]
    fn overwrite_reindexes_category_and_tags() {
        let mut store = test_store();
        store
            .insert(
                item("a1", "T", "C")
                    .with_category("old-cat")
                    .with_tags(vec!["old-tag".into()]),
            )
            .unwrap();
        store
            .insert(
                item("a1", "T", "C")
                    .with_category("new-cat")
                    .with_tags(vec!["new-tag".into()]),
            )
            .unwrap();

        let stats = store.statistics();
        assert_eq!(stats.total_items, 1);
        assert!(!stats.categories.contains_key("old-cat"));
        assert_eq!(stats.categories["new-cat"], 1);
        assert_eq!(stats.total_tags, 1);
        assert_eq!(stats.popular_tags, vec![("new-tag".to_string(), 1)]);
    }

    #[test]
    fn derived_id_is_stable_and_short() {
        let path = Path::new("/ws/docs/setup.md");
        let a = derive_id(path, "content");
        let b = derive_id(path, "content");
        assert_eq!(a, b);
        assert_eq!(a.len(), ID_LEN);
        assert_ne!(a, derive_id(path, "other content"));
        assert_ne!(a, derive_id(Path::new("/elsewhere/setup.md"), "content"));
    }

    #[test]
    fn popular_tags_break_ties_by_name() {
        let mut store = test_store();
        store
            .insert(item("a", "A", "x").with_tags(vec!["zeta".into(), "alpha".into()]))
            .unwrap();
        let stats = store.statistics();
        assert_eq!(
            stats.popular_tags,
            vec![("alpha".to_string(), 1), ("zeta".to_string(), 1)]
        );
    }

    #[test]
    fn query_on_empty_store_is_empty() {
        let store = test_store();
        assert!(store.query("anything", 5, None, None, 0.0).unwrap().is_empty());
    }
}
