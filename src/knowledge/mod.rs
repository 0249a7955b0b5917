//! Project knowledge base: ingestion, faceted similarity search, statistics,
//! and JSON persistence.

pub mod extract;
pub mod store;
pub mod types;

pub use extract::{ContentExtractor, Extracted, MarkdownExtractor, PythonExtractor};
pub use store::KnowledgeStore;
pub use types::{
    KnowledgeDocument, KnowledgeItem, KnowledgeMatch, KnowledgeStats, ScanReport,
    DEFAULT_CATEGORY,
};
