//! The pair-programming agent: a thin orchestrator over the knowledge store
//! and the memory ring.
//!
//! An [`Agent`] exclusively owns one [`KnowledgeStore`], one [`MemoryRing`],
//! and the conversation history; nothing is shared across agent instances
//! except the embedding provider handle. Response generation is pure
//! composition: record the input, retrieve relevant memories and knowledge,
//! render a fixed-format response, record it back.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::config::TandemConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::knowledge::{KnowledgeMatch, KnowledgeStore};
use crate::memory::{MemoryEntry, MemoryMatch, MemoryRing};

/// Recency window applied to memory retrieval during a turn.
pub const RECALL_WINDOW_SECS: f64 = 3600.0;
/// Minimum similarity for knowledge items pulled into a turn's context.
pub const KNOWLEDGE_THRESHOLD: f32 = 0.5;
/// How many memories and knowledge items feed a turn.
pub const CONTEXT_TOP_K: usize = 3;
/// Knowledge content is truncated to this many chars in the context.
pub const KNOWLEDGE_PREVIEW_CHARS: usize = 500;

const KNOWLEDGE_FILE: &str = "knowledge_base.json";
const MEMORY_FILE: &str = "memories.json";
const HISTORY_FILE: &str = "conversation_history.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: f64,
}

/// Retrieved context assembled for a single turn.
#[derive(Debug, Default, Serialize)]
pub struct EnhancedContext {
    pub relevant_memories: Vec<MemoryContext>,
    pub relevant_knowledge: Vec<KnowledgeContext>,
}

#[derive(Debug, Serialize)]
pub struct MemoryContext {
    pub content: String,
    pub kind: String,
    pub similarity: f32,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct KnowledgeContext {
    pub title: String,
    /// Truncated to [`KNOWLEDGE_PREVIEW_CHARS`].
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub similarity: f32,
}

pub struct Agent {
    embedder: Arc<dyn EmbeddingProvider>,
    knowledge: KnowledgeStore,
    memory: MemoryRing,
    history: Vec<ConversationTurn>,
    workspace: Option<PathBuf>,
}

impl Agent {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        memory_threshold: f32,
        max_memories: usize,
    ) -> Self {
        Self {
            knowledge: KnowledgeStore::new(Arc::clone(&embedder)),
            memory: MemoryRing::new(Arc::clone(&embedder), memory_threshold, max_memories),
            embedder,
            history: Vec::new(),
            workspace: None,
        }
    }

    /// Build an agent from config, constructing the configured embedding
    /// provider.
    pub fn from_config(config: &TandemConfig) -> anyhow::Result<Self> {
        let provider = crate::embedding::create_provider(&config.embedding)?;
        Ok(Self::new(
            Arc::from(provider),
            config.memory.memory_threshold,
            config.memory.max_memories,
        ))
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    pub fn knowledge_mut(&mut self) -> &mut KnowledgeStore {
        &mut self.knowledge
    }

    pub fn memory(&self) -> &MemoryRing {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryRing {
        &mut self.memory
    }

    pub fn set_workspace(&mut self, path: impl Into<PathBuf>) {
        self.workspace = Some(path.into());
    }

    pub fn workspace(&self) -> Option<&Path> {
        self.workspace.as_deref()
    }

    /// Scan the configured workspace into the knowledge store and return a
    /// formatted summary. Fails with [`Error::NotConfigured`] when no
    /// workspace has been set.
    pub fn scan_workspace(&mut self, recursive: bool) -> Result<String> {
        let Some(workspace) = self.workspace.clone() else {
            return Err(Error::NotConfigured("workspace path not set"));
        };
        self.knowledge.scan_directory(&workspace, recursive)?;
        Ok(self.knowledge_summary())
    }

    /// Record an arbitrary memory through the agent.
    pub fn add_memory(
        &mut self,
        content: &str,
        kind: &str,
        metadata: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<MemoryEntry> {
        self.memory.append(content, kind, metadata)
    }

    /// Run one conversational turn.
    ///
    /// Records the input as a `"conversation"` memory, retrieves relevant
    /// recent memories and knowledge, renders a response from that context,
    /// records the response as a memory tagged as a response, and appends
    /// both turns to the history.
    pub fn generate_response(
        &mut self,
        user_input: &str,
        context: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<String> {
        self.history.push(ConversationTurn {
            role: Role::User,
            content: user_input.to_string(),
            timestamp: crate::memory::now_secs(),
        });
        self.memory.append(user_input, "conversation", context)?;

        let memories = self.memory.retrieve_relevant(
            user_input,
            CONTEXT_TOP_K,
            None,
            Some(RECALL_WINDOW_SECS),
        )?;
        let knowledge =
            self.knowledge
                .query(user_input, CONTEXT_TOP_K, None, None, KNOWLEDGE_THRESHOLD)?;

        let context = build_context(&memories, &knowledge);
        let response = render_response(&context);

        self.history.push(ConversationTurn {
            role: Role::Assistant,
            content: response.clone(),
            timestamp: crate::memory::now_secs(),
        });
        let mut response_meta = serde_json::Map::new();
        response_meta.insert("type".into(), "response".into());
        self.memory
            .append(&response, "conversation", Some(response_meta))?;

        Ok(response)
    }

    /// The trailing `limit` turns of the conversation, or all of them.
    pub fn conversation_history(&self, limit: Option<usize>) -> &[ConversationTurn] {
        match limit {
            Some(limit) if limit < self.history.len() => {
                &self.history[self.history.len() - limit..]
            }
            _ => &self.history,
        }
    }

    /// Formatted knowledge base statistics.
    pub fn knowledge_summary(&self) -> String {
        let stats = self.knowledge.statistics();
        let mut categories: Vec<(String, usize)> = stats.categories.into_iter().collect();
        categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let categories = categories
            .iter()
            .map(|(label, count)| format!("{label}({count})"))
            .collect::<Vec<_>>()
            .join(", ");
        let popular = stats
            .popular_tags
            .iter()
            .map(|(tag, count)| format!("{tag}({count})"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Knowledge base:\n- total items: {}\n- categories: {}\n- popular tags: {}",
            stats.total_items, categories, popular
        )
    }

    /// Formatted memory ring statistics.
    pub fn memory_summary(&self) -> String {
        let stats = self.memory.statistics();
        let mut kinds: Vec<(String, usize)> = stats.by_kind.into_iter().collect();
        kinds.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let kinds = kinds
            .iter()
            .map(|(kind, count)| format!("{kind}({count})"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Memory ring:\n- total memories: {}\n- by kind: {}",
            stats.total_memories, kinds
        )
    }

    /// Persist knowledge, memories, and conversation history under `dir`.
    pub fn save_state(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        self.knowledge.save(&dir.join(KNOWLEDGE_FILE))?;
        self.memory.save(&dir.join(MEMORY_FILE))?;
        std::fs::write(
            dir.join(HISTORY_FILE),
            serde_json::to_string_pretty(&self.history)?,
        )?;
        info!(dir = %dir.display(), "agent state saved");
        Ok(())
    }

    /// Restore any state files present under `dir`. Missing files are
    /// tolerated so a fresh state directory loads as empty.
    pub fn load_state(&mut self, dir: &Path) -> Result<()> {
        let knowledge_path = dir.join(KNOWLEDGE_FILE);
        if knowledge_path.exists() {
            self.knowledge.load(&knowledge_path)?;
        }
        let memory_path = dir.join(MEMORY_FILE);
        if memory_path.exists() {
            self.memory.load(&memory_path)?;
        }
        let history_path = dir.join(HISTORY_FILE);
        if history_path.exists() {
            self.history = serde_json::from_str(&std::fs::read_to_string(history_path)?)?;
        }
        Ok(())
    }
}

fn build_context(memories: &[MemoryMatch], knowledge: &[KnowledgeMatch]) -> EnhancedContext {
    EnhancedContext {
        relevant_memories: memories
            .iter()
            .map(|m| MemoryContext {
                content: m.entry.content.clone(),
                kind: m.entry.kind.clone(),
                similarity: m.score,
                metadata: m.entry.metadata.clone(),
            })
            .collect(),
        relevant_knowledge: knowledge
            .iter()
            .map(|k| KnowledgeContext {
                title: k.item.title.clone(),
                content: truncate_chars(&k.item.content, KNOWLEDGE_PREVIEW_CHARS),
                category: k.item.category.clone(),
                tags: k.item.tags.clone(),
                similarity: k.score,
            })
            .collect(),
    }
}

/// Fixed-format response text assembled from the retrieved context.
fn render_response(context: &EnhancedContext) -> String {
    let mut parts =
        vec!["I understand your request. Let me combine prior context and project knowledge."
            .to_string()];

    if !context.relevant_memories.is_empty() {
        let lines = context
            .relevant_memories
            .iter()
            .map(|m| format!("related memory ({}): {}", m.kind, m.content))
            .collect::<Vec<_>>()
            .join("\n");
        parts.push(format!("\nFrom recent memory:\n{lines}"));
    }

    if !context.relevant_knowledge.is_empty() {
        let lines = context
            .relevant_knowledge
            .iter()
            .map(|k| format!("related knowledge ({}): {}\n{}", k.category, k.title, k.content))
            .collect::<Vec<_>>()
            .join("\n");
        parts.push(format!("\nFrom the knowledge base:\n{lines}"));
    }

    parts.join("\n")
}

/// Char-boundary-safe truncation.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn render_without_context_is_just_the_preamble() {
        let rendered = render_response(&EnhancedContext::default());
        assert!(rendered.starts_with("I understand your request"));
        assert!(!rendered.contains("From recent memory"));
        assert!(!rendered.contains("From the knowledge base"));
    }
}
