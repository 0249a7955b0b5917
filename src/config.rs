//! Configuration loading from TOML files and environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TandemConfig {
    pub agent: AgentConfig,
    pub embedding: EmbeddingConfig,
    pub memory: MemoryConfig,
    pub knowledge: KnowledgeConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    /// Directory holding persisted knowledge, memories, and history.
    pub state_dir: String,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `"local"` (ONNX) or `"hash"` (offline deterministic).
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoryConfig {
    /// Minimum similarity for a memory to count as relevant.
    pub memory_threshold: f32,
    /// Ring capacity; oldest entries are evicted past this.
    pub max_memories: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub default_top_k: usize,
    pub default_threshold: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let state_dir = default_tandem_dir()
            .join("state")
            .to_string_lossy()
            .into_owned();
        Self {
            state_dir,
            log_level: "info".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_tandem_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            memory_threshold: 0.7,
            max_memories: 1000,
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            default_top_k: 3,
            default_threshold: 0.5,
        }
    }
}

/// Returns `~/.tandem/`
pub fn default_tandem_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".tandem")
}

/// Returns the default config file path: `~/.tandem/config.toml`
pub fn default_config_path() -> PathBuf {
    default_tandem_dir().join("config.toml")
}

impl TandemConfig {
    /// Load config from the default TOML file (if it exists) then apply env
    /// var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            TandemConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (TANDEM_STATE_DIR,
    /// TANDEM_LOG_LEVEL, TANDEM_EMBEDDING_PROVIDER).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TANDEM_STATE_DIR") {
            self.agent.state_dir = val;
        }
        if let Ok(val) = std::env::var("TANDEM_LOG_LEVEL") {
            self.agent.log_level = val;
        }
        if let Ok(val) = std::env::var("TANDEM_EMBEDDING_PROVIDER") {
            self.embedding.provider = val;
        }
    }

    /// Resolve the state directory, expanding `~` if needed.
    pub fn resolved_state_dir(&self) -> PathBuf {
        expand_tilde(&self.agent.state_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TandemConfig::default();
        assert_eq!(config.agent.log_level, "info");
        assert_eq!(config.embedding.provider, "local");
        assert_eq!(config.memory.max_memories, 1000);
        assert!((config.memory.memory_threshold - 0.7).abs() < 1e-6);
        assert!(config.agent.state_dir.ends_with("state"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[agent]
log_level = "debug"
state_dir = "/tmp/tandem-state"

[embedding]
provider = "hash"

[memory]
max_memories = 50
"#;
        let config: TandemConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.agent.log_level, "debug");
        assert_eq!(config.agent.state_dir, "/tmp/tandem-state");
        assert_eq!(config.embedding.provider, "hash");
        assert_eq!(config.memory.max_memories, 50);
        // defaults still apply for unset fields
        assert_eq!(config.knowledge.default_top_k, 3);
        assert!((config.memory.memory_threshold - 0.7).abs() < 1e-6);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = TandemConfig::default();
        std::env::set_var("TANDEM_STATE_DIR", "/tmp/override-state");
        std::env::set_var("TANDEM_LOG_LEVEL", "trace");
        std::env::set_var("TANDEM_EMBEDDING_PROVIDER", "hash");

        config.apply_env_overrides();

        assert_eq!(config.agent.state_dir, "/tmp/override-state");
        assert_eq!(config.agent.log_level, "trace");
        assert_eq!(config.embedding.provider, "hash");

        std::env::remove_var("TANDEM_STATE_DIR");
        std::env::remove_var("TANDEM_LOG_LEVEL");
        std::env::remove_var("TANDEM_EMBEDDING_PROVIDER");
    }
}
