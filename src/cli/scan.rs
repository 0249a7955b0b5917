use std::path::Path;

use anyhow::{Context, Result};

use crate::config::TandemConfig;

/// Scan a workspace directory into the knowledge base and persist it.
pub async fn scan(config: &TandemConfig, path: &Path, recursive: bool) -> Result<()> {
    let mut agent = super::open_agent(config)?;
    let workspace = path.to_path_buf();
    agent.set_workspace(workspace.clone());

    // Embedding every imported file is CPU-bound; keep it off the runtime.
    let (agent, summary) = tokio::task::spawn_blocking(move || -> Result<_> {
        let mut agent = agent;
        let summary = agent.scan_workspace(recursive).context("workspace scan failed")?;
        Ok((agent, summary))
    })
    .await??;

    super::save_agent(config, &agent)?;

    println!("Scanned {}", workspace.display());
    println!("{summary}");
    Ok(())
}
