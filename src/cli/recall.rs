use anyhow::{Context, Result};

use crate::config::TandemConfig;

/// Retrieve relevant memories from the terminal.
pub async fn recall(
    config: &TandemConfig,
    text: &str,
    k: Option<usize>,
    kind: Option<String>,
    window_secs: Option<f64>,
) -> Result<()> {
    let agent = super::open_agent(config)?;
    let k = k.unwrap_or(config.knowledge.default_top_k);
    let input = text.to_string();

    let matches = tokio::task::spawn_blocking(move || {
        agent
            .memory()
            .retrieve_relevant(&input, k, kind.as_deref(), window_secs)
            .context("memory retrieval failed")
    })
    .await??;

    if matches.is_empty() {
        println!("No relevant memories.");
        return Ok(());
    }

    println!("Found {} memory(ies)\n", matches.len());
    for (i, m) in matches.iter().enumerate() {
        let preview: String = m.entry.content.chars().take(120).collect();
        println!(
            "  {}. [{}] score {:.4}, recorded at {:.0}",
            i + 1,
            m.entry.kind,
            m.score,
            m.entry.timestamp,
        );
        println!("     {preview}");
        println!();
    }

    Ok(())
}
