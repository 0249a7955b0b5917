use anyhow::{Context, Result};

use crate::config::TandemConfig;

/// Query the knowledge base from the terminal.
pub async fn query(
    config: &TandemConfig,
    text: &str,
    k: Option<usize>,
    category: Option<String>,
    tags: Vec<String>,
    threshold: Option<f32>,
) -> Result<()> {
    let agent = super::open_agent(config)?;
    let k = k.unwrap_or(config.knowledge.default_top_k);
    let threshold = threshold.unwrap_or(config.knowledge.default_threshold);
    let input = text.to_string();

    let matches = tokio::task::spawn_blocking(move || {
        let tag_filter = (!tags.is_empty()).then_some(tags);
        agent
            .knowledge()
            .query(
                &input,
                k,
                category.as_deref(),
                tag_filter.as_deref(),
                threshold,
            )
            .context("knowledge query failed")
    })
    .await??;

    if matches.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s)\n", matches.len());
    for (i, m) in matches.iter().enumerate() {
        let preview: String = m.item.content.chars().take(120).collect();
        println!(
            "  {}. [{}] {} (score: {:.4})",
            i + 1,
            m.item.category,
            m.item.title,
            m.score,
        );
        if !m.item.tags.is_empty() {
            println!("     tags: {}", m.item.tags.join(", "));
        }
        println!("     {preview}");
        println!();
    }

    Ok(())
}
