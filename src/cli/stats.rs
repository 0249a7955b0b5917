use anyhow::Result;

use crate::config::TandemConfig;

/// Display knowledge base and memory ring statistics.
pub fn stats(config: &TandemConfig) -> Result<()> {
    let agent = super::open_agent(config)?;

    println!("{}", agent.knowledge_summary());
    println!();
    println!("{}", agent.memory_summary());

    let memory_stats = agent.memory().statistics();
    if let (Some(oldest), Some(newest)) = (memory_stats.oldest, memory_stats.newest) {
        println!("- oldest memory: {oldest:.0}");
        println!("- newest memory: {newest:.0}");
    }

    Ok(())
}
