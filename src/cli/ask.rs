use anyhow::{Context, Result};

use crate::config::TandemConfig;

/// Run one conversational turn against the persisted agent state.
pub async fn ask(config: &TandemConfig, text: &str) -> Result<()> {
    let agent = super::open_agent(config)?;
    let input = text.to_string();

    let (agent, response) = tokio::task::spawn_blocking(move || -> Result<_> {
        let mut agent = agent;
        let response = agent
            .generate_response(&input, None)
            .context("response generation failed")?;
        Ok((agent, response))
    })
    .await??;

    super::save_agent(config, &agent)?;

    println!("{response}");
    Ok(())
}
