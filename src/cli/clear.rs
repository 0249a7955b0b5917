use anyhow::Result;

use crate::config::TandemConfig;

/// Clear memories — all of them, or only one kind.
pub fn clear(config: &TandemConfig, kind: Option<String>) -> Result<()> {
    let mut agent = super::open_agent(config)?;

    let before = agent.memory().len();
    agent.memory_mut().clear(kind.as_deref());
    let removed = before - agent.memory().len();

    super::save_agent(config, &agent)?;

    match kind {
        Some(kind) => println!("Removed {removed} memory(ies) of kind '{kind}'."),
        None => println!("Removed all {removed} memory(ies)."),
    }
    Ok(())
}
