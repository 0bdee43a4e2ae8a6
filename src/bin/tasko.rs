use anyhow::Result;
use tasko::cli::{actions, start};

#[tokio::main]
async fn main() -> Result<()> {
    let (action, globals) = start()?;

    actions::run::handle(action, &globals).await?;

    Ok(())
}
