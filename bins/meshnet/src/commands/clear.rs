//! meshnet clear command implementation.

use clap::Args;
use meshnet::NetworkBackend;
use meshnet::backend::CommandBackend;

#[derive(Args)]
pub struct ClearCmd {}

impl ClearCmd {
    pub async fn run(&self) -> anyhow::Result<()> {
        let backend = CommandBackend::new()?;
        let before = backend.list_namespaces().await?;

        backend.delete_all_namespaces().await?;
        tracing::info!(count = before.len(), "deleted all namespaces");
        Ok(())
    }
}
