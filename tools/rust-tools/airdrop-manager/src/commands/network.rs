use crate::commands::Command;
use airdrop_solana_rpc::{Ledger, SolanaBackend};
use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use tracing::error;

#[derive(Debug, Clone, Args)]
#[command()]
pub struct CommandNetworkStatus {}

#[async_trait]
impl Command for CommandNetworkStatus {
    async fn execute(self, backend: SolanaBackend) -> Result<()> {
        let url = backend.cluster().url().to_string();
        match backend.get_version().await {
            Ok(version) => {
                println!("Connected to {url} (Version: {version})");
                Ok(())
            }
            Err(err) => {
                error!(%url, error = %err, "Network probe failed");
                println!("Failed to connect to {url}: {err}");
                Err(err.into())
            }
        }
    }
}
