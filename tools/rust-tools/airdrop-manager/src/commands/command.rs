use airdrop_solana_rpc::SolanaBackend;
use anyhow::Result;
use async_trait::async_trait;

/// An operator action run against the configured cluster
#[async_trait]
pub trait Command {
    async fn execute(self, backend: SolanaBackend) -> Result<()>;
}
