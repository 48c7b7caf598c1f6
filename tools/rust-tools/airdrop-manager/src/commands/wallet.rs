use std::path::PathBuf;

use crate::commands::Command;
use crate::{ClusterArgs, WalletArgs, connect};
use airdrop_solana_rpc::utils::{lamports_to_sol, sol_to_lamports};
use airdrop_solana_rpc::{Ledger, SolanaBackend};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use clap::{Args, Subcommand};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{EncodableKey, Keypair, Signer};

#[derive(Subcommand, Debug)]
pub enum WalletCommands {
    /// Display the pubkey from a keypair file
    Pubkey {
        /// Filepath to a keypair
        keypair_path: PathBuf,
    },
    /// Generate a new random keypair and write it to a file
    New {
        /// Filepath to write the new keypair to
        output_path: PathBuf,
    },
    /// Request SOL from a faucet (won't work on mainnet)
    Airdrop {
        #[clap(flatten)]
        cluster: ClusterArgs,
        #[clap(flatten)]
        wallet: WalletArgs,
        #[clap(flatten)]
        command: CommandWalletAirdrop,
    },
    /// Get the SOL balance of the wallet or of any address
    Balance {
        #[clap(flatten)]
        cluster: ClusterArgs,
        #[clap(flatten)]
        wallet: WalletArgs,
        #[clap(flatten)]
        command: CommandWalletBalance,
    },
}

pub async fn execute(command: WalletCommands) -> Result<()> {
    match command {
        WalletCommands::Pubkey { keypair_path } => {
            let keypair = Keypair::read_from_file(&keypair_path)
                .map_err(|e| anyhow!("Failed to read keypair from {keypair_path:?}: {e}"))?;
            println!("{}", keypair.pubkey());
            Ok(())
        }
        WalletCommands::New { output_path } => {
            if output_path.exists() {
                bail!("keypair output path {output_path:?} exists, refusing to overwrite it.")
            }
            let keypair = Keypair::new();
            keypair
                .write_to_file(&output_path)
                .map_err(|e| anyhow!("Failed to write keypair to {output_path:?}: {e}"))?;

            println!("Wrote keypair to {output_path:?}");
            println!("pubkey: {}", keypair.pubkey());
            Ok(())
        }
        WalletCommands::Airdrop {
            cluster,
            wallet,
            command,
        } => command.execute(connect(cluster, wallet)?).await,
        WalletCommands::Balance {
            cluster,
            wallet,
            command,
        } => command.execute(connect(cluster, wallet)?).await,
    }
}

#[derive(Debug, Clone, Args)]
#[command()]
pub struct CommandWalletAirdrop {
    /// Amount of SOL to request
    pub amount: f64,
}

#[async_trait]
impl Command for CommandWalletAirdrop {
    async fn execute(self, backend: SolanaBackend) -> Result<()> {
        if backend.is_mainnet() {
            bail!("Faucet airdrops are not available on mainnet");
        }
        let pubkey = backend.get_payer()?;
        let lamports = sol_to_lamports(self.amount);
        println!(
            "Requesting airdrop of {} SOL to {pubkey} via RPC {}",
            self.amount,
            backend.cluster().url()
        );

        let pre_balance = backend.get_balance(&pubkey).await?;
        let signature = backend.request_airdrop_and_confirm(&pubkey, lamports).await?;
        let post_balance = backend.get_balance(&pubkey).await?;

        if post_balance < pre_balance.saturating_add(lamports) {
            bail!("Balance unchanged. Run `solana confirm -v {signature}` to debug");
        }
        println!("New balance: {} SOL", lamports_to_sol(post_balance));
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
#[command()]
pub struct CommandWalletBalance {
    /// Address to inspect, defaults to the wallet
    #[clap(long)]
    pub address: Option<Pubkey>,
}

#[async_trait]
impl Command for CommandWalletBalance {
    async fn execute(self, backend: SolanaBackend) -> Result<()> {
        let pubkey = match self.address {
            Some(address) => address,
            None => backend.get_payer()?,
        };
        let balance = backend.get_balance(&pubkey).await?;

        println!("pubkey {pubkey} has sol balance");
        println!("{} SOL", lamports_to_sol(balance));
        Ok(())
    }
}
