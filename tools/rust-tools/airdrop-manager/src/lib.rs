// Library exports for airdrop-manager
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use airdrop_solana_rpc::AirdropConfig;
use anchor_client::Cluster;
use anyhow::{Context, Result, bail};
use clap::Args;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{EncodableKey, Keypair};
use solana_sdk::signer::Signer;
use tracing::info;

pub mod commands;
pub mod files;

pub use airdrop_solana_rpc::{SolanaBackend, instructions, utils};

pub const RAW_WALLET_PRIVATE_KEY: &str = "RAW_WALLET_PRIVATE_KEY";

#[derive(Args, Debug, Clone, Default)]
pub struct WalletArgs {
    #[clap(short, long, env)]
    pub wallet_private_key_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ClusterArgs {
    #[clap(long, env, default_value_t = Cluster::Testnet.url().to_string())]
    pub rpc: String,

    #[clap(long, env, default_value_t = Cluster::Testnet.ws_url().to_string())]
    pub ws_rpc: String,
}

/// Where the airdrop program and its mint live. Flags win over the TOML file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    #[clap(long = "config", env = "AIRDROP_CONFIG")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env)]
    pub program_id: Option<Pubkey>,

    #[clap(long, env)]
    pub mint: Option<Pubkey>,
}

impl From<ClusterArgs> for Cluster {
    fn from(val: ClusterArgs) -> Self {
        let rpc = val.rpc.trim_matches('"').to_string();
        let ws_rpc = val.ws_rpc.trim_matches('"').to_string();
        Cluster::Custom(rpc, ws_rpc)
    }
}

impl WalletArgs {
    /// `None` when no key source is configured at all; a configured but unreadable key is an error.
    pub fn load(self) -> Result<Option<Keypair>> {
        let raw = std::env::var(RAW_WALLET_PRIVATE_KEY).ok();
        if raw.is_none() && self.wallet_private_key_path.is_none() {
            return Ok(None);
        }
        read_keypair(raw, self.wallet_private_key_path.as_deref()).map(Some)
    }
}

impl ConfigArgs {
    pub fn load(&self) -> Result<AirdropConfig> {
        let mut config = match &self.config_path {
            Some(path) => AirdropConfig::from_toml_file(path)?,
            None => AirdropConfig::default(),
        };
        if let Some(program_id) = self.program_id {
            config.program_id = program_id;
        }
        if let Some(mint) = self.mint {
            config.mint = mint;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Builds the RPC backend; read-only commands work without a wallet.
pub fn connect(cluster: ClusterArgs, wallet: WalletArgs) -> Result<SolanaBackend> {
    let payer = wallet.load()?.map(Arc::new);
    if let Some(payer) = &payer {
        info!(wallet = %payer.pubkey(), "Loaded wallet");
    }
    let cluster: Cluster = cluster.into();
    info!(rpc = cluster.url(), "Using cluster");
    Ok(SolanaBackend::new(
        cluster,
        payer,
        CommitmentConfig::confirmed(),
    ))
}

/// A raw key (JSON byte array or base58) takes precedence over a keypair file.
pub fn read_keypair(raw: Option<String>, path: Option<&Path>) -> Result<Keypair> {
    if let Some(raw) = raw {
        let raw = raw.trim();
        if raw.starts_with('[') {
            return match Keypair::read(&mut Cursor::new(raw)) {
                Ok(keypair) => Ok(keypair),
                Err(err) => bail!("Invalid {RAW_WALLET_PRIVATE_KEY}: {err}"),
            };
        }
        // Keypair::from_base58_string panics on bad input
        let bytes = match bs58::decode(raw).into_vec() {
            Ok(bytes) => bytes,
            Err(err) => bail!("Invalid {RAW_WALLET_PRIVATE_KEY}: not base58 ({err})"),
        };
        return match Keypair::from_bytes(&bytes) {
            Ok(keypair) => Ok(keypair),
            Err(err) => bail!("Invalid {RAW_WALLET_PRIVATE_KEY}: {err}"),
        };
    }
    match path {
        Some(path) => {
            let path = expand_home(path)?;
            Keypair::read_from_file(&path)
                .map_err(|err| anyhow::anyhow!("Failed to read keypair from {path:?}: {err}"))
        }
        None => bail!(
            "No wallet private key! Must pass --wallet-private-key-path or set {RAW_WALLET_PRIVATE_KEY}"
        ),
    }
}

/// Clap parser for token amounts given in whole tokens.
pub fn parse_token_amount(value: &str) -> Result<f64, String> {
    let amount: f64 = value
        .trim()
        .parse()
        .map_err(|err| format!("invalid amount {value:?}: {err}"))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(format!("amount must be a positive number of tokens, got {value}"));
    }
    Ok(amount)
}

/// Replaces a leading `~` with `$HOME`.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = std::env::var("HOME")
        .context("wallet path contains ~, but HOME environment variable isn't set")?;
    Ok(PathBuf::from(home).join(rest))
}

/// Load `KEY=value` lines from a file into the process environment.
/// Blank lines and `#` comments are skipped; surrounding quotes are stripped.
pub fn load_and_apply_env_file(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read env file: {}", path.display()))?;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            std::env::set_var(key.trim().trim_matches('"'), value.trim().trim_matches('"'));
        }
    }
    Ok(())
}
