use std::path::PathBuf;

use airdrop_manager::commands::Command;
use airdrop_manager::commands::claim::{CommandClaim, CommandClaimStatus};
use airdrop_manager::commands::network::CommandNetworkStatus;
use airdrop_manager::commands::token::{
    CommandTokenDisableMint, CommandTokenLaunch, CommandTokenTransfer, print_token_info,
};
use airdrop_manager::commands::vault::{CommandVaultSetup, CommandVaultStatus};
use airdrop_manager::commands::wallet::{self, WalletCommands};
use airdrop_manager::files::TOKEN_INFO_PATH;
use airdrop_manager::{ClusterArgs, WalletArgs, connect, load_and_apply_env_file};
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "airdrop-manager")]
#[command(about = "Claim the airdrop and operate its token and vault")]
struct CliArgs {
    /// Path to .env file with environment variables (RPC, WALLET_PRIVATE_KEY_PATH, ...)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[allow(clippy::large_enum_variant)]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the RPC endpoint answers
    NetworkStatus {
        #[clap(flatten)]
        cluster: ClusterArgs,
        #[clap(flatten)]
        params: CommandNetworkStatus,
    },
    /// Show whether the airdrop vault exists and what it holds
    VaultStatus {
        #[clap(flatten)]
        cluster: ClusterArgs,
        #[clap(flatten)]
        params: CommandVaultStatus,
    },
    /// Create and fund the airdrop vault from the wallet
    VaultSetup {
        #[clap(flatten)]
        cluster: ClusterArgs,
        #[clap(flatten)]
        wallet: WalletArgs,
        #[clap(flatten)]
        params: CommandVaultSetup,
    },
    /// Show whether an identity has already claimed
    ClaimStatus {
        #[clap(flatten)]
        cluster: ClusterArgs,
        #[clap(flatten)]
        wallet: WalletArgs,
        #[clap(flatten)]
        params: CommandClaimStatus,
    },
    /// Claim the airdrop with the wallet
    Claim {
        #[clap(flatten)]
        cluster: ClusterArgs,
        #[clap(flatten)]
        wallet: WalletArgs,
        #[clap(flatten)]
        params: CommandClaim,
    },
    /// Create a new SPL token and mint its initial supply to the wallet
    TokenLaunch {
        #[clap(flatten)]
        cluster: ClusterArgs,
        #[clap(flatten)]
        wallet: WalletArgs,
        #[clap(flatten)]
        params: CommandTokenLaunch,
    },
    /// Send launched tokens to another address
    TokenTransfer {
        #[clap(flatten)]
        cluster: ClusterArgs,
        #[clap(flatten)]
        wallet: WalletArgs,
        #[clap(flatten)]
        params: CommandTokenTransfer,
    },
    /// Remove the mint authority of the launched token
    TokenDisableMint {
        #[clap(flatten)]
        cluster: ClusterArgs,
        #[clap(flatten)]
        wallet: WalletArgs,
        #[clap(flatten)]
        params: CommandTokenDisableMint,
    },
    /// Print the saved information about the launched token
    TokenInfo {
        #[clap(long, default_value = TOKEN_INFO_PATH)]
        token_info: PathBuf,
    },
    Wallet {
        #[command(subcommand)]
        command: WalletCommands,
    },
    // Prints the help, optionally as markdown. Used for docs generation.
    #[clap(hide = true)]
    PrintAllHelp {
        #[arg(long, required = true)]
        markdown: bool,
    },
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::NetworkStatus { cluster, params } => {
            params.execute(connect(cluster, WalletArgs::default())?).await
        }
        Commands::VaultStatus { cluster, params } => {
            params.execute(connect(cluster, WalletArgs::default())?).await
        }
        Commands::VaultSetup {
            cluster,
            wallet,
            params,
        } => params.execute(connect(cluster, wallet)?).await,
        Commands::ClaimStatus {
            cluster,
            wallet,
            params,
        } => params.execute(connect(cluster, wallet)?).await,
        Commands::Claim {
            cluster,
            wallet,
            params,
        } => params.execute(connect(cluster, wallet)?).await,
        Commands::TokenLaunch {
            cluster,
            wallet,
            params,
        } => params.execute(connect(cluster, wallet)?).await,
        Commands::TokenTransfer {
            cluster,
            wallet,
            params,
        } => params.execute(connect(cluster, wallet)?).await,
        Commands::TokenDisableMint {
            cluster,
            wallet,
            params,
        } => params.execute(connect(cluster, wallet)?).await,
        Commands::TokenInfo { token_info } => print_token_info(&token_info),
        Commands::Wallet { command } => wallet::execute(command).await,
        Commands::PrintAllHelp { markdown } => {
            assert!(markdown);
            clap_markdown::print_help_markdown::<CliArgs>();
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // The env file must be applied before clap reads `env` fallbacks.
    if let Some(env_file) = env_file_from_args() {
        load_and_apply_env_file(&env_file)?;
    }
    let args = CliArgs::parse();

    let result = run(args.command).await;
    if let Err(e) = &result {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn env_file_from_args() -> Option<PathBuf> {
    let mut args = std::env::args_os().skip(1);
    while let Some(arg) = args.next() {
        let arg = arg.to_string_lossy().into_owned();
        if arg == "--env-file" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--env-file=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}
