use std::path::{Path, PathBuf};

use crate::commands::Command;
use crate::parse_token_amount;
use crate::files::{TOKEN_INFO_PATH, TokenConfig, TokenInfo, now_rfc3339, read_json, write_json};
use airdrop_solana_rpc::instructions;
use airdrop_solana_rpc::pdas::find_user_token_account;
use airdrop_solana_rpc::utils::{
    lamports_to_sol, native_amount_to_ui_amount, sol_to_lamports, ui_amount_to_native_amount,
    whole_tokens_to_native_amount,
};
use airdrop_solana_rpc::{Ledger, SolanaBackend};
use anchor_spl::token::spl_token;
use anchor_spl::token::spl_token::solana_program::program_option::COption;
use anchor_spl::token::spl_token::solana_program::program_pack::Pack;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use clap::Args;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use tracing::{info, warn};

const MIN_LAUNCH_BALANCE_SOL: f64 = 0.01;
const LAUNCH_AIRDROP_SOL: f64 = 2.0;

#[derive(Debug, Clone, Args)]
#[command()]
pub struct CommandTokenLaunch {
    #[clap(long, default_value = "My Awesome Token")]
    pub name: String,
    #[clap(long, default_value = "MAT")]
    pub symbol: String,
    #[clap(long, default_value = "A sample token created on Solana testnet")]
    pub description: String,
    #[clap(long, default_value_t = 6)]
    pub decimals: u8,
    /// Whole tokens minted to the wallet
    #[clap(long, default_value_t = 1_000_000)]
    pub initial_supply: u64,
    #[clap(long, env, default_value = "testnet")]
    pub network: String,
    #[clap(long, default_value = TOKEN_INFO_PATH)]
    pub output: PathBuf,
}

#[async_trait]
impl Command for CommandTokenLaunch {
    async fn execute(self, backend: SolanaBackend) -> Result<()> {
        let Self {
            name,
            symbol,
            description,
            decimals,
            initial_supply,
            network,
            output,
        } = self;
        let token_config = TokenConfig {
            name,
            symbol,
            description,
            decimals,
            initial_supply,
            network,
        };

        let payer = backend.payer()?;
        let wallet = payer.pubkey();
        println!("Wallet Address: {wallet}");
        ensure_launch_balance(&backend, &wallet).await?;

        println!("Creating SPL Token...");
        println!("Name: {}", token_config.name);
        println!("Symbol: {}", token_config.symbol);
        println!("Decimals: {}", token_config.decimals);
        println!("Initial Supply: {}", token_config.initial_supply);

        let mint = Keypair::new();
        let rent = backend
            .get_minimum_balance_for_rent_exemption(spl_token::state::Mint::LEN)
            .await?;
        let create_mint = instructions::token_mint_create(
            &wallet,
            &mint.pubkey(),
            &wallet,
            Some(&wallet),
            decimals,
            rent,
        )?;
        backend
            .send_and_retry("Create mint", &create_mint, &[&mint])
            .await?;
        println!("Mint Address: {}", mint.pubkey());

        let token_account = find_user_token_account(&wallet, &mint.pubkey());
        let supply = whole_tokens_to_native_amount(initial_supply, decimals)
            .context("Initial supply does not fit in a u64 at these decimals")?;
        let mint_supply = [
            instructions::associated_token_create(
                &wallet,
                &wallet,
                &mint.pubkey(),
                &spl_token::ID,
            ),
            instructions::token_mint_to(&mint.pubkey(), &token_account, &wallet, supply)?,
        ];
        let signature = backend
            .send_and_retry("Mint initial supply", &mint_supply, &[])
            .await?;
        println!("Token account: {token_account}");
        println!("Initial supply minted in transaction: {signature}");

        let mint_state = backend.get_token_mint(&mint.pubkey()).await?;
        let account_state = backend.get_token_account(&token_account).await?;
        let token_info = TokenInfo {
            config: TokenConfig {
                decimals: mint_state.decimals,
                ..token_config
            },
            mint_address: mint.pubkey(),
            token_account_address: token_account,
            total_supply: mint_state.supply,
            balance: account_state.amount,
            mint_authority: pubkey_option(mint_state.mint_authority),
            freeze_authority: pubkey_option(mint_state.freeze_authority),
            wallet_address: wallet,
            created_at: now_rfc3339()?,
        };
        write_json(&output, &token_info)?;
        info!(path = %output.display(), "Token information saved");

        let decimals = token_info.config.decimals;
        println!("TOKEN LAUNCH SUCCESSFUL!");
        println!(
            "   Name: {} ({})",
            token_info.config.name, token_info.config.symbol
        );
        println!("   Mint Address: {}", token_info.mint_address);
        println!("   Your Token Account: {}", token_info.token_account_address);
        println!(
            "   Total Supply: {}",
            native_amount_to_ui_amount(token_info.total_supply, decimals)
        );
        println!(
            "   Your Balance: {}",
            native_amount_to_ui_amount(token_info.balance, decimals)
        );
        println!("   Network: {}", token_info.config.network);
        if token_info.config.network == "testnet" {
            println!(
                "   Solana Explorer: https://explorer.solana.com/address/{}?cluster=testnet",
                token_info.mint_address
            );
        }
        Ok(())
    }
}

/// Tops up from the faucet when the wallet cannot pay for a launch. Never on mainnet.
async fn ensure_launch_balance(backend: &SolanaBackend, wallet: &Pubkey) -> Result<()> {
    let minimum = sol_to_lamports(MIN_LAUNCH_BALANCE_SOL);
    let mut balance = backend.get_balance(wallet).await?;
    println!("Current balance: {:.4} SOL", lamports_to_sol(balance));

    if balance < minimum && !backend.is_mainnet() {
        println!("Requesting SOL airdrop...");
        if let Err(err) = backend
            .request_airdrop_and_confirm(wallet, sol_to_lamports(LAUNCH_AIRDROP_SOL))
            .await
        {
            warn!(error = %err, "Faucet airdrop failed");
            println!("Airdrop failed. Please get SOL from: https://faucet.solana.com/");
            println!("Send SOL to: {wallet}");
        } else {
            balance = backend.get_balance(wallet).await?;
            println!(
                "Airdrop successful! New balance: {:.4} SOL",
                lamports_to_sol(balance)
            );
        }
    }

    if balance < minimum {
        bail!("Insufficient balance. Please add SOL to your wallet and try again.");
    }
    Ok(())
}

fn pubkey_option(value: COption<Pubkey>) -> Option<Pubkey> {
    match value {
        COption::Some(pubkey) => Some(pubkey),
        COption::None => None,
    }
}

#[derive(Debug, Clone, Args)]
#[command()]
pub struct CommandTokenTransfer {
    pub recipient: Pubkey,
    /// Amount in whole tokens
    #[clap(value_parser = parse_token_amount)]
    pub amount: f64,
    #[clap(long, default_value = TOKEN_INFO_PATH)]
    pub token_info: PathBuf,
}

#[async_trait]
impl Command for CommandTokenTransfer {
    async fn execute(self, backend: SolanaBackend) -> Result<()> {
        let Self {
            recipient,
            amount,
            token_info,
        } = self;
        let token_info: TokenInfo = read_json(&token_info)?;
        let mint = token_info.mint_address;
        let decimals = token_info.config.decimals;
        let wallet = backend.get_payer()?;

        println!("Transferring {amount} tokens to {recipient}...");
        let source = find_user_token_account(&wallet, &mint);
        let destination = find_user_token_account(&recipient, &mint);
        let native_amount = ui_amount_to_native_amount(amount, decimals);
        let transfer = [
            instructions::associated_token_create(&wallet, &recipient, &mint, &spl_token::ID),
            instructions::token_transfer(&source, &destination, &wallet, native_amount)?,
        ];
        let signature = backend
            .send_and_retry("Token transfer", &transfer, &[])
            .await?;

        println!("Transfer successful!");
        println!("Transaction signature: {signature}");
        Ok(())
    }
}

/// Removes the mint authority so the supply is fixed for good.
#[derive(Debug, Clone, Args)]
#[command()]
pub struct CommandTokenDisableMint {
    #[clap(long, default_value = TOKEN_INFO_PATH)]
    pub token_info: PathBuf,
}

#[async_trait]
impl Command for CommandTokenDisableMint {
    async fn execute(self, backend: SolanaBackend) -> Result<()> {
        let token_info: TokenInfo = read_json(&self.token_info)?;
        let wallet = backend.get_payer()?;

        println!("Disabling minting for {}...", token_info.mint_address);
        let instruction =
            instructions::token_disable_mint_authority(&token_info.mint_address, &wallet)?;
        let signature = backend
            .send_and_retry("Disable minting", &[instruction], &[])
            .await?;

        println!("Minting disabled! Supply is now fixed.");
        println!("Transaction signature: {signature}");
        Ok(())
    }
}

pub fn print_token_info(path: &Path) -> Result<()> {
    if !path.exists() {
        println!("No token info found. Run \"token-launch\" first.");
        return Ok(());
    }
    let token_info: TokenInfo = read_json(path)?;
    println!("Token Information:");
    println!("{}", serde_json::to_string_pretty(&token_info)?);
    Ok(())
}
