use std::path::PathBuf;

use crate::{ConfigArgs, parse_token_amount};
use crate::commands::Command;
use crate::files::{VAULT_INFO_PATH, VaultInfo, now_rfc3339, write_json};
use airdrop_client::inspect_vault;
use airdrop_solana_rpc::SolanaBackend;
use airdrop_solana_rpc::instructions;
use airdrop_solana_rpc::pdas::{
    find_user_token_account, find_vault, find_vault_authority, find_vault_token_account,
};
use airdrop_solana_rpc::utils::{native_amount_to_ui_amount, ui_amount_to_native_amount};
use anyhow::{Result, bail};
use async_trait::async_trait;
use clap::Args;
use tracing::info;

#[derive(Debug, Clone, Args)]
#[command()]
pub struct CommandVaultStatus {
    #[clap(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl Command for CommandVaultStatus {
    async fn execute(self, backend: SolanaBackend) -> Result<()> {
        let config = self.config.load()?;
        let vault = inspect_vault(&backend, &config).await;

        println!("Vault PDA: {}", vault.vault);
        println!("Vault Token Account: {}", vault.token_account);
        if vault.exists {
            println!(
                "Vault ready: {} {}",
                vault.ui_balance(config.decimals),
                config.symbol
            );
            let claims_left = vault.balance / config.claim_amount;
            println!("Claims left at {} per claim: {claims_left}", config.ui_claim_amount());
        } else if let Some(reason) = &vault.lookup_error {
            println!("Vault status unknown, lookup failed: {reason}");
        } else {
            println!("Vault not found. Run vault-setup first.");
        }
        Ok(())
    }
}

/// Creates the vault token account if needed and funds it from the wallet.
#[derive(Debug, Clone, Args)]
#[command()]
pub struct CommandVaultSetup {
    #[clap(flatten)]
    pub config: ConfigArgs,
    /// Whole tokens to move from the wallet into the vault
    #[clap(
        long,
        env = "VAULT_AMOUNT",
        default_value_t = 1_000_000.0,
        value_parser = parse_token_amount
    )]
    pub amount: f64,
    #[clap(long, default_value = VAULT_INFO_PATH)]
    pub output: PathBuf,
    #[clap(long, env, default_value = "testnet")]
    pub network: String,
}

#[async_trait]
impl Command for CommandVaultSetup {
    async fn execute(self, backend: SolanaBackend) -> Result<()> {
        let Self {
            config,
            amount,
            output,
            network,
        } = self;
        let config = config.load()?;
        let payer = backend.get_payer()?;

        println!("Setting up vault for airdrop program...");
        println!("Program ID: {}", config.program_id);
        println!("Token Mint: {}", config.mint);
        println!("Wallet: {payer}");

        let (vault, vault_bump) = find_vault(&config.program_id);
        let (vault_authority, vault_authority_bump) = find_vault_authority(&config.program_id);
        let vault_token_account = find_vault_token_account(&config.program_id, &config.mint);
        let wallet_token_account = find_user_token_account(&payer, &config.mint);
        println!("Vault PDA: {vault}");
        println!("Vault Authority PDA: {vault_authority}");
        println!("Wallet Token Account: {wallet_token_account}");
        println!("Vault Token Account: {vault_token_account}");

        let native_amount = ui_amount_to_native_amount(amount, config.decimals);
        if native_amount == 0 {
            bail!(
                "{amount} tokens is below the smallest unit at {} decimals",
                config.decimals
            );
        }
        let wallet_balance = backend
            .get_token_account(&wallet_token_account)
            .await?
            .amount;
        if wallet_balance < native_amount {
            bail!(
                "Wallet holds {} tokens, cannot move {} into the vault",
                native_amount_to_ui_amount(wallet_balance, config.decimals),
                amount
            );
        }

        let mut vault_instructions = Vec::with_capacity(2);
        if backend.account_exists(&vault_token_account).await? {
            println!("Vault token account already exists");
        } else {
            println!("Creating vault token account...");
            vault_instructions.push(instructions::associated_token_create(
                &payer,
                &vault,
                &config.mint,
                &config.token_program,
            ));
        }
        vault_instructions.push(instructions::token_transfer(
            &wallet_token_account,
            &vault_token_account,
            &payer,
            native_amount,
        )?);

        let signature = backend
            .send_and_retry("Vault setup", &vault_instructions, &[])
            .await?;
        println!("Transaction confirmed: {signature}");

        let vault_info = VaultInfo {
            program_id: config.program_id,
            token_mint: config.mint,
            vault_pda: vault,
            vault_authority_pda: vault_authority,
            vault_token_account,
            vault_bump,
            vault_authority_bump,
            amount: native_amount,
            network,
            setup_at: now_rfc3339()?,
        };
        write_json(&output, &vault_info)?;
        info!(path = %output.display(), "Vault info saved");

        println!("Vault setup complete!");
        println!("Vault Token Account: {vault_token_account}");
        println!(
            "Amount transferred: {} tokens",
            native_amount_to_ui_amount(native_amount, config.decimals)
        );
        Ok(())
    }
}
