use std::sync::Arc;

use crate::ConfigArgs;
use crate::commands::Command;
use airdrop_client::{ClaimWorkflow, Eligibility, WorkflowStatus, check_eligibility, inspect_vault};
use airdrop_solana_rpc::SolanaBackend;
use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::Signer;

#[derive(Debug, Clone, Args)]
#[command()]
pub struct CommandClaimStatus {
    #[clap(flatten)]
    pub config: ConfigArgs,
    /// Identity to check, defaults to the wallet
    #[clap(long, env)]
    pub address: Option<Pubkey>,
}

#[async_trait]
impl Command for CommandClaimStatus {
    async fn execute(self, backend: SolanaBackend) -> Result<()> {
        let config = self.config.load()?;
        let user = match self.address {
            Some(address) => address,
            None => backend.get_payer()?,
        };
        println!("Identity: {user}");

        let eligibility = check_eligibility(&backend, &config, &user).await;
        match &eligibility {
            Eligibility::Recorded(record) => println!("Claim record: {}", record.address),
            Eligibility::LookupFailed(reason) => println!("Claim record lookup failed: {reason}"),
            Eligibility::NotFound => {}
        }
        println!("{}", eligibility.user_message());
        Ok(())
    }
}

/// Claims the airdrop for the wallet, printing each step as it happens.
#[derive(Debug, Clone, Args)]
#[command()]
pub struct CommandClaim {
    #[clap(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl Command for CommandClaim {
    async fn execute(self, backend: SolanaBackend) -> Result<()> {
        let config = self.config.load()?;
        let payer = backend.payer()?;
        let user = payer.pubkey();

        let vault = inspect_vault(&backend, &config).await;
        if vault.exists {
            println!(
                "Vault balance: {} {}",
                vault.ui_balance(config.decimals),
                config.symbol
            );
        }

        let mut workflow = ClaimWorkflow::new(Arc::new(backend), config, user);
        println!(
            "Claiming {} {} for {}",
            workflow.config().ui_claim_amount(),
            workflow.config().symbol,
            workflow.user()
        );
        let mut status = workflow.subscribe();
        let printer = tokio::spawn(async move {
            while status.changed().await.is_ok() {
                let current = status.borrow_and_update().clone();
                if current != WorkflowStatus::Idle {
                    println!("{current}");
                }
            }
        });

        let eligibility = workflow.refresh_eligibility().await;
        println!("{}", eligibility.user_message());
        let result = workflow.submit_claim(payer.as_ref()).await;

        // Dropping the workflow closes the status stream and ends the printer.
        drop(workflow);
        printer.await?;

        let signature = result?;
        println!("Signature: {signature}");
        Ok(())
    }
}
