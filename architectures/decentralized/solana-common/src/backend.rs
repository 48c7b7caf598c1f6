use std::sync::Arc;

use anchor_client::Cluster;
use anchor_spl::token::{Mint, TokenAccount};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use backon::Retryable;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use tracing::{debug, info, warn};

use crate::ledger::{Ledger, LedgerError};
use crate::retry::transient_backoff;
use crate::state::{decode_token_account, decode_token_mint};

/// RPC-backed ledger handle shared by the claim workflow and the operator commands.
#[derive(Clone)]
pub struct SolanaBackend {
    rpc: Arc<RpcClient>,
    cluster: Cluster,
    payer: Option<Arc<Keypair>>,
}

impl SolanaBackend {
    pub fn new(cluster: Cluster, payer: Option<Arc<Keypair>>, commitment: CommitmentConfig) -> Self {
        let rpc = RpcClient::new_with_commitment(cluster.url().to_string(), commitment);
        Self {
            rpc: Arc::new(rpc),
            cluster,
            payer,
        }
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(self.cluster, Cluster::Mainnet) || self.cluster.url().contains("mainnet")
    }

    pub fn payer(&self) -> Result<Arc<Keypair>> {
        self.payer.clone().ok_or_else(|| {
            anyhow!(
                "No wallet private key! Must pass --wallet-private-key-path or set RAW_WALLET_PRIVATE_KEY"
            )
        })
    }

    pub fn get_payer(&self) -> Result<Pubkey> {
        Ok(self.payer()?.pubkey())
    }

    pub async fn account_exists(&self, address: &Pubkey) -> Result<bool> {
        Ok(self.get_account(address).await?.is_some())
    }

    pub async fn get_token_account(&self, address: &Pubkey) -> Result<TokenAccount> {
        let account = self
            .get_account(address)
            .await?
            .with_context(|| format!("Token account {address} does not exist"))?;
        Ok(decode_token_account(&account)?)
    }

    pub async fn get_token_mint(&self, address: &Pubkey) -> Result<Mint> {
        let account = self
            .get_account(address)
            .await?
            .with_context(|| format!("Token mint {address} does not exist"))?;
        Ok(decode_token_mint(&account)?)
    }

    pub async fn get_minimum_balance_for_rent_exemption(&self, space: usize) -> Result<u64> {
        self.rpc
            .get_minimum_balance_for_rent_exemption(space)
            .await
            .context("Failed to fetch rent exemption minimum")
    }

    pub async fn request_airdrop_and_confirm(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<Signature> {
        let signature = self
            .rpc
            .request_airdrop(address, lamports)
            .await
            .map_err(LedgerError::from)
            .context("Failed to request airdrop")?;
        info!(%address, lamports, %signature, "Airdrop requested, waiting for confirmation");
        self.rpc
            .poll_for_signature(&signature)
            .await
            .map_err(LedgerError::from)
            .with_context(|| format!("Airdrop {signature} was not confirmed"))?;
        Ok(signature)
    }

    /// Signs with the payer plus `signers`, sends, and retries transient failures.
    pub async fn send_and_retry(
        &self,
        label: &str,
        instructions: &[Instruction],
        signers: &[&Keypair],
    ) -> Result<Signature> {
        let payer = self.payer()?;
        let payer: &Keypair = &payer;

        let signature = (move || async move {
            let blockhash = self.get_latest_blockhash().await?;
            let mut all_signers: Vec<&Keypair> = vec![payer];
            all_signers.extend(signers.iter().copied());
            let transaction = Transaction::new_signed_with_payer(
                instructions,
                Some(&payer.pubkey()),
                &all_signers,
                blockhash,
            );
            self.send_and_confirm_transaction(&transaction).await
        })
        .retry(transient_backoff())
        .when(|err: &LedgerError| err.is_transient())
        .notify(|err: &LedgerError, delay| {
            warn!(label, error = %err, ?delay, "Transient failure, retrying");
        })
        .await
        .with_context(|| format!("{label} failed"))?;

        info!(label, %signature, "Transaction confirmed");
        Ok(signature)
    }
}

#[async_trait]
impl Ledger for SolanaBackend {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        debug!(%address, "Fetching account");
        let response = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError> {
        Ok(self.rpc.get_balance(address).await?)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(self.rpc.get_latest_blockhash().await?)
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, LedgerError> {
        Ok(self.rpc.send_and_confirm_transaction(transaction).await?)
    }

    async fn get_version(&self) -> Result<String, LedgerError> {
        Ok(self.rpc.get_version().await?.solana_core)
    }
}
