use std::sync::Arc;

use airdrop_solana_rpc::pdas::ClaimAddresses;
use airdrop_solana_rpc::{AirdropConfig, Ledger, LedgerError, instructions};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Signature, Signer};
use solana_sdk::transaction::Transaction;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::eligibility::{Eligibility, check_eligibility};
use crate::error::ClaimError;
use crate::status::WorkflowStatus;
use crate::vault::VaultState;

/// Drives one identity's claim from eligibility through on-chain confirmation.
///
/// Each awaited ledger step produces exactly one status transition, published on a
/// watch channel so a renderer only ever sees the latest state. `submit_claim`
/// borrows the workflow mutably, so a session cannot have two submissions in flight.
pub struct ClaimWorkflow<L: Ledger + ?Sized> {
    ledger: Arc<L>,
    config: AirdropConfig,
    user: Pubkey,
    eligibility: Option<Eligibility>,
    claimed: bool,
    tx_status: watch::Sender<WorkflowStatus>,
    transitions: Vec<WorkflowStatus>,
}

impl<L: Ledger + ?Sized> ClaimWorkflow<L> {
    pub fn new(ledger: Arc<L>, config: AirdropConfig, user: Pubkey) -> Self {
        let (tx_status, _) = watch::channel(WorkflowStatus::Idle);
        Self {
            ledger,
            config,
            user,
            eligibility: None,
            claimed: false,
            tx_status,
            transitions: vec![WorkflowStatus::Idle],
        }
    }

    pub fn user(&self) -> &Pubkey {
        &self.user
    }

    pub fn config(&self) -> &AirdropConfig {
        &self.config
    }

    pub fn status(&self) -> WorkflowStatus {
        self.tx_status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowStatus> {
        self.tx_status.subscribe()
    }

    /// Statuses entered by the most recent submission, starting with the one it began from.
    pub fn transitions(&self) -> &[WorkflowStatus] {
        &self.transitions
    }

    pub fn eligibility(&self) -> Option<&Eligibility> {
        self.eligibility.as_ref()
    }

    /// Locally known claim state: from the last eligibility check or our own submissions.
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    pub fn claim_action_enabled(&self, vault: &VaultState) -> bool {
        !self.tx_status.borrow().is_in_flight() && !self.claimed && vault.exists
    }

    pub async fn refresh_eligibility(&mut self) -> Eligibility {
        let previous = self.status();
        self.publish(WorkflowStatus::CheckingEligibility);
        let eligibility = self.load_eligibility().await;
        self.publish(if previous.is_terminal() {
            previous
        } else {
            WorkflowStatus::Idle
        });
        eligibility
    }

    pub async fn submit_claim<S: Signer + Sync>(
        &mut self,
        signer: &S,
    ) -> Result<Signature, ClaimError> {
        self.transitions = vec![self.status()];

        let result = self.run_claim(signer).await;
        match &result {
            Ok(signature) => {
                self.claimed = true;
                info!(user = %self.user, %signature, "Airdrop claimed");
                self.transition(WorkflowStatus::Succeeded(*signature));
            }
            Err(err) => {
                if *err == ClaimError::AlreadyClaimed {
                    self.claimed = true;
                }
                warn!(user = %self.user, error = %err, "Airdrop claim failed");
                self.transition(WorkflowStatus::Failed(err.clone()));
            }
        }
        result
    }

    async fn run_claim<S: Signer + Sync>(&mut self, signer: &S) -> Result<Signature, ClaimError> {
        let signer_pubkey = signer.pubkey();
        if signer_pubkey != self.user {
            return Err(ClaimError::SignerMismatch {
                expected: self.user,
                got: signer_pubkey,
            });
        }

        if self.claimed {
            return Err(ClaimError::AlreadyClaimed);
        }
        if self.eligibility.is_none() {
            self.transition(WorkflowStatus::CheckingEligibility);
            if self.load_eligibility().await.is_claimed() {
                return Err(ClaimError::AlreadyClaimed);
            }
        }

        let addresses = ClaimAddresses::derive(&self.config, &self.user);

        self.transition(WorkflowStatus::CheckingVault);
        match self.ledger.get_account(&addresses.vault_token_account).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(ClaimError::VaultNotConfigured),
            Err(err) => return Err(ClaimError::classify(&err)),
        }

        let user_token_account = self
            .ledger
            .get_account(&addresses.user_token_account)
            .await
            .map_err(|err| ClaimError::classify(&err))?;
        if user_token_account.is_none() {
            self.transition(WorkflowStatus::CreatingAccount);
            let instruction = instructions::associated_token_create(
                &self.user,
                &self.user,
                &self.config.mint,
                &self.config.token_program,
            );
            let signature = self
                .sign_and_send(&[instruction], signer)
                .await
                .map_err(ClaimError::AccountCreationFailed)?;
            info!(
                user = %self.user,
                token_account = %addresses.user_token_account,
                %signature,
                "Created user token account"
            );
        }

        self.transition(WorkflowStatus::Submitting);
        let instruction = instructions::airdrop_claim(&self.config, &self.user);
        self.sign_and_send(&[instruction], signer)
            .await
            .map_err(|err| ClaimError::classify(&err))
    }

    async fn load_eligibility(&mut self) -> Eligibility {
        let eligibility = check_eligibility(self.ledger.as_ref(), &self.config, &self.user).await;
        if eligibility.is_claimed() {
            self.claimed = true;
        }
        self.eligibility = Some(eligibility.clone());
        eligibility
    }

    async fn sign_and_send<S: Signer + Sync>(
        &self,
        instructions: &[Instruction],
        signer: &S,
    ) -> Result<Signature, LedgerError> {
        let blockhash = self.ledger.get_latest_blockhash().await?;
        let transaction =
            Transaction::new_signed_with_payer(instructions, Some(&self.user), &[signer], blockhash);
        self.ledger.send_and_confirm_transaction(&transaction).await
    }

    fn transition(&mut self, status: WorkflowStatus) {
        self.transitions.push(status.clone());
        self.publish(status);
    }

    fn publish(&self, status: WorkflowStatus) {
        debug!(user = %self.user, %status, "Claim workflow status");
        self.tx_status.send_replace(status);
    }
}
