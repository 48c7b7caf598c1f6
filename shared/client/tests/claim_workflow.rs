use std::sync::Arc;

use airdrop_client::testing::{MemoryLedger, SentTransaction};
use airdrop_client::{ClaimError, ClaimWorkflow, Eligibility, WorkflowStatus, inspect_vault};
use airdrop_solana_rpc::pdas::{ClaimAddresses, find_claim_status};
use airdrop_solana_rpc::state::ClaimStatus;
use airdrop_solana_rpc::{AirdropConfig, LedgerError};
use pretty_assertions::assert_eq;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;

const VAULT_CLAIMS: u64 = 100;

fn setup() -> (Arc<MemoryLedger>, Keypair, AirdropConfig) {
    let config = AirdropConfig::default();
    let ledger = Arc::new(MemoryLedger::new(config.clone()));
    let user = Keypair::new();
    ledger.fund(&user.pubkey(), LAMPORTS_PER_SOL);
    (ledger, user, config)
}

fn workflow(
    ledger: &Arc<MemoryLedger>,
    user: &Keypair,
    config: &AirdropConfig,
) -> ClaimWorkflow<MemoryLedger> {
    ClaimWorkflow::new(ledger.clone(), config.clone(), user.pubkey())
}

#[test_log::test(tokio::test)]
async fn missing_vault_fails_before_any_transaction() {
    let (ledger, user, config) = setup();
    let mut workflow = workflow(&ledger, &user, &config);

    assert_eq!(workflow.refresh_eligibility().await, Eligibility::NotFound);

    let vault = inspect_vault(ledger.as_ref(), &config).await;
    assert!(!vault.exists);
    assert!(!workflow.claim_action_enabled(&vault));

    let result = workflow.submit_claim(&user).await;
    assert_eq!(result, Err(ClaimError::VaultNotConfigured));
    assert_eq!(
        workflow.transitions(),
        &[
            WorkflowStatus::Idle,
            WorkflowStatus::CheckingVault,
            WorkflowStatus::Failed(ClaimError::VaultNotConfigured),
        ]
    );
    assert_eq!(
        workflow.status(),
        WorkflowStatus::Failed(ClaimError::VaultNotConfigured)
    );
    assert!(ledger.submissions().is_empty());
    assert!(!workflow.is_claimed());
}

#[test_log::test(tokio::test)]
async fn first_claim_creates_token_account_then_claims() {
    let (ledger, user, config) = setup();
    let vault_token_account = ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    let addresses = ClaimAddresses::derive(&config, &user.pubkey());
    let mut workflow = workflow(&ledger, &user, &config);

    // Eligibility comes first and is cached
    assert_eq!(workflow.refresh_eligibility().await, Eligibility::NotFound);
    assert_eq!(workflow.status(), WorkflowStatus::Idle);

    let vault = inspect_vault(ledger.as_ref(), &config).await;
    assert!(vault.exists);
    assert_eq!(vault.balance, config.claim_amount * VAULT_CLAIMS);
    assert!(workflow.claim_action_enabled(&vault));

    let signature = workflow.submit_claim(&user).await.unwrap();

    assert_eq!(
        workflow.transitions(),
        &[
            WorkflowStatus::Idle,
            WorkflowStatus::CheckingVault,
            WorkflowStatus::CreatingAccount,
            WorkflowStatus::Submitting,
            WorkflowStatus::Succeeded(signature),
        ]
    );
    assert_eq!(
        ledger.submissions(),
        vec![
            SentTransaction::CreateTokenAccount {
                owner: user.pubkey(),
                mint: config.mint,
            },
            SentTransaction::Claim {
                user: user.pubkey()
            },
        ]
    );

    // Tokens moved and the claim record exists
    assert_eq!(
        ledger.token_amount(&addresses.user_token_account),
        Some(config.claim_amount)
    );
    assert_eq!(
        ledger.token_amount(&vault_token_account),
        Some(config.claim_amount * (VAULT_CLAIMS - 1))
    );
    assert_eq!(
        ledger.claim_status(&user.pubkey()),
        Some(ClaimStatus { claimed: true })
    );
    assert!(workflow.is_claimed());

    let vault = inspect_vault(ledger.as_ref(), &config).await;
    assert!(!workflow.claim_action_enabled(&vault));
}

#[test_log::test(tokio::test)]
async fn existing_token_account_skips_creation() {
    let (ledger, user, config) = setup();
    ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    let user_token_account = ledger.add_token_account(&user.pubkey(), &config.mint, 5);
    let mut workflow = workflow(&ledger, &user, &config);
    workflow.refresh_eligibility().await;

    let signature = workflow.submit_claim(&user).await.unwrap();

    assert_eq!(
        workflow.transitions(),
        &[
            WorkflowStatus::Idle,
            WorkflowStatus::CheckingVault,
            WorkflowStatus::Submitting,
            WorkflowStatus::Succeeded(signature),
        ]
    );
    assert_eq!(
        ledger.submissions(),
        vec![SentTransaction::Claim {
            user: user.pubkey()
        }]
    );
    assert_eq!(
        ledger.token_amount(&user_token_account),
        Some(config.claim_amount + 5)
    );
}

#[test_log::test(tokio::test)]
async fn recorded_claim_blocks_submission_without_ledger_calls() {
    let (ledger, user, config) = setup();
    ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    let claim_status = ledger.set_claim_status(&user.pubkey(), true);
    let mut workflow = workflow(&ledger, &user, &config);

    let eligibility = workflow.refresh_eligibility().await;
    assert!(eligibility.is_claimed());
    assert_eq!(eligibility.user_message(), "You have already claimed the airdrop!");
    match eligibility {
        Eligibility::Recorded(record) => assert_eq!(record.address, claim_status),
        other => panic!("unexpected eligibility {other:?}"),
    }

    let vault = inspect_vault(ledger.as_ref(), &config).await;
    assert!(vault.exists);
    assert!(!workflow.claim_action_enabled(&vault));

    let requests = ledger.request_count();
    let result = workflow.submit_claim(&user).await;
    assert_eq!(result, Err(ClaimError::AlreadyClaimed));
    assert_eq!(ledger.request_count(), requests);
    assert!(ledger.submissions().is_empty());
    assert_eq!(
        workflow.transitions(),
        &[
            WorkflowStatus::Idle,
            WorkflowStatus::Failed(ClaimError::AlreadyClaimed),
        ]
    );
}

#[test_log::test(tokio::test)]
async fn unchecked_eligibility_is_checked_during_submission() {
    let (ledger, user, config) = setup();
    ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    let mut workflow = workflow(&ledger, &user, &config);
    assert_eq!(workflow.eligibility(), None);

    let signature = workflow.submit_claim(&user).await.unwrap();

    assert_eq!(
        workflow.transitions(),
        &[
            WorkflowStatus::Idle,
            WorkflowStatus::CheckingEligibility,
            WorkflowStatus::CheckingVault,
            WorkflowStatus::CreatingAccount,
            WorkflowStatus::Submitting,
            WorkflowStatus::Succeeded(signature),
        ]
    );
    assert_eq!(workflow.eligibility(), Some(&Eligibility::NotFound));
}

#[test_log::test(tokio::test)]
async fn unchecked_eligibility_finds_existing_claim() {
    let (ledger, user, config) = setup();
    ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    ledger.set_claim_status(&user.pubkey(), true);
    let mut workflow = workflow(&ledger, &user, &config);

    let result = workflow.submit_claim(&user).await;

    assert_eq!(result, Err(ClaimError::AlreadyClaimed));
    assert_eq!(
        workflow.transitions(),
        &[
            WorkflowStatus::Idle,
            WorkflowStatus::CheckingEligibility,
            WorkflowStatus::Failed(ClaimError::AlreadyClaimed),
        ]
    );
    assert!(ledger.submissions().is_empty());
}

#[test_log::test(tokio::test)]
async fn second_submission_after_success_is_rejected_locally() {
    let (ledger, user, config) = setup();
    ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    let mut workflow = workflow(&ledger, &user, &config);
    workflow.refresh_eligibility().await;
    let signature = workflow.submit_claim(&user).await.unwrap();

    let requests = ledger.request_count();
    let result = workflow.submit_claim(&user).await;

    assert_eq!(result, Err(ClaimError::AlreadyClaimed));
    assert_eq!(ledger.request_count(), requests);
    assert_eq!(
        workflow.transitions(),
        &[
            WorkflowStatus::Succeeded(signature),
            WorkflowStatus::Failed(ClaimError::AlreadyClaimed),
        ]
    );
}

#[test_log::test(tokio::test)]
async fn claim_recorded_by_another_session_maps_to_already_claimed() {
    let (ledger, user, config) = setup();
    ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    let mut workflow = workflow(&ledger, &user, &config);
    assert_eq!(workflow.refresh_eligibility().await, Eligibility::NotFound);

    // Another session claims between the eligibility check and submission
    ledger.set_claim_status(&user.pubkey(), true);

    let result = workflow.submit_claim(&user).await;

    assert_eq!(result, Err(ClaimError::AlreadyClaimed));
    assert!(workflow.is_claimed());
    assert_eq!(
        workflow.status(),
        WorkflowStatus::Failed(ClaimError::AlreadyClaimed)
    );
    assert_eq!(ledger.submissions().len(), 2);
}

#[test_log::test(tokio::test)]
async fn token_account_creation_failure_aborts_the_claim() {
    let (ledger, user, config) = setup();
    ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    let mut workflow = workflow(&ledger, &user, &config);
    workflow.refresh_eligibility().await;
    ledger.fail_next_submission(LedgerError::Transport("connection reset".to_string()));

    let result = workflow.submit_claim(&user).await;

    let expected = ClaimError::AccountCreationFailed(LedgerError::Transport(
        "connection reset".to_string(),
    ));
    assert_eq!(result, Err(expected.clone()));
    assert_eq!(
        workflow.transitions(),
        &[
            WorkflowStatus::Idle,
            WorkflowStatus::CheckingVault,
            WorkflowStatus::CreatingAccount,
            WorkflowStatus::Failed(expected),
        ]
    );
    assert_eq!(
        ledger.submissions(),
        vec![SentTransaction::CreateTokenAccount {
            owner: user.pubkey(),
            mint: config.mint,
        }]
    );
    assert_eq!(ledger.claim_status(&user.pubkey()), None);
    assert!(!workflow.is_claimed());
}

#[test_log::test(tokio::test)]
async fn unfunded_identity_reports_insufficient_funds() {
    let config = AirdropConfig::default();
    let ledger = Arc::new(MemoryLedger::new(config.clone()));
    let user = Keypair::new();
    ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    ledger.add_token_account(&user.pubkey(), &config.mint, 0);
    let mut workflow = workflow(&ledger, &user, &config);
    workflow.refresh_eligibility().await;

    let result = workflow.submit_claim(&user).await;

    assert_eq!(result, Err(ClaimError::InsufficientFunds));
    assert_eq!(
        workflow.status().to_string(),
        "Failed to claim airdrop. Insufficient SOL for transaction fees. Please add some SOL to your wallet."
    );
    assert_eq!(ledger.claim_status(&user.pubkey()), None);
}

#[test_log::test(tokio::test)]
async fn transient_vault_lookup_is_a_network_issue_and_can_be_retried() {
    let (ledger, user, config) = setup();
    let vault_token_account = ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    ledger.fail_lookup(
        &vault_token_account,
        LedgerError::Transport("timed out".to_string()),
    );
    let mut workflow = workflow(&ledger, &user, &config);
    workflow.refresh_eligibility().await;

    let vault = inspect_vault(ledger.as_ref(), &config).await;
    assert!(!vault.exists);
    assert!(vault.lookup_error.is_some());

    let error = workflow.submit_claim(&user).await.unwrap_err();
    assert_eq!(
        error,
        ClaimError::NetworkIssue("RPC transport failure: timed out".to_string())
    );
    assert!(error.is_retryable());
    assert!(ledger.submissions().is_empty());

    // Re-invoking starts over from the failed status
    ledger.clear_lookup_failure(&vault_token_account);
    let signature = workflow.submit_claim(&user).await.unwrap();
    assert_eq!(workflow.transitions()[0], WorkflowStatus::Failed(error));
    assert_eq!(
        workflow.transitions().last(),
        Some(&WorkflowStatus::Succeeded(signature))
    );
}

#[test_log::test(tokio::test)]
async fn failed_eligibility_lookup_still_allows_claiming() {
    let (ledger, user, config) = setup();
    ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    let (claim_status, _) = find_claim_status(&config.program_id, &user.pubkey());
    ledger.fail_lookup(
        &claim_status,
        LedgerError::Rpc("node is behind".to_string()),
    );
    let mut workflow = workflow(&ledger, &user, &config);

    let eligibility = workflow.refresh_eligibility().await;
    assert_eq!(
        eligibility,
        Eligibility::LookupFailed("RPC error: node is behind".to_string())
    );
    assert!(!eligibility.is_claimed());

    workflow.submit_claim(&user).await.unwrap();
    assert_eq!(
        ledger.claim_status(&user.pubkey()),
        Some(ClaimStatus { claimed: true })
    );
}

#[test_log::test(tokio::test)]
async fn foreign_signer_is_rejected_before_touching_the_ledger() {
    let (ledger, user, config) = setup();
    ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    let mut workflow = workflow(&ledger, &user, &config);
    let stranger = Keypair::new();

    let requests = ledger.request_count();
    let result = workflow.submit_claim(&stranger).await;

    assert_eq!(
        result,
        Err(ClaimError::SignerMismatch {
            expected: user.pubkey(),
            got: stranger.pubkey(),
        })
    );
    assert_eq!(ledger.request_count(), requests);
    assert!(ledger.submissions().is_empty());
}

#[test_log::test(tokio::test)]
async fn subscribers_observe_the_latest_status() {
    let (ledger, user, config) = setup();
    ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    let mut workflow = workflow(&ledger, &user, &config);
    let mut status = workflow.subscribe();
    assert_eq!(*status.borrow_and_update(), WorkflowStatus::Idle);

    let signature = workflow.submit_claim(&user).await.unwrap();

    assert!(status.has_changed().unwrap());
    assert_eq!(
        *status.borrow_and_update(),
        WorkflowStatus::Succeeded(signature)
    );
}

#[test_log::test(tokio::test)]
async fn refreshing_eligibility_keeps_a_terminal_status() {
    let (ledger, user, config) = setup();
    let mut workflow = workflow(&ledger, &user, &config);
    workflow.refresh_eligibility().await;
    workflow.submit_claim(&user).await.unwrap_err();

    workflow.refresh_eligibility().await;

    assert_eq!(
        workflow.status(),
        WorkflowStatus::Failed(ClaimError::VaultNotConfigured)
    );
}

#[test_log::test(tokio::test)]
async fn custom_error_zero_from_another_program_is_not_a_duplicate() {
    let (ledger, user, config) = setup();
    ledger.add_vault(config.claim_amount * VAULT_CLAIMS);
    ledger.add_token_account(&user.pubkey(), &config.mint, 0);
    let mut workflow = workflow(&ledger, &user, &config);
    assert_eq!(workflow.user(), &user.pubkey());
    assert_eq!(workflow.config(), &config);

    assert_eq!(workflow.refresh_eligibility().await, Eligibility::NotFound);
    // SPL token's NotRentExempt surfacing through the claim CPI
    ledger.fail_next_submission(LedgerError::Program {
        instruction: Some(0),
        code: 0,
    });

    let result = workflow.submit_claim(&user).await;

    let expected = ClaimError::Unknown("custom program error: 0x0".to_string());
    assert_eq!(result, Err(expected.clone()));
    assert_eq!(
        workflow.transitions(),
        &[
            WorkflowStatus::Idle,
            WorkflowStatus::CheckingVault,
            WorkflowStatus::Submitting,
            WorkflowStatus::Failed(expected),
        ]
    );
    assert!(!workflow.is_claimed());
    assert_eq!(ledger.claim_status(&user.pubkey()), None);
}
