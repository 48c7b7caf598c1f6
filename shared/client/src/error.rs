use airdrop_solana_rpc::LedgerError;
use airdrop_solana_rpc::state::ALREADY_CLAIMED_ERROR_CODE;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Terminal outcome of a failed claim attempt. None of these are retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("airdrop vault is not set up")]
    VaultNotConfigured,

    #[error("failed to create the user token account: {0}")]
    AccountCreationFailed(#[source] LedgerError),

    #[error("airdrop already claimed")]
    AlreadyClaimed,

    #[error("insufficient SOL for transaction fees")]
    InsufficientFunds,

    #[error("network issue: {0}")]
    NetworkIssue(String),

    #[error("{0}")]
    Unknown(String),

    #[error("signer {got} does not match the connected identity {expected}")]
    SignerMismatch { expected: Pubkey, got: Pubkey },
}

impl ClaimError {
    pub fn classify(error: &LedgerError) -> Self {
        match error {
            LedgerError::Program {
                code: ALREADY_CLAIMED_ERROR_CODE,
                ..
            } => Self::AlreadyClaimed,
            LedgerError::AccountAlreadyInUse => Self::AlreadyClaimed,
            LedgerError::InsufficientFundsForFee | LedgerError::InsufficientFundsForRent => {
                Self::InsufficientFunds
            }
            LedgerError::Transport(_) | LedgerError::BlockhashNotFound => {
                Self::NetworkIssue(error.to_string())
            }
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether trying again later, unchanged, could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkIssue(_))
    }

    pub fn user_message(&self) -> String {
        let detail = match self {
            Self::VaultNotConfigured => "The airdrop vault is not properly configured.".to_string(),
            Self::AccountCreationFailed(err) => {
                format!("Could not create your token account ({err}).")
            }
            Self::AlreadyClaimed => "You have already claimed this airdrop.".to_string(),
            Self::InsufficientFunds => {
                "Insufficient SOL for transaction fees. Please add some SOL to your wallet."
                    .to_string()
            }
            Self::NetworkIssue(_) => "Network issue. Please try again.".to_string(),
            Self::Unknown(reason) if reason.is_empty() => "Unknown error occurred.".to_string(),
            Self::Unknown(reason) => reason.clone(),
            Self::SignerMismatch { .. } => {
                "The connected wallet cannot sign for this claim.".to_string()
            }
        };
        format!("Failed to claim airdrop. {detail}")
    }
}
