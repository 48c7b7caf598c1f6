use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use solana_client::rpc_response::RpcSimulateTransactionResult;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::InstructionError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::system_program;
use solana_sdk::transaction::{Transaction, TransactionError};
use thiserror::Error;

/// Failures coming back from the ledger, reduced to what callers branch on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("RPC transport failure: {0}")]
    Transport(String),

    #[error("blockhash not found")]
    BlockhashNotFound,

    #[error("insufficient funds for fee")]
    InsufficientFundsForFee,

    #[error("insufficient funds for rent")]
    InsufficientFundsForRent,

    #[error("account already in use")]
    AccountAlreadyInUse,

    /// `instruction` is the top-level instruction index when the ledger reported it.
    /// Failures inside a CPI are attributed to the calling instruction.
    #[error("custom program error: {code:#x}")]
    Program { instruction: Option<u8>, code: u32 },

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error("failed to decode account: {0}")]
    Decode(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

impl LedgerError {
    /// Whether resending the same request can succeed without user action.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::BlockhashNotFound)
    }

    /// Fallback for failures that only carry text, e.g. wallet or middleware errors.
    pub fn from_message(message: &str) -> Self {
        let lowercase = message.to_lowercase();
        if lowercase.contains("already in use") {
            Self::AccountAlreadyInUse
        } else if let Some(code) = parse_custom_program_error(&lowercase) {
            Self::Program {
                instruction: parse_instruction_index(&lowercase),
                code,
            }
        } else if lowercase.contains("alreadyclaimed") || lowercase.contains("already claimed") {
            Self::Program {
                instruction: None,
                code: crate::state::ALREADY_CLAIMED_ERROR_CODE,
            }
        } else if lowercase.contains("insufficient funds for rent") {
            Self::InsufficientFundsForRent
        } else if lowercase.contains("insufficient funds") {
            Self::InsufficientFundsForFee
        } else if lowercase.contains("blockhash") {
            Self::BlockhashNotFound
        } else if lowercase.contains("timed out")
            || lowercase.contains("connection")
            || lowercase.contains("error sending request")
        {
            Self::Transport(message.to_string())
        } else {
            Self::Rpc(message.to_string())
        }
    }
}

fn parse_custom_program_error(message: &str) -> Option<u32> {
    let (_, rest) = message.split_once("custom program error: 0x")?;
    let hex: String = rest
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    u32::from_str_radix(&hex, 16).ok()
}

fn parse_instruction_index(message: &str) -> Option<u8> {
    let (_, rest) = message.split_once("error processing instruction ")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Whether the System program itself failed, e.g. the `create_account` behind an
/// Anchor `init` hitting an existing address.
fn system_program_failed(logs: &[String]) -> bool {
    let prefix = format!("Program {} failed", system_program::ID);
    logs.iter()
        .any(|line| line.starts_with(&prefix) || line.contains("already in use"))
}

fn preflight_logs(err: &ClientError) -> Option<&[String]> {
    match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            data:
                RpcResponseErrorData::SendTransactionPreflightFailure(RpcSimulateTransactionResult {
                    logs: Some(logs),
                    ..
                }),
            ..
        }) => Some(logs.as_slice()),
        _ => None,
    }
}

impl From<TransactionError> for LedgerError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::BlockhashNotFound => Self::BlockhashNotFound,
            TransactionError::InsufficientFundsForFee => Self::InsufficientFundsForFee,
            TransactionError::InsufficientFundsForRent { .. } => Self::InsufficientFundsForRent,
            TransactionError::AccountInUse => Self::AccountAlreadyInUse,
            TransactionError::InstructionError(index, InstructionError::Custom(code)) => {
                Self::Program {
                    instruction: Some(index),
                    code,
                }
            }
            TransactionError::InstructionError(_, InstructionError::AccountAlreadyInitialized) => {
                Self::AccountAlreadyInUse
            }
            TransactionError::InstructionError(_, InstructionError::InsufficientFunds) => {
                Self::InsufficientFundsForFee
            }
            other => Self::TransactionFailed(other.to_string()),
        }
    }
}

impl From<ClientError> for LedgerError {
    fn from(err: ClientError) -> Self {
        if let Some(transaction_error) = err.get_transaction_error() {
            let mapped = Self::from(transaction_error);
            // Custom codes are per program, so 0x0 only means "in use" coming from System.
            if let Self::Program {
                code: crate::state::ACCOUNT_ALREADY_IN_USE_ERROR_CODE,
                ..
            } = mapped
            {
                if preflight_logs(&err).is_some_and(system_program_failed) {
                    return Self::AccountAlreadyInUse;
                }
            }
            return mapped;
        }
        match err.kind() {
            ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
                Self::Transport(err.to_string())
            }
            _ => Self::from_message(&err.to_string()),
        }
    }
}

/// The slice of the Solana RPC surface the airdrop client depends on.
///
/// `get_account` distinguishes a confirmed-absent account (`Ok(None)`) from a
/// failed lookup (`Err`); callers decide how much of that distinction to keep.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError>;

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, LedgerError>;

    /// Sends a fully signed transaction and waits for confirmation.
    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, LedgerError>;

    async fn get_version(&self) -> Result<String, LedgerError>;
}
