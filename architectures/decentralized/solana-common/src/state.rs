use anchor_lang::{AccountDeserialize, AnchorDeserialize};
use anchor_spl::token::{Mint, TokenAccount};
use solana_sdk::account::Account;
use solana_sdk::hash::hash;

use crate::ledger::LedgerError;

pub const VAULT_SEEDS_PREFIX: &[u8] = b"vault";

/// `AirdropError::AlreadyClaimed`, the first custom code of the airdrop program.
pub const ALREADY_CLAIMED_ERROR_CODE: u32 = 6000;
/// `SystemError::AccountAlreadyInUse`, raised when the claim record is initialized twice.
/// Other programs reuse code 0, so it only counts when the System program failed.
pub const ACCOUNT_ALREADY_IN_USE_ERROR_CODE: u32 = 0;

/// Per-user claim record owned by the airdrop program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimStatus {
    pub claimed: bool,
}

impl ClaimStatus {
    pub const SEEDS_PREFIX: &'static [u8] = b"claim";

    pub fn space_with_discriminator() -> usize {
        8 + 1
    }

    pub fn discriminator() -> [u8; 8] {
        anchor_discriminator("account:ClaimStatus")
    }

    pub fn try_from_account_data(data: &[u8]) -> Result<Self, LedgerError> {
        if data.len() < Self::space_with_discriminator() {
            return Err(LedgerError::Decode(format!(
                "claim status account is {} bytes, expected {}",
                data.len(),
                Self::space_with_discriminator()
            )));
        }
        let (discriminator, mut body) = data.split_at(8);
        if discriminator != Self::discriminator() {
            return Err(LedgerError::Decode(
                "claim status account discriminator mismatch".to_string(),
            ));
        }
        let claimed = bool::deserialize(&mut body)
            .map_err(|err| LedgerError::Decode(format!("invalid claim status: {err}")))?;
        Ok(Self { claimed })
    }

    pub fn to_account_data(&self) -> Vec<u8> {
        let mut data = Self::discriminator().to_vec();
        data.push(self.claimed as u8);
        data
    }
}

pub fn anchor_discriminator(preimage: &str) -> [u8; 8] {
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..8]);
    discriminator
}

pub fn decode_token_account(account: &Account) -> Result<TokenAccount, LedgerError> {
    TokenAccount::try_deserialize(&mut account.data.as_slice())
        .map_err(|err| LedgerError::Decode(format!("invalid token account: {err}")))
}

pub fn decode_token_mint(account: &Account) -> Result<Mint, LedgerError> {
    Mint::try_deserialize(&mut account.data.as_slice())
        .map_err(|err| LedgerError::Decode(format!("invalid token mint: {err}")))
}
