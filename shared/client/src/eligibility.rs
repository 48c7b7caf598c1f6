use airdrop_solana_rpc::pdas::find_claim_status;
use airdrop_solana_rpc::state::ClaimStatus;
use airdrop_solana_rpc::{AirdropConfig, Ledger};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRecord {
    pub address: Pubkey,
    pub claimed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// No claim record on chain: the identity has never claimed.
    NotFound,
    Recorded(ClaimRecord),
    /// The ledger could not answer. Treated as unclaimed, but worth re-checking.
    LookupFailed(String),
}

impl Eligibility {
    pub fn is_claimed(&self) -> bool {
        matches!(self, Self::Recorded(ClaimRecord { claimed: true, .. }))
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Recorded(ClaimRecord { claimed: true, .. }) => {
                "You have already claimed the airdrop!"
            }
            Self::NotFound | Self::Recorded(_) => "You are eligible to claim the airdrop!",
            Self::LookupFailed(_) => {
                "You are eligible to claim the airdrop! (claim status could not be confirmed)"
            }
        }
    }
}

/// Looks up the claim record of `user`. Never fails; lookup problems become `LookupFailed`.
pub async fn check_eligibility<L: Ledger + ?Sized>(
    ledger: &L,
    config: &AirdropConfig,
    user: &Pubkey,
) -> Eligibility {
    let (address, _) = find_claim_status(&config.program_id, user);
    let account = match ledger.get_account(&address).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            debug!(%user, %address, "No claim record");
            return Eligibility::NotFound;
        }
        Err(err) => {
            warn!(%user, %address, error = %err, "Claim record lookup failed");
            return Eligibility::LookupFailed(err.to_string());
        }
    };
    match ClaimStatus::try_from_account_data(&account.data) {
        Ok(status) => Eligibility::Recorded(ClaimRecord {
            address,
            claimed: status.claimed,
        }),
        Err(err) => {
            warn!(%user, %address, error = %err, "Claim record is unreadable");
            Eligibility::LookupFailed(err.to_string())
        }
    }
}
