use airdrop_solana_rpc::pdas::find_vault;
use airdrop_solana_rpc::state::decode_token_account;
use airdrop_solana_rpc::utils::native_amount_to_ui_amount;
use airdrop_solana_rpc::{AirdropConfig, Ledger};
use anchor_spl::associated_token;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultState {
    pub vault: Pubkey,
    pub token_account: Pubkey,
    pub exists: bool,
    pub balance: u64,
    /// Set when `exists` is false because the lookup failed rather than because
    /// the account is missing.
    pub lookup_error: Option<String>,
}

impl VaultState {
    pub fn ui_balance(&self, decimals: u8) -> f64 {
        native_amount_to_ui_amount(self.balance, decimals)
    }

    pub fn can_pay(&self, amount: u64) -> bool {
        self.exists && self.balance >= amount
    }
}

pub async fn inspect_vault<L: Ledger + ?Sized>(ledger: &L, config: &AirdropConfig) -> VaultState {
    let (vault, _) = find_vault(&config.program_id);
    let token_account = associated_token::get_associated_token_address(&vault, &config.mint);
    let mut state = VaultState {
        vault,
        token_account,
        exists: false,
        balance: 0,
        lookup_error: None,
    };

    let lookup = ledger
        .get_account(&token_account)
        .await
        .and_then(|account| account.map(|account| decode_token_account(&account)).transpose());
    match lookup {
        Ok(Some(account)) => {
            state.exists = true;
            state.balance = account.amount;
            debug!(%token_account, balance = state.balance, "Vault ready");
        }
        Ok(None) => debug!(%token_account, "Vault token account not found"),
        Err(err) => {
            warn!(%token_account, error = %err, "Vault lookup failed");
            state.lookup_error = Some(err.to_string());
        }
    }
    state
}
