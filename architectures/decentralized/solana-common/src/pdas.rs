use anchor_spl::associated_token;
use solana_sdk::pubkey::Pubkey;

use crate::config::AirdropConfig;
use crate::state::{ClaimStatus, VAULT_SEEDS_PREFIX};

pub fn find_vault(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEEDS_PREFIX], program_id)
}

// The program signs vault transfers with the same seed it holds tokens under
pub fn find_vault_authority(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEEDS_PREFIX], program_id)
}

pub fn find_claim_status(program_id: &Pubkey, user: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ClaimStatus::SEEDS_PREFIX, user.as_ref()], program_id)
}

pub fn find_vault_token_account(program_id: &Pubkey, mint: &Pubkey) -> Pubkey {
    let (vault, _) = find_vault(program_id);
    associated_token::get_associated_token_address(&vault, mint)
}

pub fn find_user_token_account(user: &Pubkey, mint: &Pubkey) -> Pubkey {
    associated_token::get_associated_token_address(user, mint)
}

/// Every address a claim by `user` touches, derived without any network round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimAddresses {
    pub user: Pubkey,
    pub claim_status: Pubkey,
    pub user_token_account: Pubkey,
    pub vault: Pubkey,
    pub vault_token_account: Pubkey,
    pub vault_authority: Pubkey,
}

impl ClaimAddresses {
    pub fn derive(config: &AirdropConfig, user: &Pubkey) -> Self {
        let (vault, _) = find_vault(&config.program_id);
        let (vault_authority, _) = find_vault_authority(&config.program_id);
        let (claim_status, _) = find_claim_status(&config.program_id, user);
        Self {
            user: *user,
            claim_status,
            user_token_account: find_user_token_account(user, &config.mint),
            vault,
            vault_token_account: associated_token::get_associated_token_address(
                &vault,
                &config.mint,
            ),
            vault_authority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PROGRAM_ID;

    #[test]
    fn vault_derivation_is_repeatable() {
        assert_eq!(find_vault(&DEFAULT_PROGRAM_ID), find_vault(&DEFAULT_PROGRAM_ID));
        assert_eq!(
            find_vault(&DEFAULT_PROGRAM_ID),
            find_vault_authority(&DEFAULT_PROGRAM_ID)
        );
    }

    #[test]
    fn vault_follows_program_id() {
        let other_program = Pubkey::new_unique();
        assert_ne!(
            find_vault(&DEFAULT_PROGRAM_ID).0,
            find_vault(&other_program).0
        );
    }

    #[test]
    fn claim_status_is_per_user() {
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        assert_eq!(
            find_claim_status(&DEFAULT_PROGRAM_ID, &alice),
            find_claim_status(&DEFAULT_PROGRAM_ID, &alice)
        );
        assert_ne!(
            find_claim_status(&DEFAULT_PROGRAM_ID, &alice).0,
            find_claim_status(&DEFAULT_PROGRAM_ID, &bob).0
        );
    }

    #[test]
    fn claim_addresses_are_consistent() {
        let config = AirdropConfig::default();
        let user = Pubkey::new_unique();
        let addresses = ClaimAddresses::derive(&config, &user);
        assert_eq!(addresses, ClaimAddresses::derive(&config, &user));
        assert_eq!(
            addresses.vault_token_account,
            find_vault_token_account(&config.program_id, &config.mint)
        );
        assert_eq!(
            addresses.user_token_account,
            find_user_token_account(&user, &config.mint)
        );
        assert!(!addresses.vault.is_on_curve());
    }
}
