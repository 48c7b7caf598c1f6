use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use solana_sdk::pubkey::Pubkey;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const TOKEN_INFO_PATH: &str = "token-info.json";
pub const VAULT_INFO_PATH: &str = "vault-info.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub decimals: u8,
    /// Whole tokens minted to the launching wallet.
    pub initial_supply: u64,
    pub network: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "My Awesome Token".to_string(),
            symbol: "MAT".to_string(),
            description: "A sample token created on Solana testnet".to_string(),
            decimals: 6,
            initial_supply: 1_000_000,
            network: "testnet".to_string(),
        }
    }
}

/// Written by `token-launch`, read back by the other token commands.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(flatten)]
    pub config: TokenConfig,
    #[serde_as(as = "DisplayFromStr")]
    pub mint_address: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub token_account_address: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub total_supply: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub balance: u64,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub mint_authority: Option<Pubkey>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub freeze_authority: Option<Pubkey>,
    #[serde_as(as = "DisplayFromStr")]
    pub wallet_address: Pubkey,
    pub created_at: String,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultInfo {
    #[serde_as(as = "DisplayFromStr")]
    pub program_id: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub token_mint: Pubkey,
    #[serde(rename = "vaultPDA")]
    #[serde_as(as = "DisplayFromStr")]
    pub vault_pda: Pubkey,
    #[serde(rename = "vaultAuthorityPDA")]
    #[serde_as(as = "DisplayFromStr")]
    pub vault_authority_pda: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub vault_token_account: Pubkey,
    pub vault_bump: u8,
    pub vault_authority_bump: u8,
    pub amount: u64,
    pub network: String,
    pub setup_at: String,
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn now_rfc3339() -> Result<String> {
    Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn token_info_uses_flat_camel_case_keys() {
        let info = TokenInfo {
            config: TokenConfig::default(),
            mint_address: Pubkey::new_unique(),
            token_account_address: Pubkey::new_unique(),
            total_supply: 1_000_000_000_000,
            balance: 1_000_000_000_000,
            mint_authority: Some(Pubkey::new_unique()),
            freeze_authority: None,
            wallet_address: Pubkey::new_unique(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let value = serde_json::to_value(&info).unwrap();

        assert_eq!(value["symbol"], "MAT");
        assert_eq!(value["initialSupply"], 1_000_000);
        assert_eq!(value["totalSupply"], "1000000000000");
        assert_eq!(value["mintAddress"], info.mint_address.to_string());
        assert_eq!(value["freezeAuthority"], serde_json::Value::Null);
        assert_eq!(serde_json::from_value::<TokenInfo>(value).unwrap(), info);
    }

    #[test]
    fn vault_info_keeps_pda_key_names() {
        let info = VaultInfo {
            program_id: Pubkey::new_unique(),
            token_mint: Pubkey::new_unique(),
            vault_pda: Pubkey::new_unique(),
            vault_authority_pda: Pubkey::new_unique(),
            vault_token_account: Pubkey::new_unique(),
            vault_bump: 254,
            vault_authority_bump: 254,
            amount: 1_000_000_000_000,
            network: "testnet".to_string(),
            setup_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let value = serde_json::to_value(&info).unwrap();

        assert_eq!(value["vaultPDA"], info.vault_pda.to_string());
        assert_eq!(value["vaultAuthorityPDA"], info.vault_authority_pda.to_string());
        assert_eq!(value["setupAt"], "2025-01-01T00:00:00Z");
    }

    #[test]
    fn timestamps_are_rfc3339() {
        let timestamp = now_rfc3339().unwrap();
        assert_eq!(&timestamp[4..5], "-");
        assert_eq!(&timestamp[10..11], "T");
        assert!(timestamp.ends_with('Z'));
    }
}
