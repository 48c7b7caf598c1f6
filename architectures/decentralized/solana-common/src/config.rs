use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::utils::native_amount_to_ui_amount;

pub const DEFAULT_PROGRAM_ID: Pubkey = pubkey!("RoQZsTPSQyMVeMfWR2NxCaJD1ui781GE77JJtoz2dw8");
pub const DEFAULT_MINT: Pubkey = pubkey!("GhwmuvByp2WMDypvxBE8ZBVNiUiT43Zb6FvMABC3Lwgh");

// 10 tokens at 6 decimals, fixed by the deployed program
pub const DEFAULT_CLAIM_AMOUNT: u64 = 10_000_000;
pub const DEFAULT_DECIMALS: u8 = 6;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("claim_amount must be greater than zero")]
    ZeroClaimAmount,
}

/// Identifiers and amounts of the deployed airdrop, as seen by the client.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirdropConfig {
    #[serde_as(as = "DisplayFromStr")]
    pub program_id: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub mint: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub token_program: Pubkey,
    pub claim_amount: u64,
    pub decimals: u8,
    pub symbol: String,
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            program_id: DEFAULT_PROGRAM_ID,
            mint: DEFAULT_MINT,
            token_program: anchor_spl::token::ID,
            claim_amount: DEFAULT_CLAIM_AMOUNT,
            decimals: DEFAULT_DECIMALS,
            symbol: "MAT".to_string(),
        }
    }
}

impl AirdropConfig {
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        let config: AirdropConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.claim_amount == 0 {
            return Err(ConfigError::ZeroClaimAmount);
        }
        Ok(())
    }

    pub fn ui_claim_amount(&self) -> f64 {
        native_amount_to_ui_amount(self.claim_amount, self.decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_deployed_airdrop() {
        let config = AirdropConfig::default();
        assert_eq!(
            config.program_id.to_string(),
            "RoQZsTPSQyMVeMfWR2NxCaJD1ui781GE77JJtoz2dw8"
        );
        assert_eq!(
            config.mint.to_string(),
            "GhwmuvByp2WMDypvxBE8ZBVNiUiT43Zb6FvMABC3Lwgh"
        );
        assert_eq!(config.ui_claim_amount(), 10.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AirdropConfig::from_toml_str(
            r#"
            mint = "So11111111111111111111111111111111111111112"
            claim_amount = 42
            "#,
            "inline",
        )
        .unwrap();
        assert_eq!(
            config.mint.to_string(),
            "So11111111111111111111111111111111111111112"
        );
        assert_eq!(config.claim_amount, 42);
        assert_eq!(config.program_id, DEFAULT_PROGRAM_ID);
        assert_eq!(config.symbol, "MAT");
    }

    #[test]
    fn rejects_zero_claim_amount() {
        let err = AirdropConfig::from_toml_str("claim_amount = 0", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroClaimAmount));
    }

    #[test]
    fn rejects_malformed_pubkey() {
        let err = AirdropConfig::from_toml_str(r#"program_id = "not-a-key""#, "inline")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
