// Shared Solana infrastructure for the airdrop client and operator tooling
pub mod backend;
pub mod config;
pub mod instructions;
pub mod ledger;
pub mod pdas;
pub mod retry;
pub mod state;
pub mod utils;

// Re-exports for convenience
pub use backend::SolanaBackend;
pub use config::{AirdropConfig, ConfigError};
pub use ledger::{Ledger, LedgerError};
