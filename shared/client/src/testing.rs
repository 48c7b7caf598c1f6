//! In-memory ledger for exercising the claim workflow without a validator.
//!
//! Transactions are executed against a small model of the three programs a claim
//! touches: the associated token account program, the airdrop program and the
//! token balances they move. Everything else in a transaction is ignored.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use airdrop_solana_rpc::pdas::{find_claim_status, find_vault_token_account};
use airdrop_solana_rpc::state::ClaimStatus;
use airdrop_solana_rpc::{AirdropConfig, Ledger, LedgerError};
use anchor_spl::associated_token;
use anchor_spl::token::spl_token;
use anchor_spl::token::spl_token::solana_program::program_option::COption;
use anchor_spl::token::spl_token::solana_program::program_pack::Pack;
use anchor_spl::token::spl_token::state::{Account as TokenState, AccountState};
use async_trait::async_trait;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::CompiledInstruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

pub const FEE_LAMPORTS: u64 = 5_000;
pub const TOKEN_ACCOUNT_RENT_LAMPORTS: u64 = 2_039_280;
pub const CLAIM_STATUS_RENT_LAMPORTS: u64 = 953_520;

/// Anchor's `AccountNotInitialized`.
pub const ACCOUNT_NOT_INITIALIZED_ERROR_CODE: u32 = 3012;
/// SPL token `InsufficientFunds`.
pub const TOKEN_INSUFFICIENT_FUNDS_ERROR_CODE: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentTransaction {
    CreateTokenAccount { owner: Pubkey, mint: Pubkey },
    Claim { user: Pubkey },
    Other,
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Pubkey, Account>,
    lookup_failures: HashMap<Pubkey, LedgerError>,
    submission_failures: VecDeque<LedgerError>,
    submissions: Vec<SentTransaction>,
    requests: usize,
}

pub struct MemoryLedger {
    config: AirdropConfig,
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    pub fn new(config: AirdropConfig) -> Self {
        Self {
            config,
            state: Mutex::new(LedgerState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &AirdropConfig {
        &self.config
    }

    pub fn fund(&self, address: &Pubkey, lamports: u64) {
        let mut state = self.lock();
        let account = state
            .accounts
            .entry(*address)
            .or_insert_with(|| Account::new(0, 0, &solana_sdk::system_program::ID));
        account.lamports += lamports;
    }

    pub fn set_account(&self, address: &Pubkey, account: Account) {
        self.lock().accounts.insert(*address, account);
    }

    /// Creates (or overwrites) the associated token account of `owner` for `mint`.
    pub fn add_token_account(&self, owner: &Pubkey, mint: &Pubkey, amount: u64) -> Pubkey {
        let address = associated_token::get_associated_token_address(owner, mint);
        self.set_account(&address, token_account(owner, mint, amount));
        address
    }

    /// Funds the vault's token account with `amount` base units of the configured mint.
    pub fn add_vault(&self, amount: u64) -> Pubkey {
        let address = find_vault_token_account(&self.config.program_id, &self.config.mint);
        let (vault, _) = airdrop_solana_rpc::pdas::find_vault(&self.config.program_id);
        self.set_account(&address, token_account(&vault, &self.config.mint, amount));
        address
    }

    pub fn set_claim_status(&self, user: &Pubkey, claimed: bool) -> Pubkey {
        let (address, _) = find_claim_status(&self.config.program_id, user);
        self.set_account(&address, claim_status_account(&self.config.program_id, claimed));
        address
    }

    /// Makes every lookup of `address` fail with `error` until cleared.
    pub fn fail_lookup(&self, address: &Pubkey, error: LedgerError) {
        self.lock().lookup_failures.insert(*address, error);
    }

    pub fn clear_lookup_failure(&self, address: &Pubkey) {
        self.lock().lookup_failures.remove(address);
    }

    /// Queues a failure for the next submitted transaction, which is then not executed.
    pub fn fail_next_submission(&self, error: LedgerError) {
        self.lock().submission_failures.push_back(error);
    }

    pub fn balance(&self, address: &Pubkey) -> u64 {
        self.lock()
            .accounts
            .get(address)
            .map_or(0, |account| account.lamports)
    }

    pub fn token_amount(&self, address: &Pubkey) -> Option<u64> {
        let state = self.lock();
        let account = state.accounts.get(address)?;
        TokenState::unpack(&account.data).ok().map(|token| token.amount)
    }

    pub fn claim_status(&self, user: &Pubkey) -> Option<ClaimStatus> {
        let (address, _) = find_claim_status(&self.config.program_id, user);
        let state = self.lock();
        let account = state.accounts.get(&address)?;
        ClaimStatus::try_from_account_data(&account.data).ok()
    }

    pub fn submissions(&self) -> Vec<SentTransaction> {
        self.lock().submissions.clone()
    }

    /// Number of ledger requests served so far, of any kind.
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    fn classify(&self, transaction: &Transaction) -> SentTransaction {
        let keys = &transaction.message.account_keys;
        let Some(instruction) = transaction.message.instructions.first() else {
            return SentTransaction::Other;
        };
        let program_id = keys[instruction.program_id_index as usize];
        let account = |position: usize| {
            instruction
                .accounts
                .get(position)
                .map(|index| keys[*index as usize])
                .unwrap_or_default()
        };
        if program_id == associated_token::ID {
            SentTransaction::CreateTokenAccount {
                owner: account(2),
                mint: account(3),
            }
        } else if program_id == self.config.program_id {
            SentTransaction::Claim { user: account(0) }
        } else {
            SentTransaction::Other
        }
    }

    fn execute(
        &self,
        accounts: &mut HashMap<Pubkey, Account>,
        keys: &[Pubkey],
        instruction: &CompiledInstruction,
    ) -> Result<(), LedgerError> {
        let program_id = keys[instruction.program_id_index as usize];
        let account = |position: usize| -> Result<Pubkey, LedgerError> {
            instruction
                .accounts
                .get(position)
                .map(|index| keys[*index as usize])
                .ok_or_else(|| {
                    LedgerError::TransactionFailed(format!(
                        "instruction is missing account #{position}"
                    ))
                })
        };

        if program_id == associated_token::ID {
            let (payer, address, owner, mint) = (account(0)?, account(1)?, account(2)?, account(3)?);
            if accounts.contains_key(&address) {
                return Ok(());
            }
            debit(accounts, &payer, TOKEN_ACCOUNT_RENT_LAMPORTS)
                .ok_or(LedgerError::InsufficientFundsForRent)?;
            accounts.insert(address, token_account(&owner, &mint, 0));
            return Ok(());
        }

        if program_id != self.config.program_id {
            return Ok(());
        }

        let (user, claim_status, user_token_account, vault_token_account) =
            (account(0)?, account(1)?, account(2)?, account(3)?);
        if accounts.contains_key(&claim_status) {
            // What the RPC backend reports once it sees System's create_account fail.
            return Err(LedgerError::AccountAlreadyInUse);
        }
        let not_initialized = LedgerError::Program {
            instruction: Some(0),
            code: ACCOUNT_NOT_INITIALIZED_ERROR_CODE,
        };
        let mut vault = read_token(accounts, &vault_token_account).ok_or(not_initialized.clone())?;
        let mut destination = read_token(accounts, &user_token_account).ok_or(not_initialized)?;
        let amount = self.config.claim_amount;
        if vault.amount < amount {
            return Err(LedgerError::Program {
                instruction: Some(0),
                code: TOKEN_INSUFFICIENT_FUNDS_ERROR_CODE,
            });
        }

        debit(accounts, &user, CLAIM_STATUS_RENT_LAMPORTS)
            .ok_or(LedgerError::InsufficientFundsForRent)?;
        let mut record = claim_status_account(&self.config.program_id, true);
        record.lamports = CLAIM_STATUS_RENT_LAMPORTS;
        accounts.insert(claim_status, record);

        vault.amount -= amount;
        destination.amount += amount;
        write_token(accounts, &vault_token_account, &vault);
        write_token(accounts, &user_token_account, &destination);
        Ok(())
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        let mut state = self.lock();
        state.requests += 1;
        if let Some(error) = state.lookup_failures.get(address) {
            return Err(error.clone());
        }
        Ok(state.accounts.get(address).cloned())
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError> {
        let mut state = self.lock();
        state.requests += 1;
        if let Some(error) = state.lookup_failures.get(address) {
            return Err(error.clone());
        }
        Ok(state
            .accounts
            .get(address)
            .map_or(0, |account| account.lamports))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, LedgerError> {
        self.lock().requests += 1;
        Ok(Hash::new_unique())
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, LedgerError> {
        let sent = self.classify(transaction);
        let mut state = self.lock();
        state.requests += 1;
        state.submissions.push(sent);

        if let Some(error) = state.submission_failures.pop_front() {
            return Err(error);
        }
        transaction
            .verify()
            .map_err(|err| LedgerError::TransactionFailed(err.to_string()))?;

        let keys = &transaction.message.account_keys;
        let fee_payer = keys
            .first()
            .ok_or_else(|| LedgerError::TransactionFailed("transaction has no fee payer".into()))?;

        let mut accounts = state.accounts.clone();
        debit(&mut accounts, fee_payer, FEE_LAMPORTS)
            .ok_or(LedgerError::InsufficientFundsForFee)?;
        for instruction in &transaction.message.instructions {
            self.execute(&mut accounts, keys, instruction)?;
        }
        state.accounts = accounts;

        Ok(transaction.signatures[0])
    }

    async fn get_version(&self) -> Result<String, LedgerError> {
        self.lock().requests += 1;
        Ok("memory".to_string())
    }
}

fn debit(accounts: &mut HashMap<Pubkey, Account>, address: &Pubkey, lamports: u64) -> Option<()> {
    let account = accounts.get_mut(address)?;
    account.lamports = account.lamports.checked_sub(lamports)?;
    Some(())
}

fn read_token(accounts: &HashMap<Pubkey, Account>, address: &Pubkey) -> Option<TokenState> {
    TokenState::unpack(&accounts.get(address)?.data).ok()
}

fn write_token(accounts: &mut HashMap<Pubkey, Account>, address: &Pubkey, token: &TokenState) {
    if let Some(account) = accounts.get_mut(address) {
        token.pack_into_slice(&mut account.data);
    }
}

pub fn token_account(owner: &Pubkey, mint: &Pubkey, amount: u64) -> Account {
    let token = TokenState {
        mint: *mint,
        owner: *owner,
        amount,
        delegate: COption::None,
        state: AccountState::Initialized,
        is_native: COption::None,
        delegated_amount: 0,
        close_authority: COption::None,
    };
    let mut data = vec![0u8; TokenState::LEN];
    token.pack_into_slice(&mut data);
    Account {
        lamports: TOKEN_ACCOUNT_RENT_LAMPORTS,
        data,
        owner: spl_token::ID,
        executable: false,
        rent_epoch: 0,
    }
}

pub fn claim_status_account(program_id: &Pubkey, claimed: bool) -> Account {
    Account {
        lamports: CLAIM_STATUS_RENT_LAMPORTS,
        data: ClaimStatus { claimed }.to_account_data(),
        owner: *program_id,
        executable: false,
        rent_epoch: 0,
    }
}
