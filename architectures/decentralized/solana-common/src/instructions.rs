use anchor_spl::associated_token;
use anchor_spl::token::spl_token;
use anchor_spl::token::spl_token::solana_program::program_pack::Pack;
use anyhow::Result;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_instruction;
use solana_sdk::system_program;
use solana_sdk::sysvar;

use crate::config::AirdropConfig;
use crate::pdas::ClaimAddresses;
use crate::state::anchor_discriminator;

pub fn airdrop_claim_data() -> Vec<u8> {
    anchor_discriminator("global:claim").to_vec()
}

/// The program's single "claim" instruction: nine accounts, no arguments.
pub fn airdrop_claim(config: &AirdropConfig, user: &Pubkey) -> Instruction {
    let addresses = ClaimAddresses::derive(config, user);
    Instruction {
        program_id: config.program_id,
        accounts: vec![
            AccountMeta::new(addresses.user, true),
            AccountMeta::new(addresses.claim_status, false),
            AccountMeta::new(addresses.user_token_account, false),
            AccountMeta::new(addresses.vault_token_account, false),
            AccountMeta::new_readonly(addresses.vault_authority, false),
            AccountMeta::new_readonly(config.token_program, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
            AccountMeta::new_readonly(config.mint, false),
        ],
        data: airdrop_claim_data(),
    }
}

pub fn associated_token_create(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Instruction {
    spl_associated_token_account::instruction::create_associated_token_account_idempotent(
        payer,
        owner,
        mint,
        token_program,
    )
}

pub fn token_mint_create(
    payer: &Pubkey,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
    rent_lamports: u64,
) -> Result<[Instruction; 2]> {
    let space = spl_token::state::Mint::LEN;
    Ok([
        system_instruction::create_account(
            payer,
            mint,
            rent_lamports,
            space as u64,
            &spl_token::ID,
        ),
        spl_token::instruction::initialize_mint2(
            &spl_token::ID,
            mint,
            mint_authority,
            freeze_authority,
            decimals,
        )?,
    ])
}

pub fn token_mint_to(
    mint: &Pubkey,
    destination: &Pubkey,
    mint_authority: &Pubkey,
    amount: u64,
) -> Result<Instruction> {
    Ok(spl_token::instruction::mint_to(
        &spl_token::ID,
        mint,
        destination,
        mint_authority,
        &[],
        amount,
    )?)
}

pub fn token_transfer(
    source: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Result<Instruction> {
    Ok(spl_token::instruction::transfer(
        &spl_token::ID,
        source,
        destination,
        authority,
        &[],
        amount,
    )?)
}

pub fn token_disable_mint_authority(mint: &Pubkey, current_authority: &Pubkey) -> Result<Instruction> {
    Ok(spl_token::instruction::set_authority(
        &spl_token::ID,
        mint,
        None,
        spl_token::instruction::AuthorityType::MintTokens,
        current_authority,
        &[],
    )?)
}
