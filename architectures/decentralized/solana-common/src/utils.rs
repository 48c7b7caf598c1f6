use solana_sdk::native_token::LAMPORTS_PER_SOL;

pub fn ui_amount_to_native_amount(ui_amount: f64, decimals: u8) -> u64 {
    let factor = 10u64.pow(decimals as u32) as f64;
    (ui_amount * factor).round() as u64
}

pub fn native_amount_to_ui_amount(native_amount: u64, decimals: u8) -> f64 {
    let factor = 10u64.pow(decimals as u32) as f64;
    (native_amount as f64) / factor
}

/// Whole-token supply to native units, failing on overflow instead of wrapping.
pub fn whole_tokens_to_native_amount(whole_tokens: u64, decimals: u8) -> Option<u64> {
    10u64
        .checked_pow(decimals as u32)
        .and_then(|factor| whole_tokens.checked_mul(factor))
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64).round() as u64
}
