//! Amount scaling between token base units and the circuit's balance unit
//!
//! Token amounts arrive as decimal strings of base units. The circuit works
//! in base units / 10⁶ (the contract rescales by the same factor), so the low
//! six digits are dropped. What remains must fit in 13 digits, which keeps
//! every balance inside the discrete-log search range. The stored unit is
//! hundredths of a display unit.

use crate::error::{BalanceError, Result};

/// Decimal digits dropped from a base-unit amount
pub const TRUNCATED_DECIMALS: usize = 6;

/// Maximum digits of a truncated amount
pub const MAX_AMOUNT_DIGITS: usize = 13;

/// Exclusive upper bound of any balance the circuits can produce, `10¹³`
pub const MAX_REPRESENTABLE_BALANCE: u64 = 10_000_000_000_000;

/// Drop the low six digits of a base-unit amount.
///
/// Amounts with six or fewer digits become 0.
pub fn truncate_amount(amount: &str) -> Result<u64> {
    let amount = amount.trim();
    if amount.is_empty() || !amount.chars().all(|c| c.is_ascii_digit()) {
        return Err(BalanceError::InvalidAmount(amount.to_string()));
    }
    let digits = amount.trim_start_matches('0');
    if digits.len() <= TRUNCATED_DECIMALS {
        return Ok(0);
    }
    let kept = &digits[..digits.len() - TRUNCATED_DECIMALS];
    if kept.len() > MAX_AMOUNT_DIGITS {
        return Err(BalanceError::AmountTooLarge(format!(
            "{amount} leaves {} digits after truncation, at most {MAX_AMOUNT_DIGITS} allowed",
            kept.len()
        )));
    }
    kept.parse::<u64>()
        .map_err(|_| BalanceError::InvalidAmount(amount.to_string()))
}

/// Render a balance in hundredths with a two-digit fraction: 12345 → "123.45"
pub fn format_hundredths(value: u64) -> String {
    format!("{}.{:02}", value / 100, value % 100)
}
