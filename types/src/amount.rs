//! Token amount helpers.
//!
//! Amounts are raw fixed-point integers (u128) to avoid floating-point errors.
//! The smallest unit is 1 raw; one whole token is `TOKEN_UNIT` raw.

use crate::error::TypesError;

/// Decimal places of the staked BEP20 token.
pub const TOKEN_DECIMALS: u32 = 18;

/// Raw units per whole token (10^18).
pub const TOKEN_UNIT: u128 = 10u128.pow(TOKEN_DECIMALS);

/// Convert a whole-token quantity into raw units.
pub fn to_raw(whole: u128) -> Result<u128, TypesError> {
    whole.checked_mul(TOKEN_UNIT).ok_or(TypesError::AmountOverflow)
}

/// Render a raw amount as a decimal string, trimming trailing zeros.
///
/// `1_500_000_000_000_000_000` renders as `"1.5"`, whole amounts have no fraction.
pub fn format_amount(raw: u128) -> String {
    let whole = raw / TOKEN_UNIT;
    let frac = raw % TOKEN_UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", frac, width = TOKEN_DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}
