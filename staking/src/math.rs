//! Fixed-point helpers with a 256-bit intermediate.
//!
//! Raw token amounts use 18 decimals, so `amount × PRECISION` alone can exceed
//! `u128`. Products are formed in `U256` and narrowed back after division.

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer.
    pub struct U256(4);
}

/// Scale of the reward-per-token accumulator.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

fn narrow(value: U256) -> Option<u128> {
    if value > U256::from(u128::MAX) {
        None
    } else {
        Some(value.low_u128())
    }
}

/// `a × b / denominator`, floored. `None` on a zero denominator or if the
/// quotient does not fit in `u128`.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    narrow(U256::from(a) * U256::from(b) / U256::from(denominator))
}

/// Reward-per-token released over `elapsed` seconds of a `duration`-second
/// segment funded with `funded`, shared over `denominator` staked units.
///
/// `funded × elapsed × PRECISION / (duration × denominator)`; zero for a zero
/// denominator.
pub fn accrual_delta(funded: u128, elapsed: u64, duration: u64, denominator: u128) -> Option<u128> {
    if denominator == 0 || elapsed == 0 || funded == 0 {
        return Some(0);
    }
    if duration == 0 {
        return None;
    }
    // Bounded by 2^128 · 2^64 · 2^60, well inside 256 bits.
    let numerator = U256::from(funded) * U256::from(elapsed) * U256::from(PRECISION);
    narrow(numerator / (U256::from(duration) * U256::from(denominator)))
}
