//! Per-account stake position.

use crate::error::StakingError;
use crate::math::{mul_div, PRECISION};
use serde::{Deserialize, Serialize};
use vetme_types::{StakeState, Timestamp};

/// A single account's stake, withdrawal request and reward checkpoint.
///
/// Created implicitly on first stake and zeroed in place on withdrawal or
/// claim, never removed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    /// Tokens currently staked (raw units).
    pub staked: u128,
    /// Whether this account has claimed in the current period.
    pub reward_claimed: bool,
    /// When the outstanding withdrawal request was made.
    pub withdraw_requested_at: Option<Timestamp>,
    /// Accumulator value at this account's last checkpoint.
    pub reward_per_token_paid: u128,
    /// Rewards earned up to the last checkpoint and not yet paid out.
    pub rewards: u128,
}

impl StakePosition {
    pub fn state(&self) -> StakeState {
        if self.staked == 0 {
            StakeState::Unstaked
        } else if self.withdraw_requested_at.is_some() {
            StakeState::WithdrawRequested
        } else {
            StakeState::Staked
        }
    }

    /// Rewards owed at accumulator value `reward_per_token`.
    ///
    /// `staked × (rpt − paid) / PRECISION + rewards`
    pub fn earned(&self, reward_per_token: u128) -> Result<u128, StakingError> {
        let delta = reward_per_token
            .checked_sub(self.reward_per_token_paid)
            .ok_or(StakingError::Overflow)?;
        let accrued = mul_div(self.staked, delta, PRECISION).ok_or(StakingError::Overflow)?;
        accrued
            .checked_add(self.rewards)
            .ok_or(StakingError::Overflow)
    }
}
