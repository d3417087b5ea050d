//! Per-account staking state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an account sits in the stake/withdraw state machine.
///
/// ```text
/// Unstaked --stake--> Staked --request_withdraw--> WithdrawRequested
///     ^                                                   |
///     +---------------withdraw (after cool-down)----------+
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StakeState {
    /// Nothing staked.
    Unstaked,
    /// Tokens staked, no withdrawal requested.
    Staked,
    /// Tokens staked and the withdrawal cool-down is running or done.
    WithdrawRequested,
}

impl StakeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unstaked => "unstaked",
            Self::Staked => "staked",
            Self::WithdrawRequested => "withdraw_requested",
        }
    }
}

impl fmt::Display for StakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
