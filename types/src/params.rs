//! Staking parameters fixed per ledger instance.

use serde::{Deserialize, Serialize};

/// Cool-down between requesting and executing a withdrawal: 48 hours.
pub const DEFAULT_WITHDRAW_COOLDOWN_SECS: u64 = 172_800;

/// Parameters a staking ledger is constructed with.
///
/// Unlike the reward schedule, these never change over the ledger's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    /// Seconds a withdrawal request must age before `withdraw` succeeds.
    pub withdraw_cooldown_secs: u64,

    /// Size of the staking pool (raw units). When set it caps the total
    /// staked and is the denominator rewards are shared over, so a pool that
    /// is not filled pays out only the filled fraction of its funding.
    /// `None` shares rewards among whatever is currently staked.
    pub total_for_stake: Option<u128>,
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            withdraw_cooldown_secs: DEFAULT_WITHDRAW_COOLDOWN_SECS,
            total_for_stake: None,
        }
    }
}

impl StakingParams {
    /// Parameters with a custom cool-down, mostly for fast test cycles.
    pub fn with_cooldown(withdraw_cooldown_secs: u64) -> Self {
        Self {
            withdraw_cooldown_secs,
            ..Self::default()
        }
    }

    /// Parameters for a fixed-size pool of `total_for_stake` raw units.
    pub fn with_pool(total_for_stake: u128) -> Self {
        Self {
            total_for_stake: Some(total_for_stake),
            ..Self::default()
        }
    }

    /// Denominator for reward sharing given the amount currently staked.
    pub fn reward_denominator(&self, total_staked: u128) -> u128 {
        self.total_for_stake.unwrap_or(total_staked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denominator_follows_pool_size() {
        assert_eq!(StakingParams::default().reward_denominator(700), 700);
        assert_eq!(StakingParams::with_pool(5_000).reward_denominator(700), 5_000);
    }
}
