//! Reward schedule: the staking window, its funding and the accrual accumulator.

use crate::error::StakingError;
use crate::math::{accrual_delta, mul_div};
use serde::{Deserialize, Serialize};
use vetme_types::Timestamp;

/// One ledger's reward period.
///
/// Created by the first `set_rewards_duration`; until then the ledger has no
/// schedule and staking is closed. The accumulator (`reward_per_token_stored`)
/// carries over when a later period is opened so existing checkpoints stay
/// valid.
///
/// Funding is released over a segment that runs from the latest
/// `notify_reward_amount` to period end. A top-up part-way through the period
/// folds whatever the old segment had not yet released into the new one, so
/// every funded unit is released before the period closes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSchedule {
    /// When the current period (and staking window) opened.
    pub period_start: Timestamp,
    /// Length of the period in seconds. Always nonzero.
    pub period_duration: u64,
    /// Total rewards funded into this period (raw units).
    pub total_reward_funded: u128,
    /// Release rate of the current segment, raw units per second (floored).
    pub reward_rate: u128,
    /// Start of the current release segment.
    pub segment_start: Timestamp,
    /// Rewards released linearly between `segment_start` and period end.
    pub segment_funded: u128,
    /// Accumulated reward per staked unit, scaled by `PRECISION`.
    pub reward_per_token_stored: u128,
    /// Last time the accumulator was brought forward.
    pub last_update: Timestamp,
    /// Number of periods opened on this ledger, starting at 1.
    pub epoch: u64,
}

impl RewardSchedule {
    /// Open the first period at `now`.
    pub fn open(now: Timestamp, duration: u64) -> Self {
        Self {
            period_start: now,
            period_duration: duration,
            total_reward_funded: 0,
            reward_rate: 0,
            segment_start: now,
            segment_funded: 0,
            reward_per_token_stored: 0,
            last_update: now,
            epoch: 1,
        }
    }

    /// Open the next period at `now`, keeping the accumulator.
    ///
    /// The caller must have checkpointed the old period first.
    pub fn reopen(&self, now: Timestamp, duration: u64) -> Self {
        Self {
            reward_per_token_stored: self.reward_per_token_stored,
            epoch: self.epoch + 1,
            ..Self::open(now, duration)
        }
    }

    /// First instant at which the window is closed.
    pub fn period_end(&self) -> Timestamp {
        self.period_start.plus(self.period_duration)
    }

    /// Whether the staking window is open at `now`.
    pub fn is_active(&self, now: Timestamp) -> bool {
        !self.period_start.has_expired(self.period_duration, now)
    }

    /// Seconds until the window closes, zero once closed.
    pub fn remaining(&self, now: Timestamp) -> u64 {
        self.period_start.remaining(self.period_duration, now)
    }

    /// Accrual stops at period end.
    pub fn last_time_reward_applicable(&self, now: Timestamp) -> Timestamp {
        now.min(self.period_end())
    }

    fn segment_len(&self) -> u64 {
        self.segment_start.elapsed_since(self.period_end())
    }

    /// Accumulator value at `now`.
    ///
    /// `denominator` is the stake the release is shared over. Returns the
    /// stored value unchanged when nothing is staked.
    pub fn reward_per_token(
        &self,
        now: Timestamp,
        total_staked: u128,
        denominator: u128,
    ) -> Result<u128, StakingError> {
        if total_staked == 0 {
            return Ok(self.reward_per_token_stored);
        }
        let applicable = self.last_time_reward_applicable(now);
        let elapsed = self.last_update.elapsed_since(applicable);
        let delta = accrual_delta(self.segment_funded, elapsed, self.segment_len(), denominator)
            .ok_or(StakingError::Overflow)?;
        self.reward_per_token_stored
            .checked_add(delta)
            .ok_or(StakingError::Overflow)
    }

    /// Record an accumulator value computed by [`reward_per_token`](Self::reward_per_token).
    pub fn apply_checkpoint(&mut self, reward_per_token: u128, now: Timestamp) {
        self.reward_per_token_stored = reward_per_token;
        self.last_update = self.last_time_reward_applicable(now).max(self.last_update);
    }

    /// The schedule after funding `amount` at `now`, without mutating.
    ///
    /// Starts a new segment at `now` carrying the unreleased part of the old
    /// one. The caller must have checkpointed at `now` and checked the period
    /// is still active.
    pub fn funded_with(&self, amount: u128, now: Timestamp) -> Result<Self, StakingError> {
        let remaining = self.remaining(now);
        if remaining == 0 {
            return Err(StakingError::InvalidState(
                "reward period has ended".to_string(),
            ));
        }
        let unreleased = match self.segment_len() {
            0 => 0,
            len => mul_div(self.segment_funded, u128::from(remaining), u128::from(len))
                .ok_or(StakingError::Overflow)?,
        };
        let segment_funded = unreleased
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let total_reward_funded = self
            .total_reward_funded
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        Ok(Self {
            total_reward_funded,
            reward_rate: segment_funded / u128::from(remaining),
            segment_start: now,
            segment_funded,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::PRECISION;

    fn t(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    fn funded(start: u64, duration: u64, amount: u128) -> RewardSchedule {
        RewardSchedule::open(t(start), duration)
            .funded_with(amount, t(start))
            .unwrap()
    }

    /// Checkpoint at `now` and fund `amount`, the way the ledger does.
    fn top_up(s: &RewardSchedule, amount: u128, now: u64, staked: u128) -> RewardSchedule {
        let mut s = s.clone();
        let rpt = s.reward_per_token(t(now), staked, staked).unwrap();
        s.apply_checkpoint(rpt, t(now));
        s.funded_with(amount, t(now)).unwrap()
    }

    #[test]
    fn window_is_half_open() {
        let s = RewardSchedule::open(t(1_000), 300);
        assert!(s.is_active(t(1_000)));
        assert!(s.is_active(t(1_299)));
        assert!(!s.is_active(t(1_300)));
        assert_eq!(s.period_end(), t(1_300));
        assert_eq!(s.remaining(t(1_100)), 200);
    }

    #[test]
    fn rate_is_amount_over_duration() {
        let s = funded(0, 300, 3_000);
        assert_eq!(s.reward_rate, 10);
        assert_eq!(s.total_reward_funded, 3_000);
        assert_eq!(s.segment_funded, 3_000);
    }

    #[test]
    fn reward_per_token_zero_without_stake() {
        let s = funded(0, 300, 2_000);
        assert_eq!(s.reward_per_token(t(150), 0, 5_000).unwrap(), 0);
    }

    #[test]
    fn reward_per_token_is_linear() {
        let s = funded(0, 300, 3_000);
        // 3000 over 300s, 100 staked: 30 per token by the end, 15 at the midpoint.
        assert_eq!(s.reward_per_token(t(150), 100, 100).unwrap(), 15 * PRECISION);
        assert_eq!(s.reward_per_token(t(300), 100, 100).unwrap(), 30 * PRECISION);
    }

    #[test]
    fn fixed_pool_denominator_dilutes_release() {
        let s = funded(0, 300, 2_000);
        // 500 staked in a 5000 pool: 0.4 per token whatever the fill.
        assert_eq!(s.reward_per_token(t(300), 500, 5_000).unwrap(), 4 * PRECISION / 10);
    }

    #[test]
    fn accrual_freezes_at_period_end() {
        let s = funded(0, 300, 3_000);
        let at_end = s.reward_per_token(t(300), 100, 100).unwrap();
        assert_eq!(s.reward_per_token(t(172_800), 100, 100).unwrap(), at_end);
    }

    #[test]
    fn checkpoint_moves_last_update_no_further_than_end() {
        let mut s = funded(0, 300, 3_000);
        let rpt = s.reward_per_token(t(10_000), 100, 100).unwrap();
        s.apply_checkpoint(rpt, t(10_000));
        assert_eq!(s.last_update, t(300));
        assert_eq!(s.reward_per_token(t(20_000), 100, 100).unwrap(), rpt);
    }

    #[test]
    fn mid_period_top_up_covers_remaining_time() {
        let s = funded(0, 300, 3_000);
        // 1000 released by t=100; 2000 left plus 600 new over the last 200s.
        let s = top_up(&s, 600, 100, 100);
        assert_eq!(s.segment_funded, 2_600);
        assert_eq!(s.reward_rate, 13);
        assert_eq!(s.total_reward_funded, 3_600);
        assert_eq!(s.segment_start, t(100));
        // Everything funded is released by period end.
        assert_eq!(s.reward_per_token(t(300), 100, 100).unwrap(), 36 * PRECISION);
    }

    #[test]
    fn late_funding_is_released_in_full() {
        let s = RewardSchedule::open(t(0), 300);
        let s = top_up(&s, 1_500, 150, 100);
        assert_eq!(s.reward_rate, 10);
        assert_eq!(s.reward_per_token(t(300), 100, 100).unwrap(), 15 * PRECISION);
    }

    #[test]
    fn funding_after_end_is_rejected() {
        let s = RewardSchedule::open(t(0), 300);
        assert!(matches!(
            s.funded_with(100, t(300)),
            Err(StakingError::InvalidState(_))
        ));
    }

    #[test]
    fn reopen_keeps_accumulator_and_resets_funding() {
        let mut s = funded(0, 300, 3_000);
        let rpt = s.reward_per_token(t(300), 100, 100).unwrap();
        s.apply_checkpoint(rpt, t(300));
        let next = s.reopen(t(1_000), 600);
        assert_eq!(next.reward_per_token_stored, rpt);
        assert_eq!(next.total_reward_funded, 0);
        assert_eq!(next.segment_funded, 0);
        assert_eq!(next.segment_start, t(1_000));
        assert_eq!(next.epoch, 2);
        assert_eq!(next.period_end(), t(1_600));
    }
}
