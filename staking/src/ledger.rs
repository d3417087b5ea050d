//! Core staking ledger engine.

use std::collections::HashMap;

use crate::error::StakingError;
use crate::position::StakePosition;
use crate::schedule::RewardSchedule;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vetme_store::{StakingStore, StoreError, SCHEMA_VERSION};
use vetme_token::{TokenInfo, TokenLedger};
use vetme_types::{AccountId, StakeState, StakingParams, Timestamp};

const HEADER_KEY: &str = "ledger_header";

/// Ledger-wide record persisted under `HEADER_KEY`.
#[derive(Serialize, Deserialize)]
struct LedgerHeader {
    owner: AccountId,
    custody: AccountId,
    params: StakingParams,
    schedule: Option<RewardSchedule>,
    total_staked: u128,
}

/// Accumulator and earned rewards for one account, computed before any
/// mutation so a failed transfer leaves nothing half-applied.
struct Accrual {
    reward_per_token: u128,
    earned: u128,
}

/// What a successful `claim_reward` sent back to the account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClaimPayout {
    /// Rewards earned over the period.
    pub reward: u128,
    /// The stake, released now that the period is over.
    pub principal: u128,
}

impl ClaimPayout {
    pub fn total(&self) -> u128 {
        self.reward.saturating_add(self.principal)
    }
}

/// The staking ledger. Owns positions, the reward schedule and the token
/// ledger it moves funds through.
///
/// Every mutating call takes an explicit `now` and follows the same order:
/// validate, compute, perform the single token transfer, then commit. A
/// rejected transfer therefore aborts the call with no state change.
pub struct StakingLedger<T: TokenLedger> {
    token: T,
    owner: AccountId,
    /// Token-ledger account holding staked principal and funded rewards.
    custody: AccountId,
    params: StakingParams,
    schedule: Option<RewardSchedule>,
    positions: HashMap<AccountId, StakePosition>,
    total_staked: u128,
}

impl<T: TokenLedger> StakingLedger<T> {
    pub fn new(token: T, owner: AccountId, custody: AccountId, params: StakingParams) -> Self {
        Self {
            token,
            owner,
            custody,
            params,
            schedule: None,
            positions: HashMap::new(),
            total_staked: 0,
        }
    }

    // ── Reward scheduler ───────────────────────────────────────────────

    /// Open a reward period of `duration` seconds starting at `now`.
    ///
    /// The first call opens staking. Later calls are only accepted once the
    /// previous period has ended; they start a fresh, unfunded period and
    /// let every account claim again.
    pub fn set_rewards_duration(
        &mut self,
        caller: &AccountId,
        duration: u64,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        self.ensure_owner(caller)?;
        if duration == 0 {
            return Err(StakingError::InvalidState(
                "rewards duration must be nonzero".to_string(),
            ));
        }
        let next = match &self.schedule {
            Some(current) if current.is_active(now) => {
                return Err(StakingError::InvalidState(format!(
                    "reward period is active until {}",
                    current.period_end()
                )));
            }
            Some(current) => {
                let rpt = self.reward_per_token(now)?;
                let mut closed = current.clone();
                closed.apply_checkpoint(rpt, now);
                closed.reopen(now, duration)
            }
            None => RewardSchedule::open(now, duration),
        };
        let epoch = next.epoch;
        if epoch > 1 {
            for position in self.positions.values_mut() {
                position.reward_claimed = false;
            }
        }
        self.schedule = Some(next);
        info!(duration, epoch, start = %now, "reward period opened");
        Ok(())
    }

    /// Fund the current period with `amount`, pulled from the owner and
    /// released between `now` and period end.
    pub fn notify_reward_amount(
        &mut self,
        caller: &AccountId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        self.ensure_owner(caller)?;
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let schedule = self.schedule.as_ref().ok_or_else(|| {
            StakingError::InvalidState("rewards duration has not been set".to_string())
        })?;
        if !schedule.is_active(now) {
            return Err(StakingError::InvalidState(
                "reward period has ended".to_string(),
            ));
        }
        let mut next = schedule.clone();
        next.apply_checkpoint(self.reward_per_token(now)?, now);
        let next = next.funded_with(amount, now)?;

        let (owner, custody) = (self.owner, self.custody);
        self.move_tokens(&owner, &custody, amount, "notify_reward_amount")?;

        info!(
            amount,
            funded = next.total_reward_funded,
            rate = next.reward_rate,
            remaining_secs = next.remaining(now),
            "reward period funded"
        );
        self.schedule = Some(next);
        Ok(())
    }

    /// Accumulated reward per staked unit at `now`, scaled by `PRECISION`.
    pub fn reward_per_token(&self, now: Timestamp) -> Result<u128, StakingError> {
        match &self.schedule {
            Some(schedule) => schedule.reward_per_token(
                now,
                self.total_staked,
                self.params.reward_denominator(self.total_staked),
            ),
            None => Ok(0),
        }
    }

    /// Raw reward units released per second in the current funding segment.
    pub fn reward_rate(&self) -> u128 {
        self.schedule.as_ref().map(|s| s.reward_rate).unwrap_or(0)
    }

    // ── Stake accounting ───────────────────────────────────────────────

    /// Move `amount` from `caller` into custody and add it to their stake.
    pub fn stake(
        &mut self,
        caller: &AccountId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let schedule = self.schedule.as_ref().ok_or(StakingError::NotStarted)?;
        if !schedule.is_active(now) {
            return Err(StakingError::StakingEnded);
        }
        if self.state_of(caller) == StakeState::WithdrawRequested {
            return Err(StakingError::InvalidState(
                "cannot add to a stake with a pending withdraw".to_string(),
            ));
        }
        if let Some(pool) = self.params.total_for_stake {
            let available = pool.saturating_sub(self.total_staked);
            if amount > available {
                return Err(StakingError::CapacityExceeded {
                    requested: amount,
                    available,
                });
            }
        }
        let total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let staked = self
            .balance_of(caller)
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let accrual = self.accrue(caller, now)?;

        let custody = self.custody;
        self.move_tokens(caller, &custody, amount, "stake")?;

        self.commit(caller, &accrual, now);
        self.positions.entry(*caller).or_default().staked = staked;
        self.total_staked = total_staked;
        debug!(account = %caller, amount, staked, total_staked, "staked");
        Ok(())
    }

    /// Settle `caller`'s position once the period has ended: pay out what
    /// they earned and release their stake with it. Only once per period.
    ///
    /// The stake leaves the pool here, so after a claim the account reads
    /// as unstaked and a second claim fails `AlreadyClaimed`.
    pub fn claim_reward(
        &mut self,
        caller: &AccountId,
        now: Timestamp,
    ) -> Result<ClaimPayout, StakingError> {
        let position = self.positions.get(caller).ok_or(StakingError::NoStake)?;
        let already_claimed = position.reward_claimed;
        let principal = position.staked;
        if principal == 0 && !already_claimed {
            return Err(StakingError::NoStake);
        }
        let schedule = self.schedule.as_ref().ok_or(StakingError::NotStarted)?;
        if schedule.is_active(now) {
            return Err(StakingError::PeriodNotOver);
        }
        if already_claimed {
            return Err(StakingError::AlreadyClaimed);
        }
        let total_staked = self
            .total_staked
            .checked_sub(principal)
            .ok_or(StakingError::Overflow)?;
        let accrual = self.accrue(caller, now)?;
        let payout = ClaimPayout {
            reward: accrual.earned,
            principal,
        };
        let amount = accrual
            .earned
            .checked_add(principal)
            .ok_or(StakingError::Overflow)?;

        let custody = self.custody;
        self.move_tokens(&custody, caller, amount, "claim_reward")?;

        self.commit(caller, &accrual, now);
        if let Some(position) = self.positions.get_mut(caller) {
            position.staked = 0;
            position.rewards = 0;
            position.withdraw_requested_at = None;
            position.reward_claimed = true;
        }
        self.total_staked = total_staked;
        debug!(
            account = %caller,
            reward = payout.reward,
            principal,
            total_staked,
            "reward claimed"
        );
        Ok(payout)
    }

    /// Staked amount of `account` (receipt view, not transferable).
    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.positions.get(account).map(|p| p.staked).unwrap_or(0)
    }

    /// Total staked across all accounts.
    pub fn total_supply(&self) -> u128 {
        self.total_staked
    }

    /// Rewards `account` could claim at `now` (ignores the claim gates).
    pub fn earned(&self, account: &AccountId, now: Timestamp) -> Result<u128, StakingError> {
        Ok(self.accrue(account, now)?.earned)
    }

    pub fn state_of(&self, account: &AccountId) -> StakeState {
        self.positions
            .get(account)
            .map(StakePosition::state)
            .unwrap_or(StakeState::Unstaked)
    }

    // ── Withdrawal timer ───────────────────────────────────────────────

    /// Start (or restart) the withdrawal cool-down for `caller`.
    pub fn request_withdraw(&mut self, caller: &AccountId, now: Timestamp) -> Result<(), StakingError> {
        let position = self
            .positions
            .get_mut(caller)
            .filter(|p| p.staked > 0)
            .ok_or(StakingError::NoStake)?;
        let restarted = position.withdraw_requested_at.replace(now).is_some();
        debug!(
            account = %caller,
            cooldown_secs = self.params.withdraw_cooldown_secs,
            restarted,
            "withdraw requested"
        );
        Ok(())
    }

    /// Seconds of cool-down left on `account`'s withdrawal request.
    ///
    /// Zero when there is no request or the cool-down has elapsed.
    pub fn withdraw_pending(&self, account: &AccountId, now: Timestamp) -> u64 {
        self.positions
            .get(account)
            .and_then(|p| p.withdraw_requested_at)
            .map(|at| at.remaining(self.params.withdraw_cooldown_secs, now))
            .unwrap_or(0)
    }

    /// Return `caller`'s whole stake once the cool-down has elapsed.
    ///
    /// Rewards earned but not yet claimed are forfeited and stay in custody.
    pub fn withdraw(&mut self, caller: &AccountId, now: Timestamp) -> Result<u128, StakingError> {
        let position = self
            .positions
            .get(caller)
            .filter(|p| p.staked > 0)
            .ok_or(StakingError::NoStake)?;
        let requested_at = position
            .withdraw_requested_at
            .ok_or(StakingError::NoPendingWithdraw)?;
        let remaining_secs = requested_at.remaining(self.params.withdraw_cooldown_secs, now);
        if remaining_secs > 0 {
            return Err(StakingError::WithdrawPending { remaining_secs });
        }
        let amount = position.staked;
        let total_staked = self
            .total_staked
            .checked_sub(amount)
            .ok_or(StakingError::Overflow)?;
        let accrual = self.accrue(caller, now)?;

        let custody = self.custody;
        self.move_tokens(&custody, caller, amount, "withdraw")?;

        self.commit(caller, &accrual, now);
        if let Some(position) = self.positions.get_mut(caller) {
            position.staked = 0;
            position.rewards = 0;
            position.withdraw_requested_at = None;
        }
        self.total_staked = total_staked;
        debug!(
            account = %caller,
            amount,
            forfeited = accrual.earned,
            total_staked,
            "withdrawn"
        );
        Ok(amount)
    }

    // ── Views ──────────────────────────────────────────────────────────

    /// Identity of the token being staked.
    pub fn staking_token(&self) -> &TokenInfo {
        self.token.info()
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    /// Direct access to the token ledger, for funding accounts outside the
    /// staking flow.
    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn custody(&self) -> &AccountId {
        &self.custody
    }

    pub fn params(&self) -> &StakingParams {
        &self.params
    }

    pub fn schedule(&self) -> Option<&RewardSchedule> {
        self.schedule.as_ref()
    }

    pub fn position(&self, account: &AccountId) -> Option<&StakePosition> {
        self.positions.get(account)
    }

    pub fn positions(&self) -> impl Iterator<Item = (&AccountId, &StakePosition)> {
        self.positions.iter()
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn ensure_owner(&self, caller: &AccountId) -> Result<(), StakingError> {
        if *caller != self.owner {
            return Err(StakingError::Unauthorized(*caller));
        }
        Ok(())
    }

    fn accrue(&self, account: &AccountId, now: Timestamp) -> Result<Accrual, StakingError> {
        let reward_per_token = self.reward_per_token(now)?;
        let earned = match self.positions.get(account) {
            Some(position) => position.earned(reward_per_token)?,
            None => 0,
        };
        Ok(Accrual {
            reward_per_token,
            earned,
        })
    }

    fn commit(&mut self, account: &AccountId, accrual: &Accrual, now: Timestamp) {
        if let Some(schedule) = self.schedule.as_mut() {
            schedule.apply_checkpoint(accrual.reward_per_token, now);
        }
        let position = self.positions.entry(*account).or_default();
        position.rewards = accrual.earned;
        position.reward_per_token_paid = accrual.reward_per_token;
    }

    fn move_tokens(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
        op: &'static str,
    ) -> Result<(), StakingError> {
        self.token.transfer(from, to, amount).map_err(|e| {
            warn!(op, %from, %to, amount, error = %e, "token transfer rejected");
            StakingError::TransferFailed(e)
        })
    }
}

impl<T: TokenLedger> StakingLedger<T> {
    /// Persist all ledger state to a staking store.
    ///
    /// The token ledger is not part of the snapshot; it persists itself.
    pub fn save_to_store(&self, store: &dyn StakingStore) -> Result<(), StakingError> {
        store.set_schema_version(SCHEMA_VERSION)?;
        let header = LedgerHeader {
            owner: self.owner,
            custody: self.custody,
            params: self.params.clone(),
            schedule: self.schedule.clone(),
            total_staked: self.total_staked,
        };
        let bytes =
            bincode::serialize(&header).map_err(|e| StakingError::Storage(e.to_string()))?;
        store.put_meta(HEADER_KEY, &bytes)?;

        for (account, position) in &self.positions {
            let bytes =
                bincode::serialize(position).map_err(|e| StakingError::Storage(e.to_string()))?;
            store.put_position(account, &bytes)?;
        }
        debug!(positions = self.positions.len(), "staking ledger saved");
        Ok(())
    }

    /// Restore ledger state from a staking store, re-attaching `token`.
    pub fn load_from_store(store: &dyn StakingStore, token: T) -> Result<Self, StakingError> {
        match store.get_schema_version()? {
            Some(SCHEMA_VERSION) => {}
            Some(found) => {
                return Err(StoreError::SchemaMismatch {
                    found,
                    expected: SCHEMA_VERSION,
                }
                .into())
            }
            None => return Err(StoreError::NotFound("schema_version".to_string()).into()),
        }

        let bytes = store
            .get_meta(HEADER_KEY)?
            .ok_or_else(|| StoreError::NotFound(HEADER_KEY.to_string()))?;
        let header: LedgerHeader =
            bincode::deserialize(&bytes).map_err(|e| StakingError::Storage(e.to_string()))?;

        let mut positions = HashMap::new();
        for (account, bytes) in store.iter_positions()? {
            let position: StakePosition =
                bincode::deserialize(&bytes).map_err(|e| StakingError::Storage(e.to_string()))?;
            positions.insert(account, position);
        }

        let sum = positions
            .values()
            .try_fold(0u128, |acc, p| acc.checked_add(p.staked))
            .ok_or(StakingError::Overflow)?;
        if sum != header.total_staked {
            return Err(StakingError::Storage(format!(
                "positions sum to {sum} but header records {}",
                header.total_staked
            )));
        }

        Ok(Self {
            token,
            owner: header.owner,
            custody: header.custody,
            params: header.params,
            schedule: header.schedule,
            positions,
            total_staked: header.total_staked,
        })
    }
}
