//! Clock-injected, mutex-serialised access to a staking ledger.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, Instrument};
use vetme_staking::{ClaimPayout, RewardSchedule, StakePosition, StakingLedger};
use vetme_store::StakingStore;
use vetme_token::{Bep20Ledger, TokenInfo, TokenLedger};
use vetme_types::{format_amount, AccountId, Clock, StakeState, Timestamp};

use crate::config::ServiceConfig;
use crate::tracing_spans::{ledger_op_span, record_now, schedule_span};
use crate::ServiceError;

/// Shared handle to one staking ledger and the token ledger it owns.
///
/// Every operation takes a single lock and only then reads the injected
/// clock, so operations are globally serialised and their timestamps never
/// run backwards. Clones share the same ledger.
pub struct StakingService<T: TokenLedger> {
    ledger: Arc<Mutex<StakingLedger<T>>>,
    clock: Arc<dyn Clock>,
}

impl<T: TokenLedger> Clone for StakingService<T> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl StakingService<Bep20Ledger> {
    /// Build a fresh ledger from configuration, minting the genesis supply
    /// to the configured owner.
    pub fn from_config(config: &ServiceConfig, clock: Arc<dyn Clock>) -> Result<Self, ServiceError> {
        config.validate()?;
        let owner = config.owner_account()?;
        let custody = config.custody_account()?;
        let token = Bep20Ledger::with_genesis(owner, config.genesis_supply_raw()?, config.token_info());
        let ledger = StakingLedger::new(token, owner, custody, config.staking_params()?);
        info!(
            owner = %owner,
            custody = %custody,
            cooldown_secs = config.withdraw_cooldown_secs,
            "staking service initialised"
        );
        Ok(Self::new(ledger, clock))
    }
}

impl<T: TokenLedger> StakingService<T> {
    pub fn new(ledger: StakingLedger<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            clock,
        }
    }

    /// Restore a ledger previously written with [`save`](Self::save).
    pub fn load(store: &dyn StakingStore, token: T, clock: Arc<dyn Clock>) -> Result<Self, ServiceError> {
        let ledger = StakingLedger::load_from_store(store, token)?;
        Ok(Self::new(ledger, clock))
    }

    pub async fn save(&self, store: &dyn StakingStore) -> Result<(), ServiceError> {
        self.ledger.lock().await.save_to_store(store)?;
        Ok(())
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Exclusive access to the ledger. Operations queue behind the guard
    /// and read the clock only once they hold it.
    pub async fn lock_ledger(&self) -> MutexGuard<'_, StakingLedger<T>> {
        self.ledger.lock().await
    }

    /// Take the ledger lock, then read the clock, so operations apply in
    /// timestamp order.
    async fn acquire(&self) -> (MutexGuard<'_, StakingLedger<T>>, Timestamp) {
        let ledger = self.ledger.lock().await;
        let now = self.clock.now();
        record_now(now);
        (ledger, now)
    }

    // ── Account operations ─────────────────────────────────────────────

    pub async fn stake(&self, caller: &AccountId, amount: u128) -> Result<(), ServiceError> {
        async {
            let (mut ledger, now) = self.acquire().await;
            ledger.stake(caller, amount, now)?;
            Ok::<_, ServiceError>(())
        }
        .instrument(ledger_op_span("stake", caller))
        .await
    }

    pub async fn request_withdraw(&self, caller: &AccountId) -> Result<(), ServiceError> {
        async {
            let (mut ledger, now) = self.acquire().await;
            ledger.request_withdraw(caller, now)?;
            Ok::<_, ServiceError>(())
        }
        .instrument(ledger_op_span("request_withdraw", caller))
        .await
    }

    /// Returns the amount sent back to `caller`.
    pub async fn withdraw(&self, caller: &AccountId) -> Result<u128, ServiceError> {
        async {
            let (mut ledger, now) = self.acquire().await;
            Ok::<_, ServiceError>(ledger.withdraw(caller, now)?)
        }
        .instrument(ledger_op_span("withdraw", caller))
        .await
    }

    /// Returns the reward paid and the stake released to `caller`.
    pub async fn claim_reward(&self, caller: &AccountId) -> Result<ClaimPayout, ServiceError> {
        async {
            let (mut ledger, now) = self.acquire().await;
            Ok::<_, ServiceError>(ledger.claim_reward(caller, now)?)
        }
        .instrument(ledger_op_span("claim_reward", caller))
        .await
    }

    /// Move tokens on the underlying token ledger, outside the staking flow.
    pub async fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), ServiceError> {
        async {
            let (mut ledger, _) = self.acquire().await;
            ledger.token_mut().transfer(from, to, amount)?;
            Ok::<_, ServiceError>(())
        }
        .instrument(ledger_op_span("transfer", from))
        .await
    }

    // ── Owner operations ───────────────────────────────────────────────

    pub async fn set_rewards_duration(&self, caller: &AccountId, duration: u64) -> Result<(), ServiceError> {
        async {
            let (mut ledger, now) = self.acquire().await;
            ledger.set_rewards_duration(caller, duration, now)?;
            Ok::<_, ServiceError>(())
        }
        .instrument(schedule_span("set_rewards_duration"))
        .await
    }

    pub async fn notify_reward_amount(&self, caller: &AccountId, amount: u128) -> Result<(), ServiceError> {
        async {
            let (mut ledger, now) = self.acquire().await;
            ledger.notify_reward_amount(caller, amount, now)?;
            Ok::<_, ServiceError>(())
        }
        .instrument(schedule_span("notify_reward_amount"))
        .await
    }

    // ── Views ──────────────────────────────────────────────────────────

    pub async fn balance_of(&self, account: &AccountId) -> u128 {
        self.ledger.lock().await.balance_of(account)
    }

    pub async fn total_supply(&self) -> u128 {
        self.ledger.lock().await.total_supply()
    }

    /// Balance on the token ledger (not the staked amount).
    pub async fn token_balance(&self, account: &AccountId) -> u128 {
        self.ledger.lock().await.token().balance_of(account)
    }

    pub async fn token_supply(&self) -> u128 {
        self.ledger.lock().await.token().total_supply()
    }

    pub async fn withdraw_pending(&self, account: &AccountId) -> u64 {
        let (ledger, now) = self.acquire().await;
        ledger.withdraw_pending(account, now)
    }

    pub async fn earned(&self, account: &AccountId) -> Result<u128, ServiceError> {
        let (ledger, now) = self.acquire().await;
        Ok(ledger.earned(account, now)?)
    }

    pub async fn reward_per_token(&self) -> Result<u128, ServiceError> {
        let (ledger, now) = self.acquire().await;
        Ok(ledger.reward_per_token(now)?)
    }

    pub async fn state_of(&self, account: &AccountId) -> StakeState {
        self.ledger.lock().await.state_of(account)
    }

    pub async fn position(&self, account: &AccountId) -> Option<StakePosition> {
        self.ledger.lock().await.position(account).cloned()
    }

    pub async fn schedule(&self) -> Option<RewardSchedule> {
        self.ledger.lock().await.schedule().cloned()
    }

    pub async fn staking_token(&self) -> TokenInfo {
        self.ledger.lock().await.staking_token().clone()
    }

    pub async fn owner(&self) -> AccountId {
        *self.ledger.lock().await.owner()
    }

    pub async fn custody(&self) -> AccountId {
        *self.ledger.lock().await.custody()
    }

    /// Point-in-time view of the ledger and the given accounts.
    pub async fn snapshot(&self, accounts: &[(String, AccountId)]) -> Result<LedgerSnapshot, ServiceError> {
        let (ledger, now) = self.acquire().await;
        let mut rows = Vec::with_capacity(accounts.len());
        for (label, account) in accounts {
            rows.push(AccountSnapshot {
                label: label.clone(),
                account: account.to_string(),
                token_balance: format_amount(ledger.token().balance_of(account)),
                staked: format_amount(ledger.balance_of(account)),
                earned: format_amount(ledger.earned(account, now)?),
                state: ledger.state_of(account).to_string(),
                withdraw_pending_secs: ledger.withdraw_pending(account, now),
            });
        }
        Ok(LedgerSnapshot {
            at: now.as_secs(),
            total_staked: format_amount(ledger.total_supply()),
            custody_balance: format_amount(ledger.token().balance_of(ledger.custody())),
            epoch: ledger.schedule().map(|s| s.epoch).unwrap_or(0),
            period_end: ledger.schedule().map(|s| s.period_end().as_secs()),
            accounts: rows,
        })
    }
}

/// Amounts are rendered in whole tokens.
#[derive(Clone, Debug, Serialize)]
pub struct AccountSnapshot {
    pub label: String,
    pub account: String,
    pub token_balance: String,
    pub staked: String,
    pub earned: String,
    pub state: String,
    pub withdraw_pending_secs: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct LedgerSnapshot {
    pub at: u64,
    pub total_staked: String,
    pub custody_balance: String,
    pub epoch: u64,
    pub period_end: Option<u64>,
    pub accounts: Vec<AccountSnapshot>,
}

impl LedgerSnapshot {
    pub fn account(&self, label: &str) -> Option<&AccountSnapshot> {
        self.accounts.iter().find(|a| a.label == label)
    }
}
