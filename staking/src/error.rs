//! Staking-ledger errors.
//!
//! Every error aborts the triggering call with no state change.

use thiserror::Error;
use vetme_token::TokenError;
use vetme_types::AccountId;

#[derive(Debug, Error)]
pub enum StakingError {
    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("staking has not started")]
    NotStarted,

    #[error("staking period has ended")]
    StakingEnded,

    #[error("account has no stake")]
    NoStake,

    #[error("account has no pending withdraw")]
    NoPendingWithdraw,

    #[error("withdraw pending: {remaining_secs}s of cool-down left")]
    WithdrawPending { remaining_secs: u64 },

    #[error("staking period is not over")]
    PeriodNotOver,

    #[error("reward has already been claimed")]
    AlreadyClaimed,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("token transfer failed: {0}")]
    TransferFailed(#[from] TokenError),

    #[error("{0} is not the ledger owner")]
    Unauthorized(AccountId),

    #[error("stake of {requested} exceeds remaining capacity {available}")]
    CapacityExceeded { requested: u128, available: u128 },

    #[error("arithmetic overflow in staking computation")]
    Overflow,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<vetme_store::StoreError> for StakingError {
    fn from(e: vetme_store::StoreError) -> Self {
        Self::Storage(e.to_string())
    }
}
