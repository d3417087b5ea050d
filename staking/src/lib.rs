//! Staking ledger — the accounting core of a stake / withdraw / claim cycle.
//!
//! Accounts stake a fungible token into the ledger's custody while a reward
//! period is open. Rewards funded by the owner are released linearly up to
//! period end and split pro rata by stake:
//!
//! `reward_per_token += funded × Δt × PRECISION / (segment × denominator)`
//!
//! The denominator is the configured pool size (`total_for_stake`) when set,
//! otherwise the total currently staked. Claiming after the period ends pays
//! the reward and releases the stake in one transfer.
//!
//! This crate handles:
//! - The reward schedule (staking window, funding, accrual)
//! - Per-account stake positions and their state machine
//! - The two-phase withdrawal with a fixed cool-down
//! - Persisting ledger state through `vetme-store`

pub mod error;
pub mod ledger;
pub mod math;
pub mod position;
pub mod schedule;

pub use error::StakingError;
pub use ledger::{ClaimPayout, StakingLedger};
pub use math::PRECISION;
pub use position::StakePosition;
pub use schedule::RewardSchedule;
