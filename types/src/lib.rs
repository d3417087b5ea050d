//! Fundamental types for the VetMe staking ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identifiers, token amounts, timestamps, staking parameters and position states.

pub mod address;
pub mod amount;
pub mod error;
pub mod params;
pub mod state;
pub mod time;

pub use address::AccountId;
pub use amount::{format_amount, to_raw, TOKEN_DECIMALS, TOKEN_UNIT};
pub use error::TypesError;
pub use params::{StakingParams, DEFAULT_WITHDRAW_COOLDOWN_SECS};
pub use state::StakeState;
pub use time::{Clock, SystemClock, Timestamp};
