//! Shared utilities for the VetMe staking ledger.

pub mod time;

pub use time::format_duration;
