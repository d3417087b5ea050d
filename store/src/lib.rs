//! Abstract storage traits for the VetMe staking ledger.
//!
//! Every storage backend (in-memory for testing, or whatever the surrounding
//! service persists to) implements these traits. The staking engine depends
//! only on the traits and serializes its own records.

pub mod error;
pub mod meta;
pub mod staking;

pub use error::StoreError;
pub use meta::{MetaStore, SCHEMA_VERSION};
pub use staking::StakingStore;
