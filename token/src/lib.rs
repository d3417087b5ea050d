//! Fungible token ledger — the collaborator the staking ledger moves funds through.
//!
//! The staking engine only ever talks to the [`TokenLedger`] trait. [`Bep20Ledger`]
//! is the in-memory implementation: a plain account → balance map with a fixed
//! supply minted at genesis. Allowances are not modelled; custody moves are a
//! single `transfer(from, to, amount)` call.

pub mod error;
pub mod ledger;
pub mod token;

pub use error::TokenError;
pub use ledger::Bep20Ledger;
pub use token::{TokenInfo, TokenLedger, GENESIS_SUPPLY_TOKENS};
