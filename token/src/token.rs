//! Token metadata and the ledger trait.

use crate::error::TokenError;
use serde::{Deserialize, Serialize};
use vetme_types::{AccountId, TOKEN_DECIMALS};

/// Whole tokens minted to the deployer at genesis (500 million).
pub const GENESIS_SUPPLY_TOKENS: u128 = 500_000_000;

/// Identity of a fungible token, as reported by `staking_token()`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

impl Default for TokenInfo {
    fn default() -> Self {
        Self {
            name: "VetMe".to_string(),
            symbol: "VETME".to_string(),
            decimals: TOKEN_DECIMALS,
        }
    }
}

/// The balance-bookkeeping contract the staking ledger depends on.
///
/// `transfer` is the only mutation and must be all-or-nothing: on `Err` no
/// balance has moved.
pub trait TokenLedger {
    fn info(&self) -> &TokenInfo;

    fn total_supply(&self) -> u128;

    fn balance_of(&self, account: &AccountId) -> u128;

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError>;
}
