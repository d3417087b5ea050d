//! In-memory BEP20-style ledger.

use std::collections::HashMap;

use crate::error::TokenError;
use crate::token::{TokenInfo, TokenLedger};
use serde::{Deserialize, Serialize};
use vetme_types::AccountId;

/// Account → balance map with a supply fixed at genesis (plus explicit mints).
///
/// Invariant: the sum of all balances equals `total_supply`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Bep20Ledger {
    info: TokenInfo,
    balances: HashMap<AccountId, u128>,
    total_supply: u128,
}

impl Bep20Ledger {
    /// An empty ledger with no supply.
    pub fn new(info: TokenInfo) -> Self {
        Self {
            info,
            balances: HashMap::new(),
            total_supply: 0,
        }
    }

    /// A ledger whose entire `supply` (raw units) is held by `owner`.
    pub fn with_genesis(owner: AccountId, supply: u128, info: TokenInfo) -> Self {
        let mut ledger = Self::new(info);
        if supply > 0 {
            ledger.balances.insert(owner, supply);
        }
        ledger.total_supply = supply;
        ledger
    }

    /// Create `amount` new tokens in `to`.
    pub fn mint(&mut self, to: &AccountId, amount: u128) -> Result<(), TokenError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.total_supply = supply;
        self.balances.insert(*to, balance);
        Ok(())
    }

    /// Accounts with a nonzero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, &u128)> {
        self.balances.iter().filter(|(_, b)| **b > 0)
    }
}

impl TokenLedger for Bep20Ledger {
    fn info(&self) -> &TokenInfo {
        &self.info
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        if amount == 0 || from == to {
            // Still surface an overdraft for self-transfers.
            let available = self.balance_of(from);
            if available < amount {
                return Err(TokenError::InsufficientBalance {
                    account: *from,
                    needed: amount,
                    available,
                });
            }
            return Ok(());
        }
        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                account: *from,
                needed: amount,
                available,
            })?;
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(*from, debited);
        self.balances.insert(*to, credited);
        Ok(())
    }
}
