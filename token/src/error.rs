//! Token-ledger errors.

use thiserror::Error;
use vetme_types::AccountId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: AccountId,
        needed: u128,
        available: u128,
    },

    #[error("arithmetic overflow in token ledger")]
    Overflow,
}
