//! Errors raised while parsing or constructing fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid account id: {0}")]
    InvalidAccount(String),

    #[error("amount overflows the raw token range")]
    AmountOverflow,
}
