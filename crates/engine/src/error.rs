//! The module contains the errors the engine can throw.
//!
//! Each failure class from the expense/income pipeline gets its own kind so
//! callers can map errors to transport statuses without inspecting message
//! text:
//!
//! - [`SplitExceedsTotal`] thrown when the splits sum past the bill total.
//! - [`PaidSumMismatch`] thrown when payments don't cover the bill total.
//! - [`InsufficientFunds`] thrown when the funds check rejects a debit.
//! - [`KeyNotFound`] thrown when an item is absent or owned by another user.
//!
//!  [`SplitExceedsTotal`]: EngineError::SplitExceedsTotal
//!  [`PaidSumMismatch`]: EngineError::PaidSumMismatch
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Splits exceed the bill total: {0}")]
    SplitExceedsTotal(String),
    #[error("Paid sum mismatch: {0}")]
    PaidSumMismatch(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::SplitExceedsTotal(a), Self::SplitExceedsTotal(b)) => a == b,
            (Self::PaidSumMismatch(a), Self::PaidSumMismatch(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
