//! Petty-cash errors.

use lodgebook_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by petty-cash movements.
#[derive(Debug, Error)]
pub enum PettyCashError {
    /// Petty-cash account not found.
    #[error("Petty cash account not found: {0}")]
    AccountNotFound(Uuid),

    /// Main-ledger account code does not resolve.
    #[error("Ledger account not found: {0}")]
    LedgerAccountNotFound(String),

    /// Amount must be positive.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Not enough cash in the box or in the funding account.
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Balance available.
        available: Decimal,
        /// Amount requested.
        requested: Decimal,
    },

    /// Counterparty account has the wrong type.
    #[error("Account {code} must be {expected}")]
    WrongAccountType {
        /// Account code.
        code: String,
        /// What it must be.
        expected: &'static str,
    },

    /// Counterparty is the petty-cash ledger account itself.
    #[error("Account {0} is the petty cash account and cannot be its own counterparty")]
    SameAccount(String),

    /// Category accounts cannot receive postings.
    #[error("Account {0} is a category and cannot receive postings")]
    CategoryAccount(String),

    /// Beginning balance set after activity started.
    #[error("Beginning balance can only be set before any transaction")]
    BeginningBalanceLocked,
}

impl PettyCashError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "PETTY_CASH_ACCOUNT_NOT_FOUND",
            Self::LedgerAccountNotFound(_) => "LEDGER_ACCOUNT_NOT_FOUND",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::WrongAccountType { .. } => "WRONG_ACCOUNT_TYPE",
            Self::SameAccount(_) => "SAME_ACCOUNT",
            Self::CategoryAccount(_) => "CATEGORY_ACCOUNT",
            Self::BeginningBalanceLocked => "BEGINNING_BALANCE_LOCKED",
        }
    }
}

impl From<PettyCashError> for AppError {
    fn from(err: PettyCashError) -> Self {
        let message = err.to_string();
        match err {
            PettyCashError::AccountNotFound(_) => Self::NotFound(message),
            PettyCashError::InsufficientFunds { .. } => Self::InsufficientFunds(message),
            PettyCashError::LedgerAccountNotFound(_)
            | PettyCashError::InvalidAmount(_)
            | PettyCashError::WrongAccountType { .. }
            | PettyCashError::SameAccount(_)
            | PettyCashError::CategoryAccount(_)
            | PettyCashError::BeginningBalanceLocked => Self::Validation(message),
        }
    }
}
