//! Reconciliation errors.

use chrono::NaiveDate;
use lodgebook_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use super::types::ItemSource;

/// Errors raised while importing statements and reconciling accounts.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// Reconciliation not found.
    #[error("Reconciliation not found: {0}")]
    NotFound(Uuid),

    /// Bank statement not found.
    #[error("Bank statement not found: {0}")]
    StatementNotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// The statement belongs to a different account.
    #[error("Bank statement {statement_id} does not belong to account {account_id}")]
    StatementAccountMismatch {
        /// Statement ID.
        statement_id: Uuid,
        /// Account being reconciled.
        account_id: Uuid,
    },

    /// One reconciliation per account and date.
    #[error("Account {account_id} already has a reconciliation on {date}")]
    Duplicate {
        /// Account ID.
        account_id: Uuid,
        /// Reconciliation date.
        date: NaiveDate,
    },

    /// Malformed bank statement line.
    #[error("Statement line {line}: {reason}")]
    InvalidStatementLine {
        /// Zero-based line position.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Matched item does not exist.
    #[error("Reconciliation item not found: {0}")]
    ItemNotFound(Uuid),

    /// Matched item belongs to another reconciliation.
    #[error("Item {item_id} does not belong to reconciliation {reconciliation_id}")]
    ForeignItem {
        /// Item ID.
        item_id: Uuid,
        /// Reconciliation being updated.
        reconciliation_id: Uuid,
    },

    /// Matched item is on the wrong side.
    #[error("Item {item_id} is not a {expected} item")]
    WrongSource {
        /// Item ID.
        item_id: Uuid,
        /// Side it was expected on.
        expected: ItemSource,
    },
}

impl ReconciliationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "RECONCILIATION_NOT_FOUND",
            Self::StatementNotFound(_) => "STATEMENT_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::StatementAccountMismatch { .. } => "STATEMENT_ACCOUNT_MISMATCH",
            Self::Duplicate { .. } => "DUPLICATE_RECONCILIATION",
            Self::InvalidStatementLine { .. } => "INVALID_STATEMENT_LINE",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::ForeignItem { .. } => "FOREIGN_ITEM",
            Self::WrongSource { .. } => "WRONG_ITEM_SOURCE",
        }
    }
}

impl From<ReconciliationError> for AppError {
    fn from(err: ReconciliationError) -> Self {
        let message = err.to_string();
        match err {
            ReconciliationError::NotFound(_) | ReconciliationError::StatementNotFound(_) => {
                Self::NotFound(message)
            }
            ReconciliationError::Duplicate { .. } => Self::Conflict(message),
            ReconciliationError::AccountNotFound(_)
            | ReconciliationError::StatementAccountMismatch { .. }
            | ReconciliationError::InvalidStatementLine { .. }
            | ReconciliationError::ItemNotFound(_)
            | ReconciliationError::ForeignItem { .. }
            | ReconciliationError::WrongSource { .. } => Self::Validation(message),
        }
    }
}
