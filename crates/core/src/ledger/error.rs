//! Ledger error types for validation and state errors.

use chrono::NaiveDate;
use lodgebook_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::{AccountType, TransactionStatus};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Transaction must have at least 2 entries.
    #[error("Transaction must have at least 2 entries")]
    InsufficientEntries,

    /// Transaction is not balanced (debits != credits beyond tolerance).
    #[error("Transaction is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedTransaction {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Entry amount must be strictly positive after rounding.
    #[error("Entry amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    // ========== Account Errors ==========
    /// Account does not exist or is soft-deleted.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account code does not resolve to a live account.
    #[error("Account code not found: {0}")]
    AccountCodeNotFound(String),

    /// Category accounts group others and never carry entries.
    #[error("Account {0} is a category and cannot carry entries")]
    CategoryAccount(Uuid),

    /// Account code prefix contradicts the declared type.
    #[error("Account code {code} does not match account type {account_type}")]
    CodeTypeMismatch {
        /// The offending code.
        code: String,
        /// The declared type.
        account_type: AccountType,
    },

    /// Account code already taken.
    #[error("Account code already exists: {0}")]
    DuplicateAccountCode(String),

    /// Parent must exist and be a category.
    #[error("Parent account {0} is missing or not a category")]
    InvalidParent(Uuid),

    /// Account still referenced by children or journal entries.
    #[error("Account {0} is still in use and cannot be deleted")]
    AccountInUse(Uuid),

    // ========== Transaction State Errors ==========
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Transaction is not in the state the operation requires.
    #[error("Transaction {id} is {status:?}, expected {expected:?}")]
    InvalidStatus {
        /// Transaction ID.
        id: Uuid,
        /// Current status.
        status: TransactionStatus,
        /// Required status.
        expected: TransactionStatus,
    },

    /// Voided transactions are terminal.
    #[error("Cannot modify voided transaction {0}")]
    CannotModifyVoided(Uuid),

    /// An entry is already matched in a reconciliation.
    #[error("Journal entry {0} is reconciled and cannot change")]
    EntryReconciled(Uuid),

    /// The posting date falls into a closed period.
    #[error("Period {name} covering {date} is closed")]
    PeriodClosed {
        /// Period name.
        name: String,
        /// The posting date.
        date: NaiveDate,
    },

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientEntries => "INSUFFICIENT_ENTRIES",
            Self::UnbalancedTransaction { .. } => "UNBALANCED_TRANSACTION",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::AccountNotFound(_) | Self::AccountCodeNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::CategoryAccount(_) => "CATEGORY_ACCOUNT",
            Self::CodeTypeMismatch { .. } => "CODE_TYPE_MISMATCH",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::InvalidParent(_) => "INVALID_PARENT",
            Self::AccountInUse(_) => "ACCOUNT_IN_USE",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::InvalidStatus { .. } => "INVALID_STATUS",
            Self::CannotModifyVoided(_) => "CANNOT_MODIFY_VOIDED",
            Self::EntryReconciled(_) => "ENTRY_RECONCILED",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            // Referenced accounts that do not resolve are malformed input.
            LedgerError::InsufficientEntries
            | LedgerError::UnbalancedTransaction { .. }
            | LedgerError::NonPositiveAmount(_)
            | LedgerError::AccountNotFound(_)
            | LedgerError::AccountCodeNotFound(_)
            | LedgerError::CategoryAccount(_)
            | LedgerError::CodeTypeMismatch { .. }
            | LedgerError::InvalidParent(_)
            | LedgerError::AccountInUse(_)
            | LedgerError::CannotModifyVoided(_)
            | LedgerError::EntryReconciled(_)
            | LedgerError::PeriodClosed { .. } => Self::Validation(message),

            // Missing or not in the required state.
            LedgerError::TransactionNotFound(_) | LedgerError::InvalidStatus { .. } => {
                Self::NotFound(message)
            }

            LedgerError::DuplicateAccountCode(_) => Self::Conflict(message),
            LedgerError::Internal(_) => Self::Internal(message),
        }
    }
}
