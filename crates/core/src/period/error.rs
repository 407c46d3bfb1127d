//! Period engine errors.

use chrono::NaiveDate;
use lodgebook_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while managing periods and their balances.
#[derive(Debug, Error)]
pub enum PeriodError {
    /// Period not found.
    #[error("Period not found: {0}")]
    NotFound(Uuid),

    /// Start date after end date.
    #[error("Period start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// New period overlaps an existing one.
    #[error("Period overlaps existing period {0}")]
    Overlap(String),

    /// New period leaves a gap after the latest period.
    #[error("Period must start on {expected}, got {actual}")]
    NotContiguous {
        /// Required start date.
        expected: NaiveDate,
        /// Requested start date.
        actual: NaiveDate,
    },

    /// Closing an already closed period.
    #[error("Period {0} is already closed")]
    AlreadyClosed(String),

    /// Closing needs a pre-created successor to receive balances.
    #[error("Period {0} has no subsequent period to carry balances into")]
    NoSubsequentPeriod(String),

    /// Closing out of order while the period before is still open.
    #[error("Period {period} cannot close before preceding period {preceding}")]
    PrecedingPeriodOpen {
        /// Period being closed.
        period: String,
        /// Open period right before it.
        preceding: String,
    },

    /// No balance row for the account in this period.
    #[error("No balance for account {account_id} in period {period_id}")]
    BalanceNotFound {
        /// Account ID.
        account_id: Uuid,
        /// Period ID.
        period_id: Uuid,
    },

    /// Explicit opening of a row that already exists.
    #[error("Account {account_id} is already open in period {period_id}")]
    BalanceExists {
        /// Account ID.
        account_id: Uuid,
        /// Period ID.
        period_id: Uuid,
    },

    /// Account referenced by a period operation does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
}

impl PeriodError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "PERIOD_NOT_FOUND",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::Overlap(_) => "PERIOD_OVERLAP",
            Self::NotContiguous { .. } => "PERIOD_NOT_CONTIGUOUS",
            Self::AlreadyClosed(_) => "PERIOD_ALREADY_CLOSED",
            Self::NoSubsequentPeriod(_) => "NO_SUBSEQUENT_PERIOD",
            Self::PrecedingPeriodOpen { .. } => "PRECEDING_PERIOD_OPEN",
            Self::BalanceNotFound { .. } => "PERIOD_BALANCE_NOT_FOUND",
            Self::BalanceExists { .. } => "PERIOD_BALANCE_EXISTS",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
        }
    }
}

impl From<PeriodError> for AppError {
    fn from(err: PeriodError) -> Self {
        let message = err.to_string();
        match err {
            PeriodError::NotFound(_)
            | PeriodError::BalanceNotFound { .. }
            | PeriodError::AccountNotFound(_) => Self::NotFound(message),
            PeriodError::AlreadyClosed(_) | PeriodError::BalanceExists { .. } => {
                Self::Conflict(message)
            }
            PeriodError::InvalidDateRange { .. }
            | PeriodError::Overlap(_)
            | PeriodError::NotContiguous { .. }
            | PeriodError::NoSubsequentPeriod(_)
            | PeriodError::PrecedingPeriodOpen { .. } => Self::Validation(message),
        }
    }
}
