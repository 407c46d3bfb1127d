//! Reconciliation types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ReconciliationError;
use crate::ledger::EntryType;

/// Which side of the reconciliation an item comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    /// A journal entry from the main ledger.
    Book,
    /// A line of the bank statement.
    Bank,
}

impl ItemSource {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Bank => "bank",
        }
    }
}

impl std::fmt::Display for ItemSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconciliation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationStatus {
    /// At least one item is still unmatched.
    Pending,
    /// Every item is matched.
    Reconciled,
}

/// Signed book amount: money into the account is positive.
#[must_use]
pub fn book_amount(entry_type: EntryType, amount: Decimal) -> Decimal {
    match entry_type {
        EntryType::Debit => amount,
        EntryType::Credit => -amount,
    }
}

/// One bank statement line as imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLineInput {
    /// Value date on the bank side.
    pub bank_date: NaiveDate,
    /// Bank narrative.
    pub description: String,
    /// Bank reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Money leaving the account.
    #[serde(default)]
    pub debit_amount: Decimal,
    /// Money entering the account.
    #[serde(default)]
    pub credit_amount: Decimal,
    /// Running balance printed by the bank.
    #[serde(default)]
    pub balance: Option<Decimal>,
}

impl StatementLineInput {
    /// Exactly one of debit/credit must be positive, and neither negative.
    pub fn validate(&self, line: usize) -> Result<(), ReconciliationError> {
        let invalid = |reason: &str| ReconciliationError::InvalidStatementLine {
            line,
            reason: reason.to_string(),
        };

        if self.debit_amount.is_sign_negative() && !self.debit_amount.is_zero() {
            return Err(invalid("debit amount is negative"));
        }
        if self.credit_amount.is_sign_negative() && !self.credit_amount.is_zero() {
            return Err(invalid("credit amount is negative"));
        }

        match (self.debit_amount > Decimal::ZERO, self.credit_amount > Decimal::ZERO) {
            (true, false) | (false, true) => Ok(()),
            (true, true) => Err(invalid("line has both debit and credit")),
            (false, false) => Err(invalid("line has neither debit nor credit")),
        }
    }

    /// Signed bank amount: credits (deposits) positive, debits negative.
    #[must_use]
    pub fn bank_amount(&self) -> Decimal {
        self.credit_amount - self.debit_amount
    }
}

/// An item as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    /// Reconciliation item ID.
    pub id: Uuid,
    /// Book or bank.
    pub source: ItemSource,
    /// Item date.
    pub date: NaiveDate,
    /// Statement position for bank items; zero for book items.
    pub position: i32,
    /// Signed amount.
    pub amount: Decimal,
    /// Already matched.
    pub is_reconciled: bool,
}

/// A proposed book/bank pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchProposal {
    /// Book item.
    pub book_item_id: Uuid,
    /// Bank item.
    pub bank_item_id: Uuid,
    /// Matched amount.
    pub amount: Decimal,
    /// Days between the two dates.
    pub days_apart: i64,
    /// 1.00 for same-day matches, lower as the dates drift.
    pub confidence: Decimal,
    /// Human-readable explanation.
    pub reason: String,
}

/// A pairing confirmed by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedMatch {
    /// Book item.
    pub book_item_id: Uuid,
    /// Bank item.
    pub bank_item_id: Uuid,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// The fields needed to validate one side of a confirmed match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRef {
    /// Item ID.
    pub id: Uuid,
    /// Owning reconciliation.
    pub reconciliation_id: Uuid,
    /// Book or bank.
    pub source: ItemSource,
    /// Already matched.
    pub is_reconciled: bool,
}

/// What to do with a confirmed match after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAction {
    /// Mark both items reconciled.
    Apply,
    /// One side is already matched; leave both untouched.
    Skip,
}
