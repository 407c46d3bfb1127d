//! Balance period types.

use chrono::NaiveDate;
use lodgebook_shared::types::{AccountId, PeriodId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{AccountType, compute_balance};

/// A contiguous slice of time receiving postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSpan {
    /// Unique identifier.
    pub id: PeriodId,
    /// Period name (e.g., "January 2026").
    pub name: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
    /// Closed periods accept no postings.
    pub is_closed: bool,
}

impl PeriodSpan {
    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// The date the following period must start on.
    #[must_use]
    pub fn next_start_date(&self) -> Option<NaiveDate> {
        self.end_date.succ_opt()
    }
}

/// Per-account balance inside one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBalance {
    /// Account ID.
    pub account_id: AccountId,
    /// Account type, selecting the formula.
    pub account_type: AccountType,
    /// Balance brought down (opening).
    pub brought_down: Decimal,
    /// Debits posted in the period.
    pub total_debits: Decimal,
    /// Credits posted in the period.
    pub total_credits: Decimal,
    /// Entries posted in the period.
    pub transaction_count: i64,
}

impl PeriodBalance {
    /// Balance carried down: `f(type, BD, debits, credits)`.
    #[must_use]
    pub fn carried_down(&self) -> Decimal {
        compute_balance(
            self.account_type,
            self.brought_down,
            self.total_debits,
            self.total_credits,
        )
    }
}

/// One line of the period-end close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingLine {
    /// The recomputed row for the closing period.
    pub balance: PeriodBalance,
    /// Its carried-down balance.
    pub carried_down: Decimal,
}

/// Everything a close writes, computed before any row is touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosePlan {
    /// Recomputed rows of the period being closed.
    pub closing: Vec<ClosingLine>,
}

impl ClosePlan {
    /// `(account, BD for the next period)` pairs; BD replaces, never adds.
    pub fn carry_forward(&self) -> impl Iterator<Item = (AccountId, AccountType, Decimal)> + '_ {
        self.closing
            .iter()
            .map(|l| (l.balance.account_id, l.balance.account_type, l.carried_down))
    }
}

/// Audit values produced by a manual BD change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroughtDownAdjustment {
    /// BD before the change.
    pub previous_balance: Decimal,
    /// BD after the change.
    pub new_balance: Decimal,
    /// `new - previous`.
    pub adjustment_amount: Decimal,
    /// CD recomputed from the new BD.
    pub carried_down: Decimal,
}

/// One account line of a trial balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Balance brought down.
    pub brought_down: Decimal,
    /// Debits in the period.
    pub total_debits: Decimal,
    /// Credits in the period.
    pub total_credits: Decimal,
    /// Balance carried down.
    pub carried_down: Decimal,
}

/// Trial balance for a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Period ID.
    pub period_id: PeriodId,
    /// Period name.
    pub period_name: String,
    /// Account lines ordered by code.
    pub lines: Vec<TrialBalanceLine>,
    /// Σ CD of debit-normal accounts.
    pub total_debit_side: Decimal,
    /// Σ CD of credit-normal accounts.
    pub total_credit_side: Decimal,
    /// Whether both sides agree within one cent.
    pub is_balanced: bool,
}
