//! Account balance calculations.
//!
//! One formula serves the current-balance cache, period BD/CD rows and
//! account statements:
//! - Asset/Expense: balance = opening + debits - credits
//! - Liability/Equity/Revenue: balance = opening + credits - debits

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{AccountType, EntryType};

/// The side on which an account's balance grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalSide {
    /// Debit-normal accounts (Asset, Expense)
    Debit,
    /// Credit-normal accounts (Liability, Equity, Revenue)
    Credit,
}

impl NormalSide {
    /// Calculates the balance change for a debit/credit pair.
    #[must_use]
    pub fn calculate_balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Applies the type formula to an opening balance and side totals.
#[must_use]
pub fn compute_balance(
    account_type: AccountType,
    opening: Decimal,
    total_debits: Decimal,
    total_credits: Decimal,
) -> Decimal {
    opening
        + account_type
            .normal_side()
            .calculate_balance_change(total_debits, total_credits)
}

/// Signed effect of a single entry on an account's balance.
#[must_use]
pub fn entry_effect(account_type: AccountType, entry_type: EntryType, amount: Decimal) -> Decimal {
    let (debit, credit) = entry_type.split(amount);
    account_type
        .normal_side()
        .calculate_balance_change(debit, credit)
}

/// Aggregated debit/credit activity for one account.
///
/// Used both for the incremental path (one `apply` per posted entry) and for
/// the recompute path (replay every qualifying entry from zero).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceTotals {
    /// Sum of debit entries.
    pub total_debits: Decimal,
    /// Sum of credit entries.
    pub total_credits: Decimal,
    /// Number of entries applied.
    pub transaction_count: i64,
    /// Latest entry date seen.
    pub last_transaction_date: Option<NaiveDate>,
}

impl BalanceTotals {
    /// Adds one entry.
    pub fn apply(&mut self, entry_type: EntryType, amount: Decimal, date: NaiveDate) {
        match entry_type {
            EntryType::Debit => self.total_debits += amount,
            EntryType::Credit => self.total_credits += amount,
        }
        self.transaction_count += 1;
        self.last_transaction_date = Some(
            self.last_transaction_date
                .map_or(date, |last| last.max(date)),
        );
    }

    /// Rebuilds totals from scratch.
    pub fn replay<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (EntryType, Decimal, NaiveDate)>,
    {
        let mut totals = Self::default();
        for (entry_type, amount, date) in entries {
            totals.apply(entry_type, amount, date);
        }
        totals
    }

    /// Balance for an account of `account_type` starting from zero.
    #[must_use]
    pub fn balance(&self, account_type: AccountType) -> Decimal {
        compute_balance(
            account_type,
            Decimal::ZERO,
            self.total_debits,
            self.total_credits,
        )
    }
}

/// Running balance information for one line of an account statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningBalance {
    /// 1-based position of the line in the statement.
    pub sequence: i64,
    /// Balance before this entry.
    pub previous_balance: Decimal,
    /// Balance after this entry.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Creates the running balance for the first line after `opening`.
    #[must_use]
    pub fn first_entry(opening: Decimal, balance_change: Decimal) -> Self {
        Self {
            sequence: 1,
            previous_balance: opening,
            current_balance: opening + balance_change,
        }
    }

    /// Creates a new running balance based on the previous line.
    ///
    /// - current_balance[N] = previous_balance[N] + balance_change
    /// - previous_balance[N] = current_balance[N-1]
    #[must_use]
    pub fn next_entry(previous: &Self, balance_change: Decimal) -> Self {
        Self {
            sequence: previous.sequence + 1,
            previous_balance: previous.current_balance,
            current_balance: previous.current_balance + balance_change,
        }
    }
}
