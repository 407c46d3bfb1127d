//! Ledger domain types for transaction creation and validation.
//!
//! This module defines the core types used for creating and validating
//! financial transactions in the double-entry bookkeeping system.

use chrono::NaiveDate;
use lodgebook_shared::types::{AccountId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::balance::NormalSide;

/// Account type stored explicitly on every account row.
///
/// The code prefix is a display convention only; the sign of a balance is
/// always taken from this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (cash, bank, receivables).
    Asset,
    /// Obligations (deposits held, payables).
    Liability,
    /// Owner's equity.
    Equity,
    /// Rent, fees and other income.
    Revenue,
    /// Running costs.
    Expense,
}

impl AccountType {
    /// Returns the side that increases this account's balance.
    ///
    /// - Asset/Expense: debit-normal
    /// - Liability/Equity/Revenue: credit-normal
    #[must_use]
    pub const fn normal_side(self) -> NormalSide {
        match self {
            Self::Asset | Self::Expense => NormalSide::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalSide::Credit,
        }
    }

    /// The leading digit used by the chart-of-accounts numbering.
    #[must_use]
    pub const fn code_prefix(self) -> char {
        match self {
            Self::Asset => '1',
            Self::Liability => '2',
            Self::Equity => '3',
            Self::Revenue => '4',
            Self::Expense => '5',
        }
    }

    /// Infers the conventional type for an account code.
    #[must_use]
    pub fn from_code_prefix(code: &str) -> Option<Self> {
        match code.trim().chars().next()? {
            '1' => Some(Self::Asset),
            '2' => Some(Self::Liability),
            '3' => Some(Self::Equity),
            '4' => Some(Self::Revenue),
            '5' => Some(Self::Expense),
            _ => None,
        }
    }

    /// Lowercase name, matching the persisted value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown account type: {s}")),
        }
    }
}

/// Entry type: either Debit or Credit.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

impl EntryType {
    /// Splits an amount into `(debit, credit)` columns.
    #[must_use]
    pub fn split(self, amount: Decimal) -> (Decimal, Decimal) {
        match self {
            Self::Debit => (amount, Decimal::ZERO),
            Self::Credit => (Decimal::ZERO, amount),
        }
    }
}

/// Transaction lifecycle: `draft -> posted -> voided`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Under construction; never reaches the balance tables.
    Draft,
    /// Applied to current and period balances.
    Posted,
    /// Terminal. Entries are kept but excluded from every balance.
    Voided,
}

impl TransactionStatus {
    /// Returns true if the transaction may move to `Posted`.
    #[must_use]
    pub const fn can_post(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the transaction may move to `Voided`.
    #[must_use]
    pub const fn can_void(self) -> bool {
        matches!(self, Self::Posted)
    }

    /// Returns true if the entry set may be rewritten.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Posted)
    }

    /// Returns true if entries of this transaction count towards balances.
    #[must_use]
    pub const fn affects_balances(self) -> bool {
        matches!(self, Self::Posted)
    }
}

/// Information about an account needed for validation.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// The account code.
    pub code: String,
    /// The account type.
    pub account_type: AccountType,
    /// Category nodes group other accounts and never carry entries.
    pub is_category: bool,
    /// Soft-deleted accounts are invisible to posting.
    pub is_deleted: bool,
}

/// Input for a single journal entry in a transaction.
#[derive(Debug, Clone)]
pub struct JournalEntryInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Whether this is a debit or credit entry.
    pub entry_type: EntryType,
    /// The amount (must be positive).
    pub amount: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

impl JournalEntryInput {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Debit,
            amount,
            description: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Credit,
            amount,
            description: None,
        }
    }
}

/// Input for creating (or rewriting) a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Free-form type tag ("payment", "petty_cash_expense", ...).
    pub transaction_type: String,
    /// Human reference code.
    pub reference: Option<String>,
    /// A description of the transaction.
    pub description: String,
    /// The date of the transaction.
    pub transaction_date: NaiveDate,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Boarding house the money movement belongs to.
    pub boarding_house_id: Option<Uuid>,
    /// Persist as `draft` instead of posting immediately.
    pub as_draft: bool,
    /// The journal entries (must have at least 2).
    pub entries: Vec<JournalEntryInput>,
    /// The user creating the transaction.
    pub created_by: UserId,
}

/// A validated journal entry with its account resolved.
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    /// The account to post to.
    pub account_id: AccountId,
    /// The account's type, used for the balance formula.
    pub account_type: AccountType,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Amount rounded to 2 decimal places.
    pub amount: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

/// Transaction totals for validation and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionTotals {
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
}

impl TransactionTotals {
    /// Creates new transaction totals from debit and credit sums.
    #[must_use]
    pub const fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            total_debit,
            total_credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }

    /// Returns true if debits and credits agree within `tolerance`.
    #[must_use]
    pub fn is_balanced_within(&self, tolerance: Decimal) -> bool {
        self.difference().abs() <= tolerance
    }
}
