//! Account statement (ledger card) with running balances.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::balance::{RunningBalance, entry_effect};
use super::types::{AccountType, EntryType};

/// A posted journal entry as it feeds an account statement.
#[derive(Debug, Clone)]
pub struct StatementEntry {
    /// Journal entry ID.
    pub entry_id: Uuid,
    /// Owning transaction ID.
    pub transaction_id: Uuid,
    /// Transaction date.
    pub date: NaiveDate,
    /// Transaction reference.
    pub reference: Option<String>,
    /// Entry description, falling back to the transaction's.
    pub description: String,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
}

/// One line of an account statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLine {
    /// Journal entry ID.
    pub entry_id: Uuid,
    /// Owning transaction ID.
    pub transaction_id: Uuid,
    /// Transaction date.
    pub date: NaiveDate,
    /// Transaction reference.
    pub reference: Option<String>,
    /// Description.
    pub description: String,
    /// Debit column (zero for credits).
    pub debit: Decimal,
    /// Credit column (zero for debits).
    pub credit: Decimal,
    /// Balance after this line.
    pub running_balance: Decimal,
}

/// Account statement for a date window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatement {
    /// Balance of everything before the window.
    pub opening_balance: Decimal,
    /// Lines inside the window, oldest first.
    pub lines: Vec<StatementLine>,
    /// Balance after the last line.
    pub closing_balance: Decimal,
}

/// Builds an account statement.
///
/// `entries` must already be ordered by (date, creation). Entries dated before
/// `from` only contribute to the opening balance; entries after `to` are
/// ignored.
#[must_use]
pub fn build_statement(
    account_type: AccountType,
    entries: &[StatementEntry],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> AccountStatement {
    let before_window = |d: NaiveDate| from.is_some_and(|f| d < f);
    let after_window = |d: NaiveDate| to.is_some_and(|t| d > t);

    let opening_balance: Decimal = entries
        .iter()
        .filter(|e| before_window(e.date))
        .map(|e| entry_effect(account_type, e.entry_type, e.amount))
        .sum();

    let mut lines = Vec::new();
    let mut running: Option<RunningBalance> = None;

    for entry in entries
        .iter()
        .filter(|e| !before_window(e.date) && !after_window(e.date))
    {
        let change = entry_effect(account_type, entry.entry_type, entry.amount);
        let next = match &running {
            Some(previous) => RunningBalance::next_entry(previous, change),
            None => RunningBalance::first_entry(opening_balance, change),
        };
        let (debit, credit) = entry.entry_type.split(entry.amount);

        lines.push(StatementLine {
            entry_id: entry.entry_id,
            transaction_id: entry.transaction_id,
            date: entry.date,
            reference: entry.reference.clone(),
            description: entry.description.clone(),
            debit,
            credit,
            running_balance: next.current_balance,
        });
        running = Some(next);
    }

    let closing_balance = running.map_or(opening_balance, |r| r.current_balance);

    AccountStatement {
        opening_balance,
        lines,
        closing_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(day: u32, entry_type: EntryType, amount: Decimal) -> StatementEntry {
        StatementEntry {
            entry_id: Uuid::new_v4(),
            transaction_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            reference: None,
            description: format!("day {day}"),
            entry_type,
            amount,
        }
    }

    #[test]
    fn test_running_balance_asset() {
        let entries = vec![
            entry(1, EntryType::Debit, dec!(100)),
            entry(2, EntryType::Credit, dec!(30)),
            entry(3, EntryType::Debit, dec!(5)),
        ];
        let statement = build_statement(AccountType::Asset, &entries, None, None);

        let balances: Vec<Decimal> = statement.lines.iter().map(|l| l.running_balance).collect();
        assert_eq!(balances, vec![dec!(100), dec!(70), dec!(75)]);
        assert_eq!(statement.lines[1].debit, Decimal::ZERO);
        assert_eq!(statement.lines[1].credit, dec!(30));
        assert_eq!(statement.closing_balance, dec!(75));
    }

    #[test]
    fn test_running_balance_revenue() {
        let entries = vec![
            entry(1, EntryType::Credit, dec!(100)),
            entry(2, EntryType::Debit, dec!(40)),
        ];
        let statement = build_statement(AccountType::Revenue, &entries, None, None);
        assert_eq!(statement.lines[0].running_balance, dec!(100));
        assert_eq!(statement.lines[1].running_balance, dec!(60));
    }

    #[test]
    fn test_window_uses_opening_balance() {
        let entries = vec![
            entry(1, EntryType::Debit, dec!(100)),
            entry(10, EntryType::Debit, dec!(20)),
            entry(20, EntryType::Credit, dec!(50)),
        ];
        let from = NaiveDate::from_ymd_opt(2026, 3, 5);
        let to = NaiveDate::from_ymd_opt(2026, 3, 15);
        let statement = build_statement(AccountType::Asset, &entries, from, to);

        assert_eq!(statement.opening_balance, dec!(100));
        assert_eq!(statement.lines.len(), 1);
        assert_eq!(statement.lines[0].running_balance, dec!(120));
        assert_eq!(statement.closing_balance, dec!(120));
    }

    #[test]
    fn test_empty_window() {
        let entries = vec![entry(1, EntryType::Debit, dec!(100))];
        let from = NaiveDate::from_ymd_opt(2026, 3, 5);
        let statement = build_statement(AccountType::Asset, &entries, from, None);
        assert!(statement.lines.is_empty());
        assert_eq!(statement.closing_balance, dec!(100));
    }
}
