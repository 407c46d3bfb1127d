//! Business rule validation for ledger operations.

use lodgebook_shared::types::round_money;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{AccountType, JournalEntryInput, TransactionTotals};

/// Fixed rounding tolerance for the debit/credit equality check.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Minimum number of entries in a transaction.
pub const MIN_ENTRIES: usize = 2;

/// Validates the entry count.
///
/// # Errors
///
/// Returns `InsufficientEntries` when fewer than two entries are supplied.
pub fn validate_entry_count(entries: &[JournalEntryInput]) -> Result<(), LedgerError> {
    if entries.len() < MIN_ENTRIES {
        return Err(LedgerError::InsufficientEntries);
    }
    Ok(())
}

/// Rounds an entry amount and checks it stays positive.
///
/// # Errors
///
/// Returns `NonPositiveAmount` when the rounded amount is zero or negative.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
    let rounded = round_money(amount);
    if rounded <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    Ok(rounded)
}

/// Checks `|debit - credit| <= BALANCE_TOLERANCE`.
///
/// # Errors
///
/// Returns `UnbalancedTransaction` carrying both sums otherwise.
pub fn validate_balance(totals: &TransactionTotals) -> Result<(), LedgerError> {
    if !totals.is_balanced_within(BALANCE_TOLERANCE) {
        return Err(LedgerError::UnbalancedTransaction {
            debit: totals.total_debit,
            credit: totals.total_credit,
        });
    }
    Ok(())
}

/// Checks that an account code agrees with the declared type.
///
/// Only the leading digit is inspected; codes that use no numeric prefix
/// are rejected so the chart keeps sorting by type.
///
/// # Errors
///
/// Returns `CodeTypeMismatch` if the prefix names another type or none.
pub fn validate_account_code(code: &str, account_type: AccountType) -> Result<(), LedgerError> {
    match AccountType::from_code_prefix(code) {
        Some(prefix_type) if prefix_type == account_type => Ok(()),
        _ => Err(LedgerError::CodeTypeMismatch {
            code: code.to_string(),
            account_type,
        }),
    }
}
