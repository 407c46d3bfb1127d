//! Ledger service for transaction validation and resolution.
//!
//! This module provides the core business logic for validating and resolving
//! transactions before they are persisted to the database.

use lodgebook_shared::types::AccountId;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{
    AccountInfo, EntryType, JournalEntryInput, ResolvedEntry, TransactionStatus, TransactionTotals,
};
use super::validation::{validate_amount, validate_balance, validate_entry_count};

/// Ledger service for transaction validation and resolution.
///
/// This service contains pure business logic with no database dependencies.
/// Account lookups are injected so callers can resolve them from a preloaded
/// map inside their unit of work.
pub struct LedgerService;

impl LedgerService {
    /// Validate and resolve a set of journal entries before persisting.
    ///
    /// 1. At least 2 entries
    /// 2. Every amount positive after rounding to 2 decimal places
    /// 3. Every account exists, is live and is not a category
    /// 4. `|Σdebit − Σcredit| <= 0.01`
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` on the first violated rule.
    pub fn validate_and_resolve<A>(
        entries: &[JournalEntryInput],
        account_lookup: A,
    ) -> Result<(Vec<ResolvedEntry>, TransactionTotals), LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        validate_entry_count(entries)?;

        let mut resolved = Vec::with_capacity(entries.len());
        for entry in entries {
            let amount = validate_amount(entry.amount)?;
            let account = Self::postable_account(entry.account_id, &account_lookup)?;

            resolved.push(ResolvedEntry {
                account_id: entry.account_id,
                account_type: account.account_type,
                entry_type: entry.entry_type,
                amount,
                description: entry.description.clone(),
            });
        }

        let totals = Self::calculate_totals(&resolved);
        validate_balance(&totals)?;

        Ok((resolved, totals))
    }

    /// Resolves an account and checks it can carry entries.
    fn postable_account<A>(account_id: AccountId, lookup: &A) -> Result<AccountInfo, LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        let account = lookup(account_id)
            .filter(|a| !a.is_deleted)
            .ok_or(LedgerError::AccountNotFound(account_id.into_inner()))?;
        if account.is_category {
            return Err(LedgerError::CategoryAccount(account_id.into_inner()));
        }
        Ok(account)
    }

    /// Calculate transaction totals from resolved entries.
    #[must_use]
    pub fn calculate_totals(entries: &[ResolvedEntry]) -> TransactionTotals {
        let (debit, credit) = entries.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(debit, credit), e| match e.entry_type {
                EntryType::Debit => (debit + e.amount, credit),
                EntryType::Credit => (debit, credit + e.amount),
            },
        );
        TransactionTotals::new(debit, credit)
    }

    /// Validate the `draft -> posted` transition.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` unless the transaction is a draft.
    pub fn validate_can_post(id: Uuid, status: TransactionStatus) -> Result<(), LedgerError> {
        if !status.can_post() {
            return Err(LedgerError::InvalidStatus {
                id,
                status,
                expected: TransactionStatus::Draft,
            });
        }
        Ok(())
    }

    /// Validate the `posted -> voided` transition.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` unless the transaction is posted.
    pub fn validate_can_void(id: Uuid, status: TransactionStatus) -> Result<(), LedgerError> {
        if !status.can_void() {
            return Err(LedgerError::InvalidStatus {
                id,
                status,
                expected: TransactionStatus::Posted,
            });
        }
        Ok(())
    }

    /// Validate that a transaction's entries can be rewritten.
    ///
    /// # Errors
    ///
    /// Returns `CannotModifyVoided` for voided transactions.
    pub fn validate_can_modify(id: Uuid, status: TransactionStatus) -> Result<(), LedgerError> {
        if !status.is_editable() {
            return Err(LedgerError::CannotModifyVoided(id));
        }
        Ok(())
    }
}
