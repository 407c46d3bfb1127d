//! Reconciliation rules.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::ReconciliationError;
use super::types::{ItemRef, ItemSource, MatchAction, ReconciliationStatus};

/// Stateless reconciliation rules.
pub struct ReconciliationService;

impl ReconciliationService {
    /// `book - bank`.
    #[must_use]
    pub fn difference(book_balance: Decimal, bank_balance: Decimal) -> Decimal {
        book_balance - bank_balance
    }

    /// Reconciled iff every item is reconciled. No items counts as reconciled.
    #[must_use]
    pub fn status_for<I>(item_flags: I) -> ReconciliationStatus
    where
        I: IntoIterator<Item = bool>,
    {
        if item_flags.into_iter().all(|reconciled| reconciled) {
            ReconciliationStatus::Reconciled
        } else {
            ReconciliationStatus::Pending
        }
    }

    /// Validates one confirmed pair against its reconciliation.
    pub fn validate_match(
        reconciliation_id: Uuid,
        book: &ItemRef,
        bank: &ItemRef,
    ) -> Result<MatchAction, ReconciliationError> {
        for (item, expected) in [(book, ItemSource::Book), (bank, ItemSource::Bank)] {
            if item.reconciliation_id != reconciliation_id {
                return Err(ReconciliationError::ForeignItem {
                    item_id: item.id,
                    reconciliation_id,
                });
            }
            if item.source != expected {
                return Err(ReconciliationError::WrongSource {
                    item_id: item.id,
                    expected,
                });
            }
        }

        if book.is_reconciled || bank.is_reconciled {
            Ok(MatchAction::Skip)
        } else {
            Ok(MatchAction::Apply)
        }
    }
}
