//! Property-based tests for LedgerService.
//!
//! - Balanced entry sets are accepted and report equal totals
//! - Imbalances beyond one cent are always rejected
//! - Amounts are rounded before they are summed

use std::collections::HashMap;

use lodgebook_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::service::LedgerService;
use super::types::{AccountInfo, AccountType, EntryType, JournalEntryInput};
use super::validation::BALANCE_TOLERANCE;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate an account type.
fn account_type_strategy() -> impl Strategy<Value = AccountType> {
    prop_oneof![
        Just(AccountType::Asset),
        Just(AccountType::Liability),
        Just(AccountType::Equity),
        Just(AccountType::Revenue),
        Just(AccountType::Expense),
    ]
}

/// Builds one live account per entry and the matching lookup map.
fn accounts_for(types: &[AccountType]) -> (Vec<AccountId>, HashMap<AccountId, AccountInfo>) {
    let mut ids = Vec::with_capacity(types.len());
    let mut map = HashMap::new();
    for account_type in types {
        let id = AccountId::new();
        ids.push(id);
        map.insert(
            id,
            AccountInfo {
                id,
                code: format!("{}000", account_type.code_prefix()),
                account_type: *account_type,
                is_category: false,
                is_deleted: false,
            },
        );
    }
    (ids, map)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* split of a total into N debit lines against one credit
    /// line, validation SHALL succeed and debits SHALL equal credits.
    #[test]
    fn prop_split_debits_balance(
        parts in prop::collection::vec(positive_amount(), 1..8),
        types in prop::collection::vec(account_type_strategy(), 9),
    ) {
        let (ids, map) = accounts_for(&types);
        let total: Decimal = parts.iter().copied().sum();

        let mut entries: Vec<JournalEntryInput> = parts
            .iter()
            .enumerate()
            .map(|(i, amount)| JournalEntryInput::debit(ids[i], *amount))
            .collect();
        entries.push(JournalEntryInput::credit(ids[8], total));

        let (resolved, totals) =
            LedgerService::validate_and_resolve(&entries, |id| map.get(&id).cloned()).unwrap();

        prop_assert_eq!(resolved.len(), parts.len() + 1);
        prop_assert_eq!(totals.total_debit, totals.total_credit);
        prop_assert_eq!(totals.total_debit, total);
    }

    /// *For any* pair of amounts differing by more than one cent,
    /// validation SHALL fail with UnbalancedTransaction.
    #[test]
    fn prop_imbalance_beyond_tolerance_rejected(
        amount in positive_amount(),
        extra_cents in 2i64..100_000i64,
    ) {
        let (ids, map) = accounts_for(&[AccountType::Asset, AccountType::Revenue]);
        let entries = vec![
            JournalEntryInput::debit(ids[0], amount + Decimal::new(extra_cents, 2)),
            JournalEntryInput::credit(ids[1], amount),
        ];

        let result = LedgerService::validate_and_resolve(&entries, |id| map.get(&id).cloned());
        prop_assert!(
            matches!(result, Err(LedgerError::UnbalancedTransaction { .. })),
            "Unbalanced transaction should be rejected"
        );
    }

    /// *For any* accepted transaction, |Σdebit − Σcredit| SHALL stay within
    /// the fixed tolerance, and every resolved amount SHALL have at most two
    /// decimal places.
    #[test]
    fn prop_accepted_within_tolerance(
        debit_milli in 10i64..10_000_000i64,
        credit_milli in 10i64..10_000_000i64,
    ) {
        let (ids, map) = accounts_for(&[AccountType::Expense, AccountType::Liability]);
        let entries = vec![
            JournalEntryInput {
                account_id: ids[0],
                entry_type: EntryType::Debit,
                amount: Decimal::new(debit_milli, 3),
                description: None,
            },
            JournalEntryInput {
                account_id: ids[1],
                entry_type: EntryType::Credit,
                amount: Decimal::new(credit_milli, 3),
                description: None,
            },
        ];

        if let Ok((resolved, totals)) =
            LedgerService::validate_and_resolve(&entries, |id| map.get(&id).cloned())
        {
            prop_assert!(totals.difference().abs() <= BALANCE_TOLERANCE);
            for entry in &resolved {
                prop_assert!(entry.amount.scale() <= 2);
            }
        }
    }
}
