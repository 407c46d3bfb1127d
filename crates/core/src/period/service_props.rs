//! Property-based tests for the period engine.
//!
//! - Closing carries exactly `f(type, BD, debits, credits)` forward
//! - Carrying through two periods equals one period holding all activity
//! - Balanced postings always produce a balanced trial balance

use chrono::NaiveDate;
use lodgebook_shared::types::{AccountId, PeriodId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::PeriodService;
use super::types::{PeriodBalance, PeriodSpan, TrialBalanceLine};
use crate::ledger::{AccountType, compute_balance};

const TYPES: [AccountType; 5] = [
    AccountType::Asset,
    AccountType::Liability,
    AccountType::Equity,
    AccountType::Revenue,
    AccountType::Expense,
];

fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn account_type_strategy() -> impl Strategy<Value = AccountType> {
    (0usize..TYPES.len()).prop_map(|i| TYPES[i])
}

fn row(account_type: AccountType, brought_down: Decimal, debits: Decimal, credits: Decimal) -> PeriodBalance {
    PeriodBalance {
        account_id: AccountId::new(),
        account_type,
        brought_down,
        total_debits: debits,
        total_credits: credits,
        transaction_count: 1,
    }
}

fn january() -> PeriodSpan {
    PeriodSpan {
        id: PeriodId::new(),
        name: "2026-01".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        is_closed: false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of period rows, the close plan SHALL carry each row's
    /// CD forward unchanged and in input order.
    #[test]
    fn prop_close_carries_carried_down(
        rows in prop::collection::vec(
            (account_type_strategy(), signed_amount(), amount(), amount()),
            1..20,
        )
    ) {
        let balances: Vec<PeriodBalance> = rows
            .iter()
            .map(|(t, bd, d, c)| row(*t, *bd, *d, *c))
            .collect();
        let expected: Vec<(AccountId, Decimal)> = balances
            .iter()
            .map(|b| (b.account_id, compute_balance(b.account_type, b.brought_down, b.total_debits, b.total_credits)))
            .collect();

        let plan = PeriodService::plan_close(balances);
        let carried: Vec<(AccountId, Decimal)> =
            plan.carry_forward().map(|(id, _, cd)| (id, cd)).collect();
        prop_assert_eq!(carried, expected);
    }

    /// *For any* opening balance and two periods of activity, closing the
    /// first and carrying into the second SHALL give the same CD as one
    /// period holding both.
    #[test]
    fn prop_carry_is_additive(
        account_type in account_type_strategy(),
        opening in signed_amount(),
        (d1, c1, d2, c2) in (amount(), amount(), amount(), amount()),
    ) {
        let first = row(account_type, opening, d1, c1);
        let plan = PeriodService::plan_close(vec![first]);
        let (_, _, carried) = plan.carry_forward().next().unwrap();

        let second = row(account_type, carried, d2, c2);
        let combined = row(account_type, opening, d1 + d2, c1 + c2);
        prop_assert_eq!(second.carried_down(), combined.carried_down());
    }

    /// *For any* manual BD change, the CD SHALL move by the same amount.
    #[test]
    fn prop_brought_down_shift_moves_carried_down(
        account_type in account_type_strategy(),
        (bd, d, c, new_bd) in (signed_amount(), amount(), amount(), signed_amount()),
    ) {
        let current = row(account_type, bd, d, c);
        let (updated, adjustment) = PeriodService::adjust_brought_down(&current, new_bd);

        prop_assert_eq!(adjustment.adjustment_amount, new_bd - bd);
        prop_assert_eq!(
            updated.carried_down() - current.carried_down(),
            adjustment.adjustment_amount
        );
        prop_assert_eq!(adjustment.carried_down, updated.carried_down());
    }

    /// *For any* set of two-line postings between accounts starting at
    /// zero, the trial balance SHALL be balanced.
    #[test]
    fn prop_balanced_postings_give_balanced_trial(
        postings in prop::collection::vec((0usize..5, 0usize..5, amount()), 1..30)
    ) {
        let mut debits = [Decimal::ZERO; 5];
        let mut credits = [Decimal::ZERO; 5];
        for (dr, cr, value) in &postings {
            debits[*dr] += *value;
            credits[*cr] += *value;
        }

        let lines: Vec<TrialBalanceLine> = TYPES
            .iter()
            .enumerate()
            .map(|(i, account_type)| TrialBalanceLine {
                account_id: AccountId::new(),
                code: format!("{}000", account_type.code_prefix()),
                name: format!("{account_type:?}"),
                account_type: *account_type,
                brought_down: Decimal::ZERO,
                total_debits: debits[i],
                total_credits: credits[i],
                carried_down: compute_balance(*account_type, Decimal::ZERO, debits[i], credits[i]),
            })
            .collect();

        let trial = PeriodService::build_trial_balance(&january(), lines);
        prop_assert!(trial.is_balanced);
        prop_assert_eq!(trial.total_debit_side, trial.total_credit_side);
    }
}
