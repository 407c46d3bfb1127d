//! Property-based tests for auto-matching.
//!
//! - No item appears in two proposals
//! - Every proposal pairs a book item with an equal-amount bank item in window
//! - Re-running the matcher on unchanged input gives the same proposals

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::matcher::{DEFAULT_MATCH_WINDOW_DAYS, auto_match};
use super::types::{ItemSource, MatchCandidate};

fn candidate_strategy() -> impl Strategy<Value = (bool, i64, i64, bool)> {
    // (is_bank, day offset, amount in whole units, is_reconciled)
    (any::<bool>(), 0i64..20, -5i64..5, prop::bool::weighted(0.2))
}

fn build(raw: Vec<(bool, i64, i64, bool)>) -> Vec<MatchCandidate> {
    let base = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    raw.into_iter()
        .enumerate()
        .filter(|(_, (_, _, amount, _))| *amount != 0)
        .map(|(i, (is_bank, offset, amount, is_reconciled))| MatchCandidate {
            id: Uuid::from_u128(i as u128 + 1),
            source: if is_bank { ItemSource::Bank } else { ItemSource::Book },
            date: base + Duration::days(offset),
            position: i as i32,
            amount: Decimal::from(amount),
            is_reconciled,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* item set, proposals SHALL use each item at most once and
    /// SHALL only pair unreconciled book items with unreconciled bank items.
    #[test]
    fn prop_items_used_once(raw in prop::collection::vec(candidate_strategy(), 0..30)) {
        let items = build(raw);
        let proposals = auto_match(&items, DEFAULT_MATCH_WINDOW_DAYS);

        let mut seen = HashSet::new();
        for p in &proposals {
            prop_assert!(seen.insert(p.book_item_id));
            prop_assert!(seen.insert(p.bank_item_id));

            let book = items.iter().find(|i| i.id == p.book_item_id).unwrap();
            let bank = items.iter().find(|i| i.id == p.bank_item_id).unwrap();
            prop_assert_eq!(book.source, ItemSource::Book);
            prop_assert_eq!(bank.source, ItemSource::Bank);
            prop_assert!(!book.is_reconciled && !bank.is_reconciled);
        }
    }

    /// *For any* proposal, amounts SHALL be equal and the dates SHALL lie
    /// within the window, with confidence between 0.70 and 1.00.
    #[test]
    fn prop_proposals_within_window(raw in prop::collection::vec(candidate_strategy(), 0..30)) {
        let items = build(raw);
        for p in auto_match(&items, DEFAULT_MATCH_WINDOW_DAYS) {
            let book = items.iter().find(|i| i.id == p.book_item_id).unwrap();
            let bank = items.iter().find(|i| i.id == p.bank_item_id).unwrap();
            prop_assert_eq!(book.amount, bank.amount);
            prop_assert!((bank.date - book.date).num_days().abs() <= DEFAULT_MATCH_WINDOW_DAYS);
            prop_assert!(p.confidence >= Decimal::new(70, 2));
            prop_assert!(p.confidence <= Decimal::ONE);
        }
    }

    /// Matching is read-only and deterministic.
    #[test]
    fn prop_deterministic(raw in prop::collection::vec(candidate_strategy(), 0..30)) {
        let items = build(raw);
        prop_assert_eq!(
            auto_match(&items, DEFAULT_MATCH_WINDOW_DAYS),
            auto_match(&items, DEFAULT_MATCH_WINDOW_DAYS)
        );
    }
}
