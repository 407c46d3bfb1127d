//! Greedy book/bank auto-matching.

use std::collections::HashSet;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::{ItemSource, MatchCandidate, MatchProposal};

/// Default maximum distance between book and bank dates.
pub const DEFAULT_MATCH_WINDOW_DAYS: i64 = 3;

/// Confidence as an integer percentage: 100 for a same-day match, minus 10
/// per day apart.
#[must_use]
pub fn confidence_pct(days_apart: i64) -> i32 {
    let pct = 100 - 10 * days_apart.abs();
    i32::try_from(pct.clamp(0, 100)).unwrap_or(0)
}

/// Confidence as a decimal fraction (1.00, 0.90, ...).
#[must_use]
pub fn confidence(days_apart: i64) -> Decimal {
    Decimal::new(i64::from(confidence_pct(days_apart)), 2)
}

/// Proposes book/bank pairs.
///
/// Unreconciled book items are visited in (date, id) order; each takes the
/// first unreconciled bank item, in (date, position) order, that has not
/// already been proposed, carries exactly the same signed amount, and lies
/// within `window_days`.
#[must_use]
pub fn auto_match(items: &[MatchCandidate], window_days: i64) -> Vec<MatchProposal> {
    let mut book: Vec<&MatchCandidate> = items
        .iter()
        .filter(|i| i.source == ItemSource::Book && !i.is_reconciled)
        .collect();
    book.sort_by_key(|i| (i.date, i.id));

    let mut bank: Vec<&MatchCandidate> = items
        .iter()
        .filter(|i| i.source == ItemSource::Bank && !i.is_reconciled)
        .collect();
    bank.sort_by_key(|i| (i.date, i.position));

    let mut taken: HashSet<Uuid> = HashSet::new();
    let mut proposals = Vec::new();

    for book_item in book {
        let candidate = bank.iter().find(|b| {
            !taken.contains(&b.id)
                && b.amount == book_item.amount
                && (b.date - book_item.date).num_days().abs() <= window_days
        });

        if let Some(bank_item) = candidate {
            taken.insert(bank_item.id);
            let days_apart = (bank_item.date - book_item.date).num_days().abs();
            proposals.push(MatchProposal {
                book_item_id: book_item.id,
                bank_item_id: bank_item.id,
                amount: book_item.amount,
                days_apart,
                confidence: confidence(days_apart),
                reason: match_reason(book_item.amount, days_apart),
            });
        }
    }

    proposals
}

/// Human explanation of an exact-amount pair.
#[must_use]
pub fn match_reason(amount: Decimal, days_apart: i64) -> String {
    match days_apart {
        0 => format!("Exact amount {amount} on the same date"),
        1 => format!("Exact amount {amount}, 1 day apart"),
        n => format!("Exact amount {amount}, {n} days apart"),
    }
}
