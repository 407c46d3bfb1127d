//! Integration tests for bank statements and reconciliation.

mod common;

use chrono::NaiveDate;
use common::{Chart, date, seed_chart, setup_db, transfer};
use lodgebook_core::reconciliation::{
    ConfirmedMatch, ItemSource, ReconciliationError, ReconciliationStatus, StatementLineInput,
};
use lodgebook_db::{
    ReconciliationRepoError, ReconciliationRepository, TransactionRepository,
    repositories::{CreateReconciliationInput, ImportStatementInput, ReconciliationView},
};
use lodgebook_shared::{AppError, types::UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

fn line(on: NaiveDate, debit: Decimal, credit: Decimal, description: &str) -> StatementLineInput {
    StatementLineInput {
        bank_date: on,
        description: description.to_string(),
        reference: None,
        debit_amount: debit,
        credit_amount: credit,
        balance: None,
    }
}

/// Three book movements on the bank account and a statement where only the
/// first one agrees exactly.
async fn scenario(db: &DatabaseConnection, chart: &Chart) -> (Uuid, Vec<Uuid>) {
    let transactions = TransactionRepository::new(db.clone());
    let mut ids = Vec::new();
    for input in [
        transfer(date(2026, 1, 3), chart.bank, chart.rent_revenue, dec!(500), "rent room 1"),
        transfer(date(2026, 1, 10), chart.utilities, chart.bank, dec!(120), "water"),
        transfer(date(2026, 1, 15), chart.bank, chart.rent_revenue, dec!(300), "rent room 2"),
    ] {
        let created = transactions.create_transaction(input).await.expect("book entry");
        ids.push(created.transaction.id);
    }

    let statement = ReconciliationRepository::new(db.clone())
        .import_bank_statement(ImportStatementInput {
            account_id: chart.bank,
            statement_date: date(2026, 1, 31),
            opening_balance: dec!(0),
            closing_balance: dec!(685),
            file_reference: Some("bca-2026-01.csv".to_string()),
            lines: vec![
                line(date(2026, 1, 3), dec!(0), dec!(500), "TRSF RENT"),
                line(date(2026, 1, 11), dec!(125), dec!(0), "PDAM"),
                line(date(2026, 1, 16), dec!(0), dec!(310), "TRSF"),
            ],
            created_by: UserId::new(),
        })
        .await
        .expect("import statement");
    assert_eq!(statement.lines.len(), 3);
    assert_eq!(statement.lines[1].position, 1);

    (statement.id, ids)
}

async fn start(
    repo: &ReconciliationRepository,
    chart: &Chart,
    statement_id: Option<Uuid>,
    on: NaiveDate,
) -> Result<ReconciliationView, ReconciliationRepoError> {
    repo.create_reconciliation(CreateReconciliationInput {
        account_id: chart.bank,
        reconciliation_date: on,
        book_balance: dec!(680),
        bank_balance: dec!(685),
        statement_id,
        created_by: UserId::new(),
    })
    .await
}

fn item(view: &ReconciliationView, source: ItemSource, position: i32) -> Uuid {
    view.items
        .iter()
        .find(|i| i.source == source && i.position == position)
        .map(|i| i.id)
        .expect("item exists")
}

// ============================================================================
// Matching lifecycle
// ============================================================================

#[tokio::test]
async fn test_reconciliation_completes_only_when_every_item_matches() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let (statement_id, _) = scenario(&db, &chart).await;
    let repo = ReconciliationRepository::new(db.clone());

    let rec = start(&repo, &chart, Some(statement_id), date(2026, 1, 31))
        .await
        .expect("create reconciliation");
    assert_eq!(rec.difference, dec!(-5));
    assert_eq!(rec.status, ReconciliationStatus::Pending);
    assert_eq!(rec.items.len(), 6);
    assert_eq!(rec.items[0].source, ItemSource::Book);

    let amounts: Vec<Decimal> = rec
        .items
        .iter()
        .filter(|i| i.source == ItemSource::Book)
        .map(|i| i.amount)
        .collect();
    assert_eq!(amounts, vec![dec!(500), dec!(-120), dec!(300)]);

    let proposals = repo
        .auto_match_transactions(rec.id)
        .await
        .expect("auto match");
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].amount, dec!(500));
    assert_eq!(proposals[0].confidence, dec!(1.00));

    let reviewer = UserId::new();
    let after_first = repo
        .update_reconciliation_items(
            rec.id,
            vec![ConfirmedMatch {
                book_item_id: proposals[0].book_item_id,
                bank_item_id: proposals[0].bank_item_id,
                notes: None,
            }],
            reviewer,
        )
        .await
        .expect("confirm first pair");
    assert_eq!(after_first.status, ReconciliationStatus::Pending);
    assert_eq!(after_first.items.iter().filter(|i| i.is_reconciled).count(), 2);
    assert!(after_first.reconciled_at.is_none());

    let book_first = after_first
        .items
        .iter()
        .find(|i| i.id == proposals[0].book_item_id)
        .expect("book item");
    assert_eq!(book_first.matched_with, Some(proposals[0].bank_item_id));
    assert_eq!(book_first.match_confidence, Some(dec!(1.00)));

    let rest = vec![
        ConfirmedMatch {
            book_item_id: item(&rec, ItemSource::Book, 1),
            bank_item_id: item(&rec, ItemSource::Bank, 1),
            notes: Some("bank fee 5".to_string()),
        },
        ConfirmedMatch {
            book_item_id: item(&rec, ItemSource::Book, 2),
            bank_item_id: item(&rec, ItemSource::Bank, 2),
            notes: None,
        },
    ];
    let done = repo
        .update_reconciliation_items(rec.id, rest.clone(), reviewer)
        .await
        .expect("confirm remaining pairs");
    assert_eq!(done.status, ReconciliationStatus::Reconciled);
    assert_eq!(done.reconciled_by, Some(reviewer.into_inner()));
    let stamped_at = done.reconciled_at;
    assert!(stamped_at.is_some());

    // Re-sending confirmed pairs changes nothing.
    let again = repo
        .update_reconciliation_items(rec.id, rest, UserId::new())
        .await
        .expect("idempotent confirm");
    assert_eq!(again.status, ReconciliationStatus::Reconciled);
    assert_eq!(again.reconciled_by, Some(reviewer.into_inner()));
    assert_eq!(again.reconciled_at, stamped_at);

    let no_more = repo.auto_match_transactions(rec.id).await.expect("auto match");
    assert!(no_more.is_empty());
}

#[tokio::test]
async fn test_reconciled_entries_are_frozen_and_not_snapshotted_again() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let (statement_id, transaction_ids) = scenario(&db, &chart).await;
    let repo = ReconciliationRepository::new(db.clone());

    let rec = start(&repo, &chart, Some(statement_id), date(2026, 1, 31))
        .await
        .expect("create");
    repo.update_reconciliation_items(
        rec.id,
        vec![ConfirmedMatch {
            book_item_id: item(&rec, ItemSource::Book, 0),
            bank_item_id: item(&rec, ItemSource::Bank, 0),
            notes: None,
        }],
        UserId::new(),
    )
    .await
    .expect("confirm");

    let err = TransactionRepository::new(db.clone())
        .void_transaction(transaction_ids[0], "mistake", UserId::new())
        .await
        .expect_err("matched entries cannot be voided");
    assert!(matches!(AppError::from(err), AppError::Validation(_)));

    let next = start(&repo, &chart, None, date(2026, 2, 28))
        .await
        .expect("february reconciliation");
    let book_items = next
        .items
        .iter()
        .filter(|i| i.source == ItemSource::Book)
        .count();
    assert_eq!(book_items, 2, "the matched entry is left out");
}

#[tokio::test]
async fn test_reconciliation_without_items_is_reconciled_immediately() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let repo = ReconciliationRepository::new(db.clone());

    let rec = start(&repo, &chart, None, date(2026, 1, 31))
        .await
        .expect("create");
    assert!(rec.items.is_empty());
    assert_eq!(rec.status, ReconciliationStatus::Reconciled);
    assert!(rec.reconciled_by.is_some());
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_duplicate_reconciliation_conflicts() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let repo = ReconciliationRepository::new(db.clone());

    start(&repo, &chart, None, date(2026, 1, 31)).await.expect("first");
    let err = start(&repo, &chart, None, date(2026, 1, 31))
        .await
        .expect_err("same account and date");
    assert!(matches!(
        err,
        ReconciliationRepoError::Reconciliation(ReconciliationError::Duplicate { .. })
    ));
    assert!(matches!(AppError::from(err), AppError::Conflict(_)));
}

#[tokio::test]
async fn test_statement_lines_need_exactly_one_side() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let repo = ReconciliationRepository::new(db.clone());

    let err = repo
        .import_bank_statement(ImportStatementInput {
            account_id: chart.bank,
            statement_date: date(2026, 1, 31),
            opening_balance: dec!(0),
            closing_balance: dec!(0),
            file_reference: None,
            lines: vec![
                line(date(2026, 1, 2), dec!(0), dec!(10), "ok"),
                line(date(2026, 1, 3), dec!(5), dec!(5), "both sides"),
            ],
            created_by: UserId::new(),
        })
        .await
        .expect_err("second line is malformed");
    assert!(matches!(
        err,
        ReconciliationRepoError::Reconciliation(ReconciliationError::InvalidStatementLine {
            line: 1,
            ..
        })
    ));
}

#[tokio::test]
async fn test_pairs_are_checked_against_their_reconciliation() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let (statement_id, _) = scenario(&db, &chart).await;
    let repo = ReconciliationRepository::new(db.clone());
    let rec = start(&repo, &chart, Some(statement_id), date(2026, 1, 31))
        .await
        .expect("create");

    let swapped = repo
        .update_reconciliation_items(
            rec.id,
            vec![ConfirmedMatch {
                book_item_id: item(&rec, ItemSource::Bank, 0),
                bank_item_id: item(&rec, ItemSource::Book, 0),
                notes: None,
            }],
            UserId::new(),
        )
        .await
        .expect_err("sources swapped");
    assert!(matches!(
        swapped,
        ReconciliationRepoError::Reconciliation(ReconciliationError::WrongSource { .. })
    ));

    let missing = repo
        .update_reconciliation_items(
            rec.id,
            vec![ConfirmedMatch {
                book_item_id: Uuid::now_v7(),
                bank_item_id: item(&rec, ItemSource::Bank, 0),
                notes: None,
            }],
            UserId::new(),
        )
        .await
        .expect_err("unknown item");
    assert!(matches!(
        missing,
        ReconciliationRepoError::Reconciliation(ReconciliationError::ItemNotFound(_))
    ));

    let untouched = repo.get_reconciliation(rec.id).await.expect("get");
    assert!(untouched.items.iter().all(|i| !i.is_reconciled));
}
