//! Integration tests for the petty-cash subledger and its ledger mirror.

mod common;

use common::{date, seed_chart, setup_db, transfer};
use lodgebook_core::petty_cash::{PettyCashError, PettyCashTransactionType};
use lodgebook_db::{
    BalanceRepository, PettyCashRepoError, PettyCashRepository, TransactionRepository,
    repositories::MovementMeta,
};
use lodgebook_shared::{AppError, LedgerConfig, types::UserId};
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

fn meta(day: u32) -> MovementMeta {
    MovementMeta {
        transaction_date: date(2026, 1, day),
        reference: None,
        created_by: UserId::new(),
    }
}

/// Funds the bank with 2000 and opens an empty box.
async fn funded_box(db: &DatabaseConnection) -> (common::Chart, PettyCashRepository, Uuid) {
    let chart = seed_chart(db).await;
    TransactionRepository::new(db.clone())
        .create_transaction(transfer(date(2026, 1, 1), chart.bank, chart.equity, dec!(2000), "capital"))
        .await
        .expect("capital");

    let repo = PettyCashRepository::new(db.clone(), &LedgerConfig::default());
    let account = repo
        .open_account(Uuid::now_v7(), Uuid::now_v7())
        .await
        .expect("open box");
    (chart, repo, account.id)
}

// ============================================================================
// Inflows
// ============================================================================

#[tokio::test]
async fn test_add_cash_moves_money_in_both_ledgers() {
    let db = setup_db().await;
    let (chart, repo, box_id) = funded_box(&db).await;
    let balances = BalanceRepository::new(db.clone());

    let recorded = repo
        .add_cash(box_id, dec!(500), "1100".to_string(), None, meta(2))
        .await
        .expect("add cash");
    assert_eq!(recorded.account.current_balance, dec!(500));
    assert_eq!(recorded.account.total_inflows, dec!(500));
    assert_eq!(recorded.entry.transaction_type, PettyCashTransactionType::CashInflow);
    assert_eq!(recorded.entry.balance_after, dec!(500));

    let ledger_txn = TransactionRepository::new(db.clone())
        .get_transaction(recorded.entry.ledger_transaction_id.expect("mirrored"))
        .await
        .expect("ledger transaction");
    assert_eq!(ledger_txn.transaction.transaction_type, "petty_cash_cash_inflow");

    let petty = balances.get_balance(chart.petty_cash).await.expect("petty");
    let bank = balances.get_balance(chart.bank).await.expect("bank");
    assert_eq!(petty.current_balance, dec!(500));
    assert_eq!(bank.current_balance, dec!(1500));
}

#[tokio::test]
async fn test_add_cash_needs_a_funded_asset_source() {
    let db = setup_db().await;
    let (_, repo, box_id) = funded_box(&db).await;

    let overdrawn = repo
        .add_cash(box_id, dec!(2500), "1100".to_string(), None, meta(2))
        .await
        .expect_err("bank holds only 2000");
    assert!(matches!(AppError::from(overdrawn), AppError::InsufficientFunds(_)));

    let not_asset = repo
        .add_cash(box_id, dec!(10), "3000".to_string(), None, meta(2))
        .await
        .expect_err("equity is not a cash source");
    assert!(matches!(
        not_asset,
        PettyCashRepoError::PettyCash(PettyCashError::WrongAccountType { .. })
    ));

    let unknown = repo
        .add_cash(box_id, dec!(10), "1999".to_string(), None, meta(2))
        .await
        .expect_err("no such account");
    assert!(matches!(
        unknown,
        PettyCashRepoError::PettyCash(PettyCashError::LedgerAccountNotFound(_))
    ));

    let zero = repo
        .add_cash(box_id, dec!(0), "1100".to_string(), None, meta(2))
        .await
        .expect_err("zero amount");
    assert!(matches!(AppError::from(zero), AppError::Validation(_)));

    let untouched = repo.get_account(box_id).await.expect("box");
    assert_eq!(untouched.current_balance, dec!(0));
}

#[tokio::test]
async fn test_petty_cash_account_is_not_its_own_counterparty() {
    let db = setup_db().await;
    let (chart, repo, box_id) = funded_box(&db).await;
    let balances = BalanceRepository::new(db.clone());
    repo.add_cash(box_id, dec!(300), "1100".to_string(), None, meta(2))
        .await
        .expect("fund box");

    let self_funded = repo
        .add_cash(box_id, dec!(200), "1010".to_string(), None, meta(3))
        .await
        .expect_err("box cannot fund itself");
    assert!(matches!(
        self_funded,
        PettyCashRepoError::PettyCash(PettyCashError::SameAccount(_))
    ));

    let self_withdrawn = repo
        .withdraw_cash(box_id, dec!(50), "1010".to_string(), None, meta(3))
        .await
        .expect_err("box cannot pay itself");
    assert!(matches!(AppError::from(self_withdrawn), AppError::Validation(_)));

    let account = repo.get_account(box_id).await.expect("box");
    let petty = balances.get_balance(chart.petty_cash).await.expect("petty");
    assert_eq!(account.current_balance, dec!(300));
    assert_eq!(account.total_inflows, dec!(300));
    assert_eq!(petty.current_balance, account.current_balance);
}

#[tokio::test]
async fn test_student_payment_credits_revenue() {
    let db = setup_db().await;
    let (chart, repo, box_id) = funded_box(&db).await;

    let recorded = repo
        .record_student_payment(
            box_id,
            dec!(750),
            "4100".to_string(),
            Some("Room 2 February".to_string()),
            meta(3),
        )
        .await
        .expect("student payment");
    assert_eq!(recorded.account.current_balance, dec!(750));
    assert_eq!(recorded.entry.description, "Room 2 February");

    let revenue = BalanceRepository::new(db.clone())
        .get_balance(chart.rent_revenue)
        .await
        .expect("revenue");
    assert_eq!(revenue.current_balance, dec!(750));
}

// ============================================================================
// Outflows
// ============================================================================

#[tokio::test]
async fn test_withdraw_beyond_balance_fails_and_leaves_box_unchanged() {
    let db = setup_db().await;
    let (chart, repo, box_id) = funded_box(&db).await;
    repo.add_cash(box_id, dec!(500), "1100".to_string(), None, meta(2))
        .await
        .expect("add cash");

    let err = repo
        .withdraw_cash(box_id, dec!(600), "1100".to_string(), None, meta(4))
        .await
        .expect_err("only 500 in the box");
    assert!(matches!(
        err,
        PettyCashRepoError::PettyCash(PettyCashError::InsufficientFunds { .. })
    ));

    let account = repo.get_account(box_id).await.expect("box");
    assert_eq!(account.current_balance, dec!(500));
    let petty = BalanceRepository::new(db.clone())
        .get_balance(chart.petty_cash)
        .await
        .expect("petty");
    assert_eq!(petty.current_balance, dec!(500));

    let recorded = repo
        .withdraw_cash(box_id, dec!(200), "1100".to_string(), None, meta(4))
        .await
        .expect("withdraw");
    assert_eq!(recorded.account.current_balance, dec!(300));
    assert_eq!(recorded.account.total_outflows, dec!(200));
}

#[tokio::test]
async fn test_expense_without_category_posts_to_uncategorized() {
    let db = setup_db().await;
    let (chart, repo, box_id) = funded_box(&db).await;
    let balances = BalanceRepository::new(db.clone());
    repo.add_cash(box_id, dec!(300), "1100".to_string(), None, meta(2))
        .await
        .expect("add cash");

    let uncategorized = repo
        .add_expense(box_id, dec!(42.50), None, Some("Light bulbs".to_string()), meta(5))
        .await
        .expect("expense without category");
    assert_eq!(uncategorized.account.current_balance, dec!(257.50));

    repo.add_expense(box_id, dec!(57.50), Some("5100".to_string()), None, meta(6))
        .await
        .expect("utilities expense");

    let misc = balances.get_balance(chart.uncategorized).await.expect("misc");
    let utilities = balances.get_balance(chart.utilities).await.expect("utilities");
    let petty = balances.get_balance(chart.petty_cash).await.expect("petty");
    assert_eq!(misc.current_balance, dec!(42.50));
    assert_eq!(utilities.current_balance, dec!(57.50));
    assert_eq!(petty.current_balance, dec!(200));

    let wrong = repo
        .add_expense(box_id, dec!(1), Some("4100".to_string()), None, meta(6))
        .await
        .expect_err("revenue is not an expense");
    assert!(matches!(AppError::from(wrong), AppError::Validation(_)));

    let history = repo.list_transactions(box_id).await.expect("history");
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].balance_after, dec!(200));
}

// ============================================================================
// Beginning balance
// ============================================================================

#[tokio::test]
async fn test_beginning_balance_only_on_empty_box() {
    let db = setup_db().await;
    let (_, repo, box_id) = funded_box(&db).await;

    let opened = repo
        .set_beginning_balance(box_id, dec!(150), "3000".to_string(), meta(1))
        .await
        .expect("beginning balance");
    assert_eq!(opened.account.beginning_balance, dec!(150));
    assert_eq!(opened.account.current_balance, dec!(150));
    assert_eq!(opened.account.total_inflows, dec!(0));

    let locked = repo
        .set_beginning_balance(box_id, dec!(200), "3000".to_string(), meta(2))
        .await
        .expect_err("box already has movements");
    assert!(matches!(
        locked,
        PettyCashRepoError::PettyCash(PettyCashError::BeginningBalanceLocked)
    ));
}

#[tokio::test]
async fn test_open_account_is_get_or_create() {
    let db = setup_db().await;
    let repo = PettyCashRepository::new(db.clone(), &LedgerConfig::default());
    let (user, house) = (Uuid::now_v7(), Uuid::now_v7());

    let first = repo.open_account(user, house).await.expect("open");
    let second = repo.open_account(user, house).await.expect("reopen");
    assert_eq!(first.id, second.id);

    let other_house = repo.open_account(user, Uuid::now_v7()).await.expect("other");
    assert_ne!(first.id, other_house.id);
}
