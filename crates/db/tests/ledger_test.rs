//! Integration tests for the journal and the balance cache.

mod common;

use common::{date, seed_chart, setup_db, transfer};
use lodgebook_core::ledger::{
    CreateTransactionInput, JournalEntryInput, LedgerError, TransactionStatus,
};
use lodgebook_db::{
    AccountRepository, BalanceRepository, PeriodRepository, TransactionError,
    TransactionRepository, repositories::TransactionFilter,
};
use lodgebook_shared::{
    AppError,
    types::{AccountId, PageRequest, UserId},
};
use rust_decimal_macros::dec;

// ============================================================================
// Posting
// ============================================================================

#[tokio::test]
async fn test_posting_updates_both_balances() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let transactions = TransactionRepository::new(db.clone());
    let balances = BalanceRepository::new(db.clone());

    let created = transactions
        .create_transaction(transfer(
            date(2026, 1, 5),
            chart.bank,
            chart.rent_revenue,
            dec!(100),
            "January rent room 4",
        ))
        .await
        .expect("Failed to post transaction");

    assert_eq!(created.transaction.status, TransactionStatus::Posted);
    assert_eq!(created.transaction.amount, dec!(100));
    assert_eq!(created.entries.len(), 2);
    assert_eq!(created.entries[0].line_number, 1);

    let bank = balances.get_balance(chart.bank).await.expect("bank balance");
    let revenue = balances
        .get_balance(chart.rent_revenue)
        .await
        .expect("revenue balance");
    assert_eq!(bank.current_balance, dec!(100));
    assert_eq!(bank.total_debits, dec!(100));
    assert_eq!(revenue.current_balance, dec!(100));
    assert_eq!(revenue.total_credits, dec!(100));
    assert_eq!(bank.last_transaction_date, Some(date(2026, 1, 5)));
}

#[tokio::test]
async fn test_unbalanced_transaction_is_rejected_without_side_effects() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let transactions = TransactionRepository::new(db.clone());

    let mut input = transfer(date(2026, 1, 5), chart.bank, chart.rent_revenue, dec!(100), "x");
    input.entries[1].amount = dec!(99.98);

    let err = transactions
        .create_transaction(input)
        .await
        .expect_err("unbalanced transaction must fail");
    assert!(matches!(
        err,
        TransactionError::Ledger(LedgerError::UnbalancedTransaction { .. })
    ));
    assert!(matches!(AppError::from(err), AppError::Validation(_)));

    let balance = BalanceRepository::new(db.clone())
        .get_balance(chart.bank)
        .await
        .expect("balance");
    assert_eq!(balance.current_balance, dec!(0));
    assert_eq!(balance.transaction_count, 0);
}

#[tokio::test]
async fn test_one_cent_rounding_difference_is_accepted() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let transactions = TransactionRepository::new(db.clone());

    let mut input = transfer(date(2026, 1, 5), chart.bank, chart.rent_revenue, dec!(100), "x");
    input.entries[1].amount = dec!(99.99);

    let created = transactions
        .create_transaction(input)
        .await
        .expect("a one-cent difference is within tolerance");
    assert_eq!(created.transaction.amount, dec!(100));
}

#[tokio::test]
async fn test_category_account_cannot_be_posted_to() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let accounts = AccountRepository::new(db.clone());
    let category = accounts
        .create_account(lodgebook_db::repositories::CreateAccountInput {
            code: "5000".to_string(),
            name: "Operating Expenses".to_string(),
            account_type: lodgebook_core::ledger::AccountType::Expense,
            is_category: true,
            parent_id: None,
        })
        .await
        .expect("category");

    let err = TransactionRepository::new(db.clone())
        .create_transaction(transfer(date(2026, 1, 5), category.id, chart.bank, dec!(10), "x"))
        .await
        .expect_err("category accounts carry no entries");
    assert!(matches!(
        err,
        TransactionError::Ledger(LedgerError::CategoryAccount(_))
    ));
}

#[tokio::test]
async fn test_draft_is_invisible_until_posted() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let transactions = TransactionRepository::new(db.clone());
    let balances = BalanceRepository::new(db.clone());

    let mut input = transfer(date(2026, 1, 8), chart.utilities, chart.bank, dec!(45.50), "PLN");
    input.as_draft = true;
    let draft = transactions.create_transaction(input).await.expect("draft");
    assert_eq!(draft.transaction.status, TransactionStatus::Draft);

    let before = balances.get_balance(chart.utilities).await.expect("balance");
    assert_eq!(before.current_balance, dec!(0));

    let posted = transactions
        .post_transaction(draft.transaction.id)
        .await
        .expect("post draft");
    assert_eq!(posted.status, TransactionStatus::Posted);
    assert!(posted.posted_at.is_some());

    let after = balances.get_balance(chart.utilities).await.expect("balance");
    assert_eq!(after.current_balance, dec!(45.50));

    let err = transactions
        .post_transaction(draft.transaction.id)
        .await
        .expect_err("posting twice must fail");
    assert!(matches!(AppError::from(err), AppError::NotFound(_)));
}

// ============================================================================
// Void, update and delete
// ============================================================================

#[tokio::test]
async fn test_void_recomputes_balances() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let transactions = TransactionRepository::new(db.clone());
    let balances = BalanceRepository::new(db.clone());

    transactions
        .create_transaction(transfer(date(2026, 1, 2), chart.bank, chart.equity, dec!(1000), "capital"))
        .await
        .expect("capital");
    let utilities = transactions
        .create_transaction(transfer(date(2026, 1, 9), chart.utilities, chart.bank, dec!(250), "water"))
        .await
        .expect("utilities");

    let voided = transactions
        .void_transaction(utilities.transaction.id, "duplicate invoice", UserId::new())
        .await
        .expect("void");
    assert_eq!(voided.status, TransactionStatus::Voided);
    assert_eq!(voided.void_reason.as_deref(), Some("duplicate invoice"));

    let bank = balances.get_balance(chart.bank).await.expect("bank");
    let expense = balances.get_balance(chart.utilities).await.expect("expense");
    assert_eq!(bank.current_balance, dec!(1000));
    assert_eq!(bank.transaction_count, 1);
    assert_eq!(expense.current_balance, dec!(0));
    assert_eq!(expense.transaction_count, 0);

    let err = transactions
        .void_transaction(utilities.transaction.id, "again", UserId::new())
        .await
        .expect_err("voided is terminal");
    assert!(matches!(
        err,
        TransactionError::Ledger(LedgerError::InvalidStatus { .. })
    ));
}

#[tokio::test]
async fn test_update_posted_transaction_recomputes_old_and_new_accounts() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let transactions = TransactionRepository::new(db.clone());
    let balances = BalanceRepository::new(db.clone());

    let original = transactions
        .create_transaction(transfer(date(2026, 1, 9), chart.utilities, chart.bank, dec!(250), "water"))
        .await
        .expect("original");

    let updated = transactions
        .update_transaction(
            original.transaction.id,
            transfer(date(2026, 1, 10), chart.uncategorized, chart.petty_cash, dec!(80), "misc"),
        )
        .await
        .expect("update");
    assert_eq!(updated.transaction.amount, dec!(80));
    assert_eq!(updated.transaction.transaction_date, date(2026, 1, 10));
    assert_eq!(updated.entries.len(), 2);

    let utilities = balances.get_balance(chart.utilities).await.expect("utilities");
    let bank = balances.get_balance(chart.bank).await.expect("bank");
    let misc = balances.get_balance(chart.uncategorized).await.expect("misc");
    let petty = balances.get_balance(chart.petty_cash).await.expect("petty");
    assert_eq!(utilities.current_balance, dec!(0));
    assert_eq!(bank.current_balance, dec!(0));
    assert_eq!(misc.current_balance, dec!(80));
    assert_eq!(petty.current_balance, dec!(-80));

    let fetched = transactions
        .get_transaction(original.transaction.id)
        .await
        .expect("get");
    assert_eq!(fetched.entries.len(), 2, "old entries are soft-deleted");
}

#[tokio::test]
async fn test_voided_transaction_cannot_be_updated() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let transactions = TransactionRepository::new(db.clone());

    let created = transactions
        .create_transaction(transfer(date(2026, 1, 9), chart.utilities, chart.bank, dec!(250), "water"))
        .await
        .expect("create");
    transactions
        .void_transaction(created.transaction.id, "wrong", UserId::new())
        .await
        .expect("void");

    let err = transactions
        .update_transaction(
            created.transaction.id,
            transfer(date(2026, 1, 9), chart.utilities, chart.bank, dec!(20), "water"),
        )
        .await
        .expect_err("voided cannot change");
    assert!(matches!(
        err,
        TransactionError::Ledger(LedgerError::CannotModifyVoided(_))
    ));

    transactions
        .delete_transaction(created.transaction.id)
        .await
        .expect("voided transactions can be deleted");
}

#[tokio::test]
async fn test_delete_posted_transaction_recomputes_and_hides_it() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let transactions = TransactionRepository::new(db.clone());
    let balances = BalanceRepository::new(db.clone());

    let created = transactions
        .create_transaction(transfer(date(2026, 1, 5), chart.bank, chart.rent_revenue, dec!(100), "rent"))
        .await
        .expect("create");
    transactions
        .delete_transaction(created.transaction.id)
        .await
        .expect("delete");

    let bank = balances.get_balance(chart.bank).await.expect("bank");
    assert_eq!(bank.current_balance, dec!(0));

    let err = transactions
        .get_transaction(created.transaction.id)
        .await
        .expect_err("deleted transactions are gone");
    assert!(matches!(
        err,
        TransactionError::Ledger(LedgerError::TransactionNotFound(_))
    ));
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_list_transactions_filters_and_paginates() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let transactions = TransactionRepository::new(db.clone());

    for day in 1..=5 {
        transactions
            .create_transaction(transfer(date(2026, 1, day), chart.bank, chart.rent_revenue, dec!(10), "rent"))
            .await
            .expect("create");
    }
    let mut draft = transfer(date(2026, 1, 6), chart.utilities, chart.bank, dec!(5), "draft");
    draft.as_draft = true;
    transactions.create_transaction(draft).await.expect("draft");

    let page = transactions
        .list_transactions(
            TransactionFilter {
                status: Some(TransactionStatus::Posted),
                ..TransactionFilter::default()
            },
            PageRequest { page: 1, per_page: 2 },
        )
        .await
        .expect("list");
    assert_eq!(page.meta.total, 5);
    assert_eq!(page.meta.total_pages, 3);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].transaction_date, date(2026, 1, 5));

    let january_first_half = transactions
        .list_transactions(
            TransactionFilter {
                date_from: Some(date(2026, 1, 2)),
                date_to: Some(date(2026, 1, 3)),
                ..TransactionFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .expect("list");
    assert_eq!(january_first_half.meta.total, 2);
}

#[tokio::test]
async fn test_account_statement_running_balance() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let transactions = TransactionRepository::new(db.clone());

    transactions
        .create_transaction(transfer(date(2026, 1, 1), chart.bank, chart.equity, dec!(1000), "capital"))
        .await
        .expect("capital");
    transactions
        .create_transaction(transfer(date(2026, 1, 10), chart.utilities, chart.bank, dec!(200), "water"))
        .await
        .expect("water");
    transactions
        .create_transaction(transfer(date(2026, 1, 20), chart.bank, chart.rent_revenue, dec!(350), "rent"))
        .await
        .expect("rent");

    let statement = transactions
        .get_account_transactions(chart.bank, Some(date(2026, 1, 5)), None)
        .await
        .expect("statement");

    assert_eq!(statement.opening_balance, dec!(1000));
    assert_eq!(statement.lines.len(), 2);
    assert_eq!(statement.lines[0].credit, dec!(200));
    assert_eq!(statement.lines[0].running_balance, dec!(800));
    assert_eq!(statement.lines[1].debit, dec!(350));
    assert_eq!(statement.lines[1].running_balance, dec!(1150));
    assert_eq!(statement.closing_balance, dec!(1150));
}

#[tokio::test]
async fn test_replay_matches_cache_after_mixed_operations() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let transactions = TransactionRepository::new(db.clone());
    let balances = BalanceRepository::new(db.clone());

    let a = transactions
        .create_transaction(transfer(date(2026, 1, 1), chart.bank, chart.equity, dec!(500), "a"))
        .await
        .expect("a");
    transactions
        .create_transaction(transfer(date(2026, 1, 2), chart.utilities, chart.bank, dec!(70.25), "b"))
        .await
        .expect("b");
    let c = transactions
        .create_transaction(transfer(date(2026, 1, 3), chart.bank, chart.rent_revenue, dec!(30), "c"))
        .await
        .expect("c");
    transactions
        .void_transaction(c.transaction.id, "reversed", UserId::new())
        .await
        .expect("void c");
    transactions
        .update_transaction(
            a.transaction.id,
            transfer(date(2026, 1, 1), chart.bank, chart.equity, dec!(650), "a"),
        )
        .await
        .expect("update a");

    for account in [chart.bank, chart.equity, chart.utilities, chart.rent_revenue] {
        let check = balances.verify_account(account).await.expect("verify");
        assert!(check.is_consistent, "cache drifted for {account}");
    }
    let bank = balances.get_balance(chart.bank).await.expect("bank");
    assert_eq!(bank.current_balance, dec!(579.75));

    let recomputed = balances.recompute_account(chart.bank).await.expect("recompute");
    assert_eq!(recomputed, bank);
}

#[tokio::test]
async fn test_posting_into_closed_period_is_rejected() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let periods = PeriodRepository::new(db.clone());
    let transactions = TransactionRepository::new(db.clone());

    let january = periods
        .create_period("2026-01", date(2026, 1, 1), date(2026, 1, 31))
        .await
        .expect("january");
    periods
        .create_period("2026-02", date(2026, 2, 1), date(2026, 2, 28))
        .await
        .expect("february");
    periods
        .close_period(january.id, UserId::new())
        .await
        .expect("close january");

    let err = transactions
        .create_transaction(transfer(date(2026, 1, 15), chart.bank, chart.equity, dec!(5), "late"))
        .await
        .expect_err("january is closed");
    assert!(matches!(AppError::from(err), AppError::Validation(_)));
}

#[tokio::test]
async fn test_account_with_entries_cannot_be_deleted() {
    let db = setup_db().await;
    let chart = seed_chart(&db).await;
    let accounts = AccountRepository::new(db.clone());

    let entries = vec![
        JournalEntryInput::debit(AccountId::from_uuid(chart.bank), dec!(10)),
        JournalEntryInput::credit(AccountId::from_uuid(chart.equity), dec!(10)),
    ];
    TransactionRepository::new(db.clone())
        .create_transaction(CreateTransactionInput {
            transaction_type: "capital".to_string(),
            reference: Some("CAP-1".to_string()),
            description: "Opening capital".to_string(),
            transaction_date: date(2026, 1, 1),
            currency: "IDR".to_string(),
            boarding_house_id: None,
            as_draft: false,
            entries,
            created_by: UserId::new(),
        })
        .await
        .expect("capital");

    let err = accounts
        .soft_delete_account(chart.bank)
        .await
        .expect_err("bank has entries");
    assert!(matches!(AppError::from(err), AppError::Validation(_)));

    accounts
        .soft_delete_account(chart.uncategorized)
        .await
        .expect("unused account can be deleted");
    let listed = accounts.list_accounts().await.expect("list");
    assert!(listed.iter().all(|a| a.id != chart.uncategorized));
    assert_eq!(listed[0].code, "1010");
}
