//! Shared fixtures for repository tests.
//!
//! Every test gets its own in-memory SQLite database with the schema applied.

#![allow(dead_code)]

use chrono::NaiveDate;
use lodgebook_core::ledger::{AccountType, CreateTransactionInput, JournalEntryInput};
use lodgebook_db::{
    AccountRepository,
    migration::{Migrator, MigratorTrait},
    repositories::CreateAccountInput,
};
use lodgebook_shared::types::{AccountId, UserId};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

/// Opens a fresh migrated in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// The default boarding-house chart used across tests.
pub struct Chart {
    pub petty_cash: Uuid,
    pub bank: Uuid,
    pub equity: Uuid,
    pub rent_revenue: Uuid,
    pub utilities: Uuid,
    pub uncategorized: Uuid,
}

pub async fn seed_chart(db: &DatabaseConnection) -> Chart {
    let repo = AccountRepository::new(db.clone());
    let mut ids = Vec::new();
    for (code, name, account_type) in [
        ("1010", "Petty Cash", AccountType::Asset),
        ("1100", "Bank BCA", AccountType::Asset),
        ("3000", "Owner Equity", AccountType::Equity),
        ("4100", "Rent Revenue", AccountType::Revenue),
        ("5100", "Utilities", AccountType::Expense),
        ("5999", "Uncategorized Expense", AccountType::Expense),
    ] {
        let account = repo
            .create_account(CreateAccountInput {
                code: code.to_string(),
                name: name.to_string(),
                account_type,
                is_category: false,
                parent_id: None,
            })
            .await
            .expect("Failed to create account");
        ids.push(account.id);
    }

    Chart {
        petty_cash: ids[0],
        bank: ids[1],
        equity: ids[2],
        rent_revenue: ids[3],
        utilities: ids[4],
        uncategorized: ids[5],
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A posted two-line transaction: Dr `debit` / Cr `credit`.
pub fn transfer(
    on: NaiveDate,
    debit: Uuid,
    credit: Uuid,
    amount: Decimal,
    description: &str,
) -> CreateTransactionInput {
    CreateTransactionInput {
        transaction_type: "manual".to_string(),
        reference: None,
        description: description.to_string(),
        transaction_date: on,
        currency: "IDR".to_string(),
        boarding_house_id: None,
        as_draft: false,
        entries: vec![
            JournalEntryInput::debit(AccountId::from_uuid(debit), amount),
            JournalEntryInput::credit(AccountId::from_uuid(credit), amount),
        ],
        created_by: UserId::new(),
    }
}
