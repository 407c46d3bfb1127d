//! Database seeder for Lodgebook development.
//!
//! Seeds the default boarding-house chart of accounts and twelve monthly
//! balance periods. Accounts whose code already exists are skipped, and
//! periods are only created on an empty period table.
//!
//! Usage: `cargo run --bin seeder` (`SEED_YEAR` picks the year, default current).

use std::collections::{HashMap, HashSet};

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use lodgebook_core::ledger::AccountType;
use lodgebook_db::{
    AccountRepository, PeriodRepository, connect_with, repositories::CreateAccountInput,
};
use lodgebook_shared::AppConfig;
use tracing::info;
use uuid::Uuid;

/// (code, name, type, is_category, parent code)
const CHART: &[(&str, &str, AccountType, bool, Option<&str>)] = &[
    ("1000", "Assets", AccountType::Asset, true, None),
    ("1010", "Petty Cash", AccountType::Asset, false, Some("1000")),
    ("1100", "Bank", AccountType::Asset, false, Some("1000")),
    ("1200", "Rent Receivable", AccountType::Asset, false, Some("1000")),
    ("2000", "Liabilities", AccountType::Liability, true, None),
    ("2100", "Security Deposits", AccountType::Liability, false, Some("2000")),
    ("3000", "Equity", AccountType::Equity, true, None),
    ("3100", "Owner Capital", AccountType::Equity, false, Some("3000")),
    ("4000", "Revenue", AccountType::Revenue, true, None),
    ("4100", "Rent Revenue", AccountType::Revenue, false, Some("4000")),
    ("4200", "Laundry Revenue", AccountType::Revenue, false, Some("4000")),
    ("5000", "Expenses", AccountType::Expense, true, None),
    ("5100", "Utilities", AccountType::Expense, false, Some("5000")),
    ("5200", "Repairs and Maintenance", AccountType::Expense, false, Some("5000")),
    ("5300", "Cleaning Supplies", AccountType::Expense, false, Some("5000")),
    ("5999", "Uncategorized Expense", AccountType::Expense, false, Some("5000")),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lodgebook=info".into()),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;

    let accounts = AccountRepository::new(db.clone());
    seed_chart(&accounts).await?;

    let year = match std::env::var("SEED_YEAR") {
        Ok(raw) => raw.parse().context("SEED_YEAR must be a year")?,
        Err(_) => Utc::now().year(),
    };
    seed_periods(&PeriodRepository::new(db), year).await?;

    info!("Seeding complete");
    Ok(())
}

async fn seed_chart(accounts: &AccountRepository) -> anyhow::Result<()> {
    let existing = accounts.list_accounts().await?;
    let mut ids: HashMap<String, Uuid> = existing
        .iter()
        .map(|a| (a.code.clone(), a.id))
        .collect();
    let known: HashSet<String> = ids.keys().cloned().collect();

    let mut inserted = 0;
    for &(code, name, account_type, is_category, parent) in CHART {
        if known.contains(code) {
            continue;
        }
        let parent_id = parent.and_then(|p| ids.get(p).copied());
        let account = accounts
            .create_account(CreateAccountInput {
                code: code.to_string(),
                name: name.to_string(),
                account_type,
                is_category,
                parent_id,
            })
            .await
            .with_context(|| format!("Failed to create account {code}"))?;
        ids.insert(account.code, account.id);
        inserted += 1;
    }

    info!(inserted, skipped = CHART.len() - inserted, "Chart of accounts seeded");
    Ok(())
}

async fn seed_periods(periods: &PeriodRepository, year: i32) -> anyhow::Result<()> {
    if !periods.list_periods().await?.is_empty() {
        info!("Periods already exist, skipping");
        return Ok(());
    }

    for month in 1..=12 {
        let start = NaiveDate::from_ymd_opt(year, month, 1).context("invalid period start")?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .context("invalid period end")?;
        let end = next.pred_opt().context("invalid period end")?;

        periods
            .create_period(&format!("{year}-{month:02}"), start, end)
            .await?;
    }

    info!(year, "Monthly periods seeded");
    Ok(())
}
