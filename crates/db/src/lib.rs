//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Every mutating repository method runs as one database transaction.
//! Posting helpers take any `ConnectionTrait` so a petty-cash movement, its
//! ledger transaction and the balance updates share that transaction.

pub mod entities;
mod locking;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountError, AccountRepository, BalanceError, BalanceRepository, PeriodRepoError,
    PeriodRepository, PettyCashRepoError, PettyCashRepository, ReconciliationRepoError,
    ReconciliationRepository, TransactionError, TransactionRepository,
};

use std::time::Duration;

use lodgebook_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection using the configured pool bounds.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);
    Database::connect(options).await
}
