//! Current account balance maintenance.
//!
//! `current_account_balances` is a materialized aggregate of posted journal
//! entries. Posting updates it incrementally through [`apply_entry`]; void,
//! update and delete rebuild it from the journal through [`recompute_accounts`].

use chrono::{NaiveDate, Utc};
use lodgebook_core::ledger::{self, BalanceTotals, EntryType};
use lodgebook_shared::{
    AppError,
    types::{MoneyError, from_minor, to_minor},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entities::{
    accounts, current_account_balances, journal_entries, sea_orm_active_enums::TransactionStatus,
    transactions,
};
use crate::locking::for_update;

/// Error types for balance operations.
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Amount does not fit the persisted range.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BalanceError> for AppError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::AccountNotFound(_) => Self::NotFound(err.to_string()),
            BalanceError::Money(e) => e.into(),
            BalanceError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Materialized balance of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    /// Account ID.
    pub account_id: Uuid,
    /// Balance following the account type formula.
    pub current_balance: Decimal,
    /// Σ posted debits.
    pub total_debits: Decimal,
    /// Σ posted credits.
    pub total_credits: Decimal,
    /// Posted entries counted.
    pub transaction_count: i64,
    /// Latest posted entry date.
    pub last_transaction_date: Option<NaiveDate>,
}

impl AccountBalance {
    fn zero(account_id: Uuid) -> Self {
        Self {
            account_id,
            current_balance: Decimal::ZERO,
            total_debits: Decimal::ZERO,
            total_credits: Decimal::ZERO,
            transaction_count: 0,
            last_transaction_date: None,
        }
    }

    fn from_totals(account_id: Uuid, account_type: ledger::AccountType, totals: &BalanceTotals) -> Self {
        Self {
            account_id,
            current_balance: totals.balance(account_type),
            total_debits: totals.total_debits,
            total_credits: totals.total_credits,
            transaction_count: totals.transaction_count,
            last_transaction_date: totals.last_transaction_date,
        }
    }
}

impl From<current_account_balances::Model> for AccountBalance {
    fn from(row: current_account_balances::Model) -> Self {
        Self {
            account_id: row.account_id,
            current_balance: from_minor(row.current_balance_minor),
            total_debits: from_minor(row.total_debits_minor),
            total_credits: from_minor(row.total_credits_minor),
            transaction_count: row.transaction_count,
            last_transaction_date: row.last_transaction_date,
        }
    }
}

/// Stored row next to a fresh replay of the journal.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceCheck {
    /// What the cache holds.
    pub stored: AccountBalance,
    /// What the journal says.
    pub computed: AccountBalance,
    /// Whether both agree.
    pub is_consistent: bool,
}

fn totals_from_row(row: &current_account_balances::Model) -> BalanceTotals {
    BalanceTotals {
        total_debits: from_minor(row.total_debits_minor),
        total_credits: from_minor(row.total_credits_minor),
        transaction_count: row.transaction_count,
        last_transaction_date: row.last_transaction_date,
    }
}

async fn account_type_of<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
) -> Result<ledger::AccountType, BalanceError> {
    accounts::Entity::find_by_id(account_id)
        .one(conn)
        .await?
        .map(|a| a.account_type.into())
        .ok_or(BalanceError::AccountNotFound(account_id))
}

async fn write_row<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    account_type: ledger::AccountType,
    totals: &BalanceTotals,
    exists: bool,
) -> Result<AccountBalance, BalanceError> {
    let balance = AccountBalance::from_totals(account_id, account_type, totals);
    let row = current_account_balances::ActiveModel {
        account_id: Set(account_id),
        current_balance_minor: Set(to_minor(balance.current_balance)?),
        total_debits_minor: Set(to_minor(balance.total_debits)?),
        total_credits_minor: Set(to_minor(balance.total_credits)?),
        transaction_count: Set(balance.transaction_count),
        last_transaction_date: Set(balance.last_transaction_date),
        updated_at: Set(Utc::now().into()),
    };
    if exists {
        row.update(conn).await?;
    } else {
        row.insert(conn).await?;
    }
    Ok(balance)
}

/// Applies one posted entry to the account's cached balance.
///
/// Locks the balance row, creating it on first use. An unknown account
/// aborts the surrounding unit of work.
pub(crate) async fn apply_entry<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    entry_type: EntryType,
    amount: Decimal,
    date: NaiveDate,
) -> Result<AccountBalance, BalanceError> {
    let account_type = account_type_of(conn, account_id).await?;

    let existing = for_update(current_account_balances::Entity::find_by_id(account_id), conn)
        .one(conn)
        .await?;
    let mut totals = existing.as_ref().map(totals_from_row).unwrap_or_default();
    totals.apply(entry_type, amount, date);

    write_row(conn, account_id, account_type, &totals, existing.is_some()).await
}

/// Replays every live entry of posted, live transactions for an account.
pub(crate) async fn replay_account<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
) -> Result<BalanceTotals, DbErr> {
    let rows = journal_entries::Entity::find()
        .find_also_related(transactions::Entity)
        .filter(journal_entries::Column::AccountId.eq(account_id))
        .filter(journal_entries::Column::DeletedAt.is_null())
        .filter(transactions::Column::Status.eq(TransactionStatus::Posted))
        .filter(transactions::Column::DeletedAt.is_null())
        .order_by_asc(journal_entries::Column::CreatedAt)
        .all(conn)
        .await?;

    Ok(BalanceTotals::replay(rows.into_iter().filter_map(
        |(entry, txn)| {
            txn.map(|t| {
                (
                    EntryType::from(entry.entry_type),
                    from_minor(entry.amount_minor),
                    t.transaction_date,
                )
            })
        },
    )))
}

/// Rebuilds the cached balance of every given account from the journal.
pub(crate) async fn recompute_accounts<C: ConnectionTrait>(
    conn: &C,
    account_ids: &[Uuid],
) -> Result<Vec<AccountBalance>, BalanceError> {
    let mut ids = account_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut balances = Vec::with_capacity(ids.len());
    for account_id in ids {
        let account_type = account_type_of(conn, account_id).await?;
        let existing = for_update(current_account_balances::Entity::find_by_id(account_id), conn)
            .one(conn)
            .await?;
        let totals = replay_account(conn, account_id).await?;
        let balance = write_row(conn, account_id, account_type, &totals, existing.is_some()).await?;
        debug!(account_id = %account_id, balance = %balance.current_balance, "Balance recomputed");
        balances.push(balance);
    }
    Ok(balances)
}

/// Reads and locks an account's cached balance, zero when nothing was posted yet.
///
/// The lock holds until the caller's unit of work ends, so a funds check made
/// on this value stays true while the movement is written.
pub(crate) async fn locked_balance<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
) -> Result<Decimal, DbErr> {
    Ok(for_update(current_account_balances::Entity::find_by_id(account_id), conn)
        .one(conn)
        .await?
        .map_or(Decimal::ZERO, |row| from_minor(row.current_balance_minor)))
}

/// Balance repository: reads and maintenance of the balance cache.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the cached balance of an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub async fn get_balance(&self, account_id: Uuid) -> Result<AccountBalance, BalanceError> {
        account_type_of(&self.db, account_id).await?;
        Ok(current_account_balances::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .map_or_else(|| AccountBalance::zero(account_id), Into::into))
    }

    /// Lists every cached balance row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_balances(&self) -> Result<Vec<AccountBalance>, BalanceError> {
        let rows = current_account_balances::Entity::find()
            .order_by_asc(current_account_balances::Column::AccountId)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Rebuilds an account's cached balance from the journal.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub async fn recompute_account(&self, account_id: Uuid) -> Result<AccountBalance, BalanceError> {
        let txn = self.db.begin().await?;
        let balance = recompute_accounts(&txn, &[account_id])
            .await?
            .pop()
            .unwrap_or_else(|| AccountBalance::zero(account_id));
        txn.commit().await?;

        info!(account_id = %account_id, balance = %balance.current_balance, "Account balance recomputed");
        Ok(balance)
    }

    /// Compares the cached balance with a replay of the journal.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub async fn verify_account(&self, account_id: Uuid) -> Result<BalanceCheck, BalanceError> {
        let account_type = account_type_of(&self.db, account_id).await?;
        let stored = self.get_balance(account_id).await?;
        let totals = replay_account(&self.db, account_id).await?;
        let computed = AccountBalance::from_totals(account_id, account_type, &totals);

        let is_consistent = stored.current_balance == computed.current_balance
            && stored.total_debits == computed.total_debits
            && stored.total_credits == computed.total_credits
            && stored.transaction_count == computed.transaction_count;
        if !is_consistent {
            warn!(
                account_id = %account_id,
                stored = %stored.current_balance,
                computed = %computed.current_balance,
                "Balance cache drifted from journal"
            );
        }

        Ok(BalanceCheck {
            stored,
            computed,
            is_consistent,
        })
    }
}
