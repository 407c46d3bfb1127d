//! Transaction repository: the journal and its posting lifecycle.
//!
//! Posting a transaction writes its header and entries, then feeds every entry
//! to the balance cache and the period rows inside the same unit of work.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use lodgebook_core::ledger::{
    self, AccountStatement, CreateTransactionInput, EntryType, JournalEntryInput, LedgerError,
    LedgerService, ResolvedEntry, StatementEntry, build_statement,
};
use lodgebook_shared::{
    AppError,
    types::{AccountId, MoneyError, PageRequest, PageResponse, UserId, from_minor, to_minor},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::account::load_account_infos;
use super::balance::{BalanceError, apply_entry, recompute_accounts};
use super::period::{PeriodRepoError, accumulate_entry, ensure_open, recompute_period_rows};
use crate::entities::{
    accounts, journal_entries, reconciliation_items, sea_orm_active_enums::TransactionStatus,
    transactions,
};
use crate::locking::for_update;

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Posting rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Balance cache update failed.
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// Period row update failed.
    #[error(transparent)]
    Period(#[from] PeriodRepoError),

    /// Amount does not fit the persisted range.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Ledger(e) => e.into(),
            TransactionError::Balance(e) => e.into(),
            TransactionError::Period(e) => e.into(),
            TransactionError::Money(e) => e.into(),
            TransactionError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Filter for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by status.
    pub status: Option<ledger::TransactionStatus>,
    /// Filter by type tag.
    pub transaction_type: Option<String>,
    /// Filter by boarding house.
    pub boarding_house_id: Option<Uuid>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
}

/// Transaction header as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionHeader {
    /// Transaction ID.
    pub id: Uuid,
    /// Type tag.
    pub transaction_type: String,
    /// Human reference.
    pub reference: Option<String>,
    /// Σ debit.
    pub amount: Decimal,
    /// ISO 4217 code.
    pub currency: String,
    /// Description.
    pub description: String,
    /// Posting date.
    pub transaction_date: NaiveDate,
    /// Boarding house.
    pub boarding_house_id: Option<Uuid>,
    /// Lifecycle status.
    pub status: ledger::TransactionStatus,
    /// Creator.
    pub created_by: Uuid,
    /// When it was posted.
    pub posted_at: Option<DateTime<FixedOffset>>,
    /// When it was voided.
    pub voided_at: Option<DateTime<FixedOffset>>,
    /// Who voided it.
    pub voided_by: Option<Uuid>,
    /// Why it was voided.
    pub void_reason: Option<String>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
}

impl From<transactions::Model> for TransactionHeader {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: model.id,
            transaction_type: model.transaction_type,
            reference: model.reference,
            amount: from_minor(model.amount_minor),
            currency: model.currency,
            description: model.description,
            transaction_date: model.transaction_date,
            boarding_house_id: model.boarding_house_id,
            status: model.status.into(),
            created_by: model.created_by,
            posted_at: model.posted_at,
            voided_at: model.voided_at,
            voided_by: model.voided_by,
            void_reason: model.void_reason,
            created_at: model.created_at,
        }
    }
}

/// Journal entry as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    /// Entry ID.
    pub id: Uuid,
    /// Account posted to.
    pub account_id: Uuid,
    /// 1-based line order.
    pub line_number: i32,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
    /// Line description.
    pub description: Option<String>,
}

impl From<journal_entries::Model> for EntryView {
    fn from(model: journal_entries::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            line_number: model.line_number,
            entry_type: model.entry_type.into(),
            amount: from_minor(model.amount_minor),
            description: model.description,
        }
    }
}

/// Transaction with its live entries.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionWithEntries {
    /// Header fields.
    #[serde(flatten)]
    pub transaction: TransactionHeader,
    /// Live entries by line number.
    pub entries: Vec<EntryView>,
}

async fn find_live<C: ConnectionTrait>(
    conn: &C,
    transaction_id: Uuid,
    lock: bool,
) -> Result<transactions::Model, TransactionError> {
    let select = transactions::Entity::find_by_id(transaction_id)
        .filter(transactions::Column::DeletedAt.is_null());
    let select = if lock { for_update(select, conn) } else { select };
    select
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id).into())
}

async fn live_entries<C: ConnectionTrait>(
    conn: &C,
    transaction_id: Uuid,
) -> Result<Vec<journal_entries::Model>, DbErr> {
    journal_entries::Entity::find()
        .filter(journal_entries::Column::TransactionId.eq(transaction_id))
        .filter(journal_entries::Column::DeletedAt.is_null())
        .order_by_asc(journal_entries::Column::LineNumber)
        .all(conn)
        .await
}

/// Rejects changes to entries already matched in a reconciliation.
async fn ensure_not_reconciled<C: ConnectionTrait>(
    conn: &C,
    entries: &[journal_entries::Model],
) -> Result<(), TransactionError> {
    let matched = reconciliation_items::Entity::find()
        .filter(
            reconciliation_items::Column::JournalEntryId
                .is_in(entries.iter().map(|e| e.id).collect::<Vec<_>>()),
        )
        .filter(reconciliation_items::Column::IsReconciled.eq(true))
        .one(conn)
        .await?;
    match matched.and_then(|item| item.journal_entry_id) {
        Some(entry_id) => Err(LedgerError::EntryReconciled(entry_id).into()),
        None => Ok(()),
    }
}

async fn resolve_entries<C: ConnectionTrait>(
    conn: &C,
    entries: &[JournalEntryInput],
) -> Result<(Vec<ResolvedEntry>, Decimal), TransactionError> {
    let infos = load_account_infos(conn, entries.iter().map(|e| e.account_id.into_inner())).await?;
    let (resolved, totals) =
        LedgerService::validate_and_resolve(entries, |id| infos.get(&id).cloned())?;
    Ok((resolved, totals.total_debit))
}

async fn write_entries<C: ConnectionTrait>(
    conn: &C,
    header: &transactions::Model,
    resolved: &[ResolvedEntry],
) -> Result<(), TransactionError> {
    let now = Utc::now().into();
    for (line, entry) in (1..).zip(resolved) {
        journal_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_id: Set(header.id),
            account_id: Set(entry.account_id.into_inner()),
            line_number: Set(line),
            entry_type: Set(entry.entry_type.into()),
            amount_minor: Set(to_minor(entry.amount)?),
            description: Set(entry.description.clone()),
            boarding_house_id: Set(header.boarding_house_id),
            created_by: Set(header.created_by),
            created_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Feeds posted entries to the balance cache and the period rows.
async fn apply_posting<C: ConnectionTrait>(
    conn: &C,
    resolved: &[ResolvedEntry],
    date: NaiveDate,
) -> Result<(), TransactionError> {
    for entry in resolved {
        let account_id = entry.account_id.into_inner();
        apply_entry(conn, account_id, entry.entry_type, entry.amount, date).await?;
        accumulate_entry(
            conn,
            account_id,
            entry.account_type,
            entry.entry_type,
            entry.amount,
            date,
        )
        .await?;
    }
    Ok(())
}

/// Rebuilds balances and period rows for the accounts of a changed posted transaction.
async fn recompute_touched<C: ConnectionTrait>(
    conn: &C,
    account_ids: &BTreeSet<Uuid>,
    dates: &[NaiveDate],
) -> Result<(), TransactionError> {
    let ids: Vec<Uuid> = account_ids.iter().copied().collect();
    recompute_accounts(conn, &ids).await?;
    recompute_period_rows(conn, &ids, dates).await?;
    debug!(accounts = ids.len(), "Balances recomputed for touched accounts");
    Ok(())
}

async fn soft_delete_entries<C: ConnectionTrait>(
    conn: &C,
    entries: Vec<journal_entries::Model>,
) -> Result<(), DbErr> {
    let now = Utc::now().into();
    for entry in entries {
        let mut active: journal_entries::ActiveModel = entry.into();
        active.deleted_at = Set(Some(now));
        active.update(conn).await?;
    }
    Ok(())
}

/// Validates and writes a transaction, posting it unless it is a draft.
///
/// Runs on the caller's connection so other subledgers can write in the
/// same unit of work.
pub(crate) async fn record_transaction<C: ConnectionTrait>(
    conn: &C,
    input: CreateTransactionInput,
) -> Result<transactions::Model, TransactionError> {
    let (resolved, amount) = resolve_entries(conn, &input.entries).await?;
    let posted = !input.as_draft;
    if posted {
        ensure_open(conn, input.transaction_date).await?;
    }

    let now = Utc::now().into();
    let header = transactions::ActiveModel {
        id: Set(Uuid::now_v7()),
        transaction_type: Set(input.transaction_type),
        reference: Set(input.reference),
        amount_minor: Set(to_minor(amount)?),
        currency: Set(input.currency),
        description: Set(input.description),
        transaction_date: Set(input.transaction_date),
        boarding_house_id: Set(input.boarding_house_id),
        status: Set(if posted {
            TransactionStatus::Posted
        } else {
            TransactionStatus::Draft
        }),
        created_by: Set(input.created_by.into_inner()),
        posted_at: Set(posted.then_some(now)),
        voided_at: Set(None),
        voided_by: Set(None),
        void_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(conn)
    .await?;

    write_entries(conn, &header, &resolved).await?;
    if posted {
        apply_posting(conn, &resolved, header.transaction_date).await?;
    }
    Ok(header)
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a transaction, posted unless `as_draft` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Fewer than two entries, a non-positive amount, or unbalanced totals
    /// - An account is missing, deleted or a category
    /// - The date falls into a closed period
    pub async fn create_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> Result<TransactionWithEntries, TransactionError> {
        let txn = self.db.begin().await?;
        let header = record_transaction(&txn, input).await?;
        let entries = live_entries(&txn, header.id).await?;
        txn.commit().await?;

        info!(
            transaction_id = %header.id,
            status = ?header.status,
            amount_minor = header.amount_minor,
            "Transaction recorded"
        );
        Ok(with_entries(header, entries))
    }

    /// Posts a draft.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` unless the transaction is a draft, or any
    /// posting rule error from re-validating its entries.
    pub async fn post_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<TransactionHeader, TransactionError> {
        let txn = self.db.begin().await?;
        let header = find_live(&txn, transaction_id, true).await?;
        LedgerService::validate_can_post(transaction_id, header.status.into())?;

        let entries = live_entries(&txn, transaction_id).await?;
        let inputs: Vec<JournalEntryInput> = entries.iter().map(entry_input).collect();
        let (resolved, _) = resolve_entries(&txn, &inputs).await?;
        ensure_open(&txn, header.transaction_date).await?;
        apply_posting(&txn, &resolved, header.transaction_date).await?;

        let now = Utc::now().into();
        let mut active: transactions::ActiveModel = header.into();
        active.status = Set(TransactionStatus::Posted);
        active.posted_at = Set(Some(now));
        active.updated_at = Set(now);
        let posted = active.update(&txn).await?;
        txn.commit().await?;

        info!(transaction_id = %transaction_id, "Transaction posted");
        Ok(posted.into())
    }

    /// Voids a posted transaction and rebuilds the balances it touched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` unless the transaction is posted, and
    /// `EntryReconciled` or `PeriodClosed` when the entries are frozen.
    pub async fn void_transaction(
        &self,
        transaction_id: Uuid,
        reason: &str,
        voided_by: UserId,
    ) -> Result<TransactionHeader, TransactionError> {
        let txn = self.db.begin().await?;
        let header = find_live(&txn, transaction_id, true).await?;
        LedgerService::validate_can_void(transaction_id, header.status.into())?;

        let entries = live_entries(&txn, transaction_id).await?;
        ensure_not_reconciled(&txn, &entries).await?;
        ensure_open(&txn, header.transaction_date).await?;

        let date = header.transaction_date;
        let now = Utc::now().into();
        let mut active: transactions::ActiveModel = header.into();
        active.status = Set(TransactionStatus::Voided);
        active.voided_at = Set(Some(now));
        active.voided_by = Set(Some(voided_by.into_inner()));
        active.void_reason = Set(Some(reason.to_string()));
        active.updated_at = Set(now);
        let voided = active.update(&txn).await?;

        let touched: BTreeSet<Uuid> = entries.iter().map(|e| e.account_id).collect();
        recompute_touched(&txn, &touched, &[date]).await?;
        txn.commit().await?;

        info!(transaction_id = %transaction_id, reason, "Transaction voided");
        Ok(voided.into())
    }

    /// Rewrites a draft or posted transaction's header and entries.
    ///
    /// `as_draft` and `created_by` on the input are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CannotModifyVoided` for voided transactions, `EntryReconciled`
    /// or `PeriodClosed` when a posted transaction is frozen, and every
    /// creation rule error for the new entries.
    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        input: CreateTransactionInput,
    ) -> Result<TransactionWithEntries, TransactionError> {
        let txn = self.db.begin().await?;
        let header = find_live(&txn, transaction_id, true).await?;
        LedgerService::validate_can_modify(transaction_id, header.status.into())?;

        let old_entries = live_entries(&txn, transaction_id).await?;
        let posted = header.status == TransactionStatus::Posted;
        let old_date = header.transaction_date;
        if posted {
            ensure_not_reconciled(&txn, &old_entries).await?;
            ensure_open(&txn, old_date).await?;
            ensure_open(&txn, input.transaction_date).await?;
        }

        let (resolved, amount) = resolve_entries(&txn, &input.entries).await?;
        let mut touched: BTreeSet<Uuid> = old_entries.iter().map(|e| e.account_id).collect();
        touched.extend(resolved.iter().map(|e| e.account_id.into_inner()));
        soft_delete_entries(&txn, old_entries).await?;

        let mut active: transactions::ActiveModel = header.into();
        active.transaction_type = Set(input.transaction_type);
        active.reference = Set(input.reference);
        active.amount_minor = Set(to_minor(amount)?);
        active.currency = Set(input.currency);
        active.description = Set(input.description);
        active.transaction_date = Set(input.transaction_date);
        active.boarding_house_id = Set(input.boarding_house_id);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        write_entries(&txn, &updated, &resolved).await?;
        if posted {
            recompute_touched(&txn, &touched, &[old_date, updated.transaction_date]).await?;
        }
        let entries = live_entries(&txn, transaction_id).await?;
        txn.commit().await?;

        info!(transaction_id = %transaction_id, entries = entries.len(), "Transaction updated");
        Ok(with_entries(updated, entries))
    }

    /// Soft-deletes a transaction and its entries.
    ///
    /// Posted transactions have their balances rebuilt; drafts and voided
    /// transactions never counted towards any.
    ///
    /// # Errors
    ///
    /// Returns `EntryReconciled` or `PeriodClosed` for a frozen posted transaction.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> Result<(), TransactionError> {
        let txn = self.db.begin().await?;
        let header = find_live(&txn, transaction_id, true).await?;
        let entries = live_entries(&txn, transaction_id).await?;
        let posted = header.status == TransactionStatus::Posted;
        if posted {
            ensure_not_reconciled(&txn, &entries).await?;
            ensure_open(&txn, header.transaction_date).await?;
        }

        let date = header.transaction_date;
        let touched: BTreeSet<Uuid> = entries.iter().map(|e| e.account_id).collect();
        soft_delete_entries(&txn, entries).await?;

        let now = Utc::now().into();
        let mut active: transactions::ActiveModel = header.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        if posted {
            recompute_touched(&txn, &touched, &[date]).await?;
        }
        txn.commit().await?;

        info!(transaction_id = %transaction_id, posted, "Transaction deleted");
        Ok(())
    }

    /// Gets a live transaction with its entries.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` for missing or deleted transactions.
    pub async fn get_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<TransactionWithEntries, TransactionError> {
        let header = find_live(&self.db, transaction_id, false).await?;
        let entries = live_entries(&self.db, transaction_id).await?;
        Ok(with_entries(header, entries))
    }

    /// Lists live transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<TransactionHeader>, TransactionError> {
        let page = page.normalized();
        let mut query =
            transactions::Entity::find().filter(transactions::Column::DeletedAt.is_null());

        if let Some(status) = filter.status {
            query = query.filter(transactions::Column::Status.eq(TransactionStatus::from(status)));
        }
        if let Some(tx_type) = filter.transaction_type {
            query = query.filter(transactions::Column::TransactionType.eq(tx_type));
        }
        if let Some(house) = filter.boarding_house_id {
            query = query.filter(transactions::Column::BoardingHouseId.eq(house));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(transactions::Column::TransactionDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(transactions::Column::TransactionDate.lte(date_to));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(
            rows.into_iter().map(Into::into).collect(),
            page.page,
            page.per_page,
            total,
        ))
    }

    /// Builds an account statement with running balances.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub async fn get_account_transactions(
        &self,
        account_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<AccountStatement, TransactionError> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let mut query = journal_entries::Entity::find()
            .find_also_related(transactions::Entity)
            .filter(journal_entries::Column::AccountId.eq(account_id))
            .filter(journal_entries::Column::DeletedAt.is_null())
            .filter(transactions::Column::Status.eq(TransactionStatus::Posted))
            .filter(transactions::Column::DeletedAt.is_null());
        if let Some(to) = to {
            query = query.filter(transactions::Column::TransactionDate.lte(to));
        }
        let rows = query
            .order_by_asc(transactions::Column::TransactionDate)
            .order_by_asc(journal_entries::Column::CreatedAt)
            .order_by_asc(journal_entries::Column::LineNumber)
            .all(&self.db)
            .await?;

        let entries: Vec<StatementEntry> = rows
            .into_iter()
            .filter_map(|(entry, header)| {
                let header = header?;
                Some(StatementEntry {
                    entry_id: entry.id,
                    transaction_id: header.id,
                    date: header.transaction_date,
                    reference: header.reference,
                    description: entry.description.unwrap_or(header.description),
                    entry_type: entry.entry_type.into(),
                    amount: from_minor(entry.amount_minor),
                })
            })
            .collect();

        Ok(build_statement(
            account.account_type.into(),
            &entries,
            from,
            to,
        ))
    }
}

fn entry_input(entry: &journal_entries::Model) -> JournalEntryInput {
    JournalEntryInput {
        account_id: AccountId::from_uuid(entry.account_id),
        entry_type: entry.entry_type.into(),
        amount: from_minor(entry.amount_minor),
        description: entry.description.clone(),
    }
}

fn with_entries(
    header: transactions::Model,
    entries: Vec<journal_entries::Model>,
) -> TransactionWithEntries {
    TransactionWithEntries {
        transaction: header.into(),
        entries: entries.into_iter().map(Into::into).collect(),
    }
}
