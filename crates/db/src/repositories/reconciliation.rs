//! Reconciliation repository: bank statements, snapshots and matching.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use lodgebook_core::{
    ledger::EntryType,
    reconciliation::{
        ConfirmedMatch, DEFAULT_MATCH_WINDOW_DAYS, ItemRef, ItemSource, MatchAction,
        MatchCandidate, MatchProposal, ReconciliationError, ReconciliationService,
        ReconciliationStatus, StatementLineInput, auto_match, book_amount, confidence_pct,
        match_reason,
    },
};
use lodgebook_shared::{
    AppError,
    types::{MoneyError, UserId, from_minor, to_minor},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{
    accounts, bank_statement_items, bank_statements, journal_entries, reconciliation_items,
    reconciliations, sea_orm_active_enums, transactions,
};
use crate::locking::for_update;

/// Error types for reconciliation operations.
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationRepoError {
    /// Reconciliation rule violated.
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// Amount does not fit the persisted range.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReconciliationRepoError> for AppError {
    fn from(err: ReconciliationRepoError) -> Self {
        match err {
            ReconciliationRepoError::Reconciliation(e) => e.into(),
            ReconciliationRepoError::Money(e) => e.into(),
            ReconciliationRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for importing a bank statement.
#[derive(Debug, Clone)]
pub struct ImportStatementInput {
    /// Bank account in the chart of accounts.
    pub account_id: Uuid,
    /// Statement date.
    pub statement_date: NaiveDate,
    /// Opening balance printed on the statement.
    pub opening_balance: Decimal,
    /// Closing balance printed on the statement.
    pub closing_balance: Decimal,
    /// Original file name or bank reference.
    pub file_reference: Option<String>,
    /// Lines in statement order.
    pub lines: Vec<StatementLineInput>,
    /// Importing user.
    pub created_by: UserId,
}

/// Input for starting a reconciliation.
#[derive(Debug, Clone)]
pub struct CreateReconciliationInput {
    /// Bank account being reconciled.
    pub account_id: Uuid,
    /// Cut-off date; book entries after it are left out.
    pub reconciliation_date: NaiveDate,
    /// Balance per books.
    pub book_balance: Decimal,
    /// Balance per bank.
    pub bank_balance: Decimal,
    /// Statement feeding the bank side.
    pub statement_id: Option<Uuid>,
    /// Creating user.
    pub created_by: UserId,
}

/// One imported statement line.
#[derive(Debug, Clone, Serialize)]
pub struct StatementLineView {
    /// Line ID.
    pub id: Uuid,
    /// Order on the statement.
    pub position: i32,
    /// Bank booking date.
    pub bank_date: NaiveDate,
    /// Bank description.
    pub description: String,
    /// Bank reference.
    pub reference: Option<String>,
    /// Money out.
    pub debit_amount: Decimal,
    /// Money in.
    pub credit_amount: Decimal,
    /// Running balance printed by the bank.
    pub balance: Option<Decimal>,
}

impl From<bank_statement_items::Model> for StatementLineView {
    fn from(row: bank_statement_items::Model) -> Self {
        Self {
            id: row.id,
            position: row.position,
            bank_date: row.bank_date,
            description: row.description,
            reference: row.reference,
            debit_amount: from_minor(row.debit_amount_minor),
            credit_amount: from_minor(row.credit_amount_minor),
            balance: row.balance_minor.map(from_minor),
        }
    }
}

/// Imported bank statement with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct BankStatementView {
    /// Statement ID.
    pub id: Uuid,
    /// Bank account.
    pub account_id: Uuid,
    /// Statement date.
    pub statement_date: NaiveDate,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Closing balance.
    pub closing_balance: Decimal,
    /// File reference.
    pub file_reference: Option<String>,
    /// Lines by position.
    pub lines: Vec<StatementLineView>,
}

/// Book or bank item of a reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationItemView {
    /// Item ID.
    pub id: Uuid,
    /// Book or bank.
    pub source: ItemSource,
    /// Snapshotted journal entry.
    pub journal_entry_id: Option<Uuid>,
    /// Snapshotted statement line.
    pub bank_statement_item_id: Option<Uuid>,
    /// Order within its source.
    pub position: i32,
    /// Item date.
    pub item_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Reference.
    pub reference: Option<String>,
    /// Signed amount; money into the account is positive.
    pub amount: Decimal,
    /// Whether the item is matched.
    pub is_reconciled: bool,
    /// Item on the other side.
    pub matched_with: Option<Uuid>,
    /// Confidence in `0.00..=1.00`.
    pub match_confidence: Option<Decimal>,
    /// Why the pair matched.
    pub match_reason: Option<String>,
    /// When the pair was confirmed.
    pub matched_at: Option<DateTime<FixedOffset>>,
    /// Reviewer notes.
    pub notes: Option<String>,
}

impl From<reconciliation_items::Model> for ReconciliationItemView {
    fn from(row: reconciliation_items::Model) -> Self {
        Self {
            id: row.id,
            source: row.source.into(),
            journal_entry_id: row.journal_entry_id,
            bank_statement_item_id: row.bank_statement_item_id,
            position: row.position,
            item_date: row.item_date,
            description: row.description,
            reference: row.reference,
            amount: from_minor(row.amount_minor),
            is_reconciled: row.is_reconciled,
            matched_with: row.matched_with,
            match_confidence: row.match_confidence_pct.map(|pct| Decimal::new(pct.into(), 2)),
            match_reason: row.match_reason,
            matched_at: row.matched_at,
            notes: row.notes,
        }
    }
}

/// Reconciliation with its items, book side first.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationView {
    /// Reconciliation ID.
    pub id: Uuid,
    /// Bank account.
    pub account_id: Uuid,
    /// Cut-off date.
    pub reconciliation_date: NaiveDate,
    /// Statement feeding the bank side.
    pub statement_id: Option<Uuid>,
    /// Balance per books.
    pub book_balance: Decimal,
    /// Balance per bank.
    pub bank_balance: Decimal,
    /// `book - bank`.
    pub difference: Decimal,
    /// Pending until every item is matched.
    pub status: ReconciliationStatus,
    /// Who completed it.
    pub reconciled_by: Option<Uuid>,
    /// When it was completed.
    pub reconciled_at: Option<DateTime<FixedOffset>>,
    /// Items.
    pub items: Vec<ReconciliationItemView>,
}

fn reconciliation_view(
    header: reconciliations::Model,
    items: Vec<reconciliation_items::Model>,
) -> ReconciliationView {
    ReconciliationView {
        id: header.id,
        account_id: header.account_id,
        reconciliation_date: header.reconciliation_date,
        statement_id: header.statement_id,
        book_balance: from_minor(header.book_balance_minor),
        bank_balance: from_minor(header.bank_balance_minor),
        difference: from_minor(header.difference_minor),
        status: header.status.into(),
        reconciled_by: header.reconciled_by,
        reconciled_at: header.reconciled_at,
        items: items.into_iter().map(Into::into).collect(),
    }
}

fn item_ref(row: &reconciliation_items::Model) -> ItemRef {
    ItemRef {
        id: row.id,
        reconciliation_id: row.reconciliation_id,
        source: row.source.into(),
        is_reconciled: row.is_reconciled,
    }
}

fn candidate(row: &reconciliation_items::Model) -> MatchCandidate {
    MatchCandidate {
        id: row.id,
        source: row.source.into(),
        date: row.item_date,
        position: row.position,
        amount: from_minor(row.amount_minor),
        is_reconciled: row.is_reconciled,
    }
}

async fn items_of<C: ConnectionTrait>(
    conn: &C,
    reconciliation_id: Uuid,
) -> Result<Vec<reconciliation_items::Model>, DbErr> {
    reconciliation_items::Entity::find()
        .filter(reconciliation_items::Column::ReconciliationId.eq(reconciliation_id))
        .order_by_desc(reconciliation_items::Column::Source)
        .order_by_asc(reconciliation_items::Column::Position)
        .all(conn)
        .await
}

async fn find_item<C: ConnectionTrait>(
    conn: &C,
    item_id: Uuid,
) -> Result<reconciliation_items::Model, ReconciliationRepoError> {
    reconciliation_items::Entity::find_by_id(item_id)
        .one(conn)
        .await?
        .ok_or_else(|| ReconciliationError::ItemNotFound(item_id).into())
}

async fn mark_matched<C: ConnectionTrait>(
    conn: &C,
    item: reconciliation_items::Model,
    other: Uuid,
    confidence: Option<i32>,
    reason: Option<String>,
    notes: Option<String>,
    now: DateTime<FixedOffset>,
) -> Result<(), DbErr> {
    let mut active: reconciliation_items::ActiveModel = item.into();
    active.is_reconciled = Set(true);
    active.matched_with = Set(Some(other));
    active.match_confidence_pct = Set(confidence);
    active.match_reason = Set(reason);
    active.matched_at = Set(Some(now));
    active.notes = Set(notes);
    active.update(conn).await?;
    Ok(())
}

/// Reconciliation repository.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
    match_window_days: i64,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository with the default match window.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            match_window_days: DEFAULT_MATCH_WINDOW_DAYS,
        }
    }

    /// Overrides how many days a book and bank item may lie apart.
    #[must_use]
    pub const fn with_match_window(mut self, days: i64) -> Self {
        self.match_window_days = days;
        self
    }

    /// Imports a bank statement, keeping line order.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts and `InvalidStatementLine`
    /// for negative amounts or lines without exactly one side set.
    pub async fn import_bank_statement(
        &self,
        input: ImportStatementInput,
    ) -> Result<BankStatementView, ReconciliationRepoError> {
        for (line, item) in input.lines.iter().enumerate() {
            item.validate(line)?;
        }

        let txn = self.db.begin().await?;
        accounts::Entity::find_by_id(input.account_id)
            .filter(accounts::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or(ReconciliationError::AccountNotFound(input.account_id))?;

        let statement = bank_statements::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(input.account_id),
            statement_date: Set(input.statement_date),
            opening_balance_minor: Set(to_minor(input.opening_balance)?),
            closing_balance_minor: Set(to_minor(input.closing_balance)?),
            file_reference: Set(input.file_reference),
            created_by: Set(input.created_by.into_inner()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for (position, line) in (0..).zip(input.lines) {
            let balance_minor = line.balance.map(to_minor).transpose()?;
            let row = bank_statement_items::ActiveModel {
                id: Set(Uuid::now_v7()),
                statement_id: Set(statement.id),
                position: Set(position),
                bank_date: Set(line.bank_date),
                description: Set(line.description),
                reference: Set(line.reference),
                debit_amount_minor: Set(to_minor(line.debit_amount)?),
                credit_amount_minor: Set(to_minor(line.credit_amount)?),
                balance_minor: Set(balance_minor),
            }
            .insert(&txn)
            .await?;
            lines.push(row.into());
        }
        txn.commit().await?;

        info!(
            statement_id = %statement.id,
            account_id = %statement.account_id,
            lines = lines.len(),
            "Bank statement imported"
        );
        Ok(BankStatementView {
            id: statement.id,
            account_id: statement.account_id,
            statement_date: statement.statement_date,
            opening_balance: from_minor(statement.opening_balance_minor),
            closing_balance: from_minor(statement.closing_balance_minor),
            file_reference: statement.file_reference,
            lines,
        })
    }

    /// Starts a reconciliation and snapshots both sides.
    ///
    /// Book items are the account's posted entries dated on or before the
    /// cut-off that no earlier reconciliation has matched.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the account already has a reconciliation on that
    /// date, and `StatementAccountMismatch` for another account's statement.
    pub async fn create_reconciliation(
        &self,
        input: CreateReconciliationInput,
    ) -> Result<ReconciliationView, ReconciliationRepoError> {
        let txn = self.db.begin().await?;
        accounts::Entity::find_by_id(input.account_id)
            .filter(accounts::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or(ReconciliationError::AccountNotFound(input.account_id))?;

        let duplicate = reconciliations::Entity::find()
            .filter(reconciliations::Column::AccountId.eq(input.account_id))
            .filter(reconciliations::Column::ReconciliationDate.eq(input.reconciliation_date))
            .one(&txn)
            .await?;
        if duplicate.is_some() {
            return Err(ReconciliationError::Duplicate {
                account_id: input.account_id,
                date: input.reconciliation_date,
            }
            .into());
        }

        let statement_lines = match input.statement_id {
            Some(statement_id) => {
                let statement = bank_statements::Entity::find_by_id(statement_id)
                    .one(&txn)
                    .await?
                    .ok_or(ReconciliationError::StatementNotFound(statement_id))?;
                if statement.account_id != input.account_id {
                    return Err(ReconciliationError::StatementAccountMismatch {
                        statement_id,
                        account_id: input.account_id,
                    }
                    .into());
                }
                bank_statement_items::Entity::find()
                    .filter(bank_statement_items::Column::StatementId.eq(statement_id))
                    .order_by_asc(bank_statement_items::Column::Position)
                    .all(&txn)
                    .await?
            }
            None => Vec::new(),
        };

        let already_matched: HashSet<Uuid> = reconciliation_items::Entity::find()
            .filter(reconciliation_items::Column::Source.eq(sea_orm_active_enums::ItemSource::Book))
            .filter(reconciliation_items::Column::IsReconciled.eq(true))
            .all(&txn)
            .await?
            .into_iter()
            .filter_map(|item| item.journal_entry_id)
            .collect();

        let book_entries: Vec<_> = journal_entries::Entity::find()
            .find_also_related(transactions::Entity)
            .filter(journal_entries::Column::AccountId.eq(input.account_id))
            .filter(journal_entries::Column::DeletedAt.is_null())
            .filter(transactions::Column::Status.eq(sea_orm_active_enums::TransactionStatus::Posted))
            .filter(transactions::Column::DeletedAt.is_null())
            .filter(transactions::Column::TransactionDate.lte(input.reconciliation_date))
            .order_by_asc(transactions::Column::TransactionDate)
            .order_by_asc(journal_entries::Column::CreatedAt)
            .all(&txn)
            .await?
            .into_iter()
            .filter(|(entry, _)| !already_matched.contains(&entry.id))
            .filter_map(|(entry, header)| header.map(|h| (entry, h)))
            .collect();

        let book_minor = to_minor(input.book_balance)?;
        let bank_minor = to_minor(input.bank_balance)?;
        let difference =
            ReconciliationService::difference(from_minor(book_minor), from_minor(bank_minor));
        let item_count = book_entries.len() + statement_lines.len();
        let status = ReconciliationService::status_for(std::iter::repeat_n(false, item_count));
        let completed = status == ReconciliationStatus::Reconciled;
        let now = Utc::now().into();

        let header = reconciliations::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(input.account_id),
            reconciliation_date: Set(input.reconciliation_date),
            statement_id: Set(input.statement_id),
            book_balance_minor: Set(book_minor),
            bank_balance_minor: Set(bank_minor),
            difference_minor: Set(to_minor(difference)?),
            status: Set(status.into()),
            created_by: Set(input.created_by.into_inner()),
            created_at: Set(now),
            reconciled_by: Set(completed.then(|| input.created_by.into_inner())),
            reconciled_at: Set(completed.then_some(now)),
        }
        .insert(&txn)
        .await?;

        for (position, (entry, parent)) in (0..).zip(book_entries) {
            let entry_type = EntryType::from(entry.entry_type);
            reconciliation_items::ActiveModel {
                id: Set(Uuid::now_v7()),
                reconciliation_id: Set(header.id),
                source: Set(ItemSource::Book.into()),
                journal_entry_id: Set(Some(entry.id)),
                bank_statement_item_id: Set(None),
                position: Set(position),
                item_date: Set(parent.transaction_date),
                description: Set(entry.description.unwrap_or(parent.description)),
                reference: Set(parent.reference),
                amount_minor: Set(to_minor(book_amount(
                    entry_type,
                    from_minor(entry.amount_minor),
                ))?),
                is_reconciled: Set(false),
                matched_with: Set(None),
                match_confidence_pct: Set(None),
                match_reason: Set(None),
                matched_at: Set(None),
                notes: Set(None),
            }
            .insert(&txn)
            .await?;
        }

        for line in statement_lines {
            let amount =
                from_minor(line.credit_amount_minor) - from_minor(line.debit_amount_minor);
            reconciliation_items::ActiveModel {
                id: Set(Uuid::now_v7()),
                reconciliation_id: Set(header.id),
                source: Set(ItemSource::Bank.into()),
                journal_entry_id: Set(None),
                bank_statement_item_id: Set(Some(line.id)),
                position: Set(line.position),
                item_date: Set(line.bank_date),
                description: Set(line.description),
                reference: Set(line.reference),
                amount_minor: Set(to_minor(amount)?),
                is_reconciled: Set(false),
                matched_with: Set(None),
                match_confidence_pct: Set(None),
                match_reason: Set(None),
                matched_at: Set(None),
                notes: Set(None),
            }
            .insert(&txn)
            .await?;
        }

        let items = items_of(&txn, header.id).await?;
        txn.commit().await?;

        info!(
            reconciliation_id = %header.id,
            account_id = %header.account_id,
            items = items.len(),
            difference = %difference,
            "Reconciliation created"
        );
        Ok(reconciliation_view(header, items))
    }

    /// Gets a reconciliation with its items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the reconciliation does not exist.
    pub async fn get_reconciliation(
        &self,
        reconciliation_id: Uuid,
    ) -> Result<ReconciliationView, ReconciliationRepoError> {
        let header = reconciliations::Entity::find_by_id(reconciliation_id)
            .one(&self.db)
            .await?
            .ok_or(ReconciliationError::NotFound(reconciliation_id))?;
        let items = items_of(&self.db, reconciliation_id).await?;
        Ok(reconciliation_view(header, items))
    }

    /// Proposes book/bank pairs without writing anything.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the reconciliation does not exist.
    pub async fn auto_match_transactions(
        &self,
        reconciliation_id: Uuid,
    ) -> Result<Vec<MatchProposal>, ReconciliationRepoError> {
        reconciliations::Entity::find_by_id(reconciliation_id)
            .one(&self.db)
            .await?
            .ok_or(ReconciliationError::NotFound(reconciliation_id))?;

        let candidates: Vec<MatchCandidate> = items_of(&self.db, reconciliation_id)
            .await?
            .iter()
            .map(candidate)
            .collect();
        let proposals = auto_match(&candidates, self.match_window_days);

        info!(
            reconciliation_id = %reconciliation_id,
            candidates = candidates.len(),
            proposals = proposals.len(),
            "Auto-match proposals computed"
        );
        Ok(proposals)
    }

    /// Applies confirmed pairs and refreshes the reconciliation status.
    ///
    /// Pairs touching an already reconciled item are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound`, `ForeignItem` or `WrongSource` for a bad pair;
    /// nothing is written in that case.
    pub async fn update_reconciliation_items(
        &self,
        reconciliation_id: Uuid,
        matches: Vec<ConfirmedMatch>,
        user: UserId,
    ) -> Result<ReconciliationView, ReconciliationRepoError> {
        let txn = self.db.begin().await?;
        let header = for_update(reconciliations::Entity::find_by_id(reconciliation_id), &txn)
            .one(&txn)
            .await?
            .ok_or(ReconciliationError::NotFound(reconciliation_id))?;

        let now: DateTime<FixedOffset> = Utc::now().into();
        let mut applied = 0usize;
        for pair in matches {
            let book = find_item(&txn, pair.book_item_id).await?;
            let bank = find_item(&txn, pair.bank_item_id).await?;
            match ReconciliationService::validate_match(
                reconciliation_id,
                &item_ref(&book),
                &item_ref(&bank),
            )? {
                MatchAction::Skip => {
                    warn!(
                        reconciliation_id = %reconciliation_id,
                        book_item_id = %book.id,
                        bank_item_id = %bank.id,
                        "Item already reconciled, skipping match"
                    );
                }
                MatchAction::Apply => {
                    // Only exact-amount pairs get a confidence and a reason.
                    let days_apart = (book.item_date - bank.item_date).num_days().abs();
                    let exact = book.amount_minor == bank.amount_minor;
                    let confidence = exact.then(|| confidence_pct(days_apart));
                    let reason =
                        exact.then(|| match_reason(from_minor(book.amount_minor), days_apart));
                    let (book_id, bank_id) = (book.id, bank.id);
                    mark_matched(
                        &txn,
                        book,
                        bank_id,
                        confidence,
                        reason.clone(),
                        pair.notes.clone(),
                        now,
                    )
                    .await?;
                    mark_matched(&txn, bank, book_id, confidence, reason, pair.notes, now).await?;
                    applied += 1;
                }
            }
        }

        let items = items_of(&txn, reconciliation_id).await?;
        let status = ReconciliationService::status_for(items.iter().map(|i| i.is_reconciled));
        let was_reconciled =
            ReconciliationStatus::from(header.status) == ReconciliationStatus::Reconciled;

        let mut active: reconciliations::ActiveModel = header.into();
        active.status = Set(status.into());
        if status == ReconciliationStatus::Reconciled && !was_reconciled {
            active.reconciled_by = Set(Some(user.into_inner()));
            active.reconciled_at = Set(Some(now));
        }
        let header = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            reconciliation_id = %reconciliation_id,
            applied,
            status = ?status,
            "Reconciliation items updated"
        );
        Ok(reconciliation_view(header, items))
    }
}
