//! Period repository: balance periods, BD/CD rows and period close.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use lodgebook_core::{
    ledger::{self, BalanceTotals, EntryType, LedgerError},
    period::{
        BroughtDownAdjustment, PeriodBalance, PeriodError, PeriodService, PeriodSpan, TrialBalance,
        TrialBalanceLine,
    },
};
use lodgebook_shared::{
    AppError,
    types::{AccountId, MoneyError, PeriodId, UserId, from_minor, to_minor},
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
    account_period_balances, accounts, balance_periods, balance_verifications, journal_entries,
    sea_orm_active_enums::TransactionStatus, transactions,
};
use crate::locking::for_update;

/// Error types for period operations.
#[derive(Debug, thiserror::Error)]
pub enum PeriodRepoError {
    /// Period rule violated.
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// Posting rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Amount does not fit the persisted range.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<PeriodRepoError> for AppError {
    fn from(err: PeriodRepoError) -> Self {
        match err {
            PeriodRepoError::Period(e) => e.into(),
            PeriodRepoError::Ledger(e) => e.into(),
            PeriodRepoError::Money(e) => e.into(),
            PeriodRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Balance period as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodView {
    /// Period ID.
    pub id: Uuid,
    /// Period name.
    pub name: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Whether the period is closed.
    pub is_closed: bool,
    /// Who closed it.
    pub closed_by: Option<Uuid>,
}

impl From<balance_periods::Model> for PeriodView {
    fn from(model: balance_periods::Model) -> Self {
        Self {
            id: model.id,
            name: model.period_name,
            start_date: model.period_start_date,
            end_date: model.period_end_date,
            is_closed: model.is_closed,
            closed_by: model.closed_by,
        }
    }
}

/// One account's row in one period.
#[derive(Debug, Clone, Serialize)]
pub struct AccountPeriodView {
    /// Account ID.
    pub account_id: Uuid,
    /// Period ID.
    pub period_id: Uuid,
    /// Balance brought down.
    pub balance_brought_down: Decimal,
    /// Debits in the period.
    pub total_debits: Decimal,
    /// Credits in the period.
    pub total_credits: Decimal,
    /// Balance carried down.
    pub balance_carried_down: Decimal,
    /// Entries in the period.
    pub transaction_count: i64,
}

impl From<account_period_balances::Model> for AccountPeriodView {
    fn from(row: account_period_balances::Model) -> Self {
        Self {
            account_id: row.account_id,
            period_id: row.period_id,
            balance_brought_down: from_minor(row.balance_brought_down_minor),
            total_debits: from_minor(row.total_debits_minor),
            total_credits: from_minor(row.total_credits_minor),
            balance_carried_down: from_minor(row.balance_carried_down_minor),
            transaction_count: row.transaction_count,
        }
    }
}

/// Audit record of a manual BD change.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationView {
    /// Verification ID.
    pub id: Uuid,
    /// Account ID.
    pub account_id: Uuid,
    /// Period ID.
    pub period_id: Uuid,
    /// BD before.
    pub previous_balance: Decimal,
    /// BD after.
    pub new_balance: Decimal,
    /// Difference.
    pub adjustment_amount: Decimal,
    /// Reason given.
    pub reason: Option<String>,
    /// Verifier.
    pub verified_by: Uuid,
}

impl From<balance_verifications::Model> for VerificationView {
    fn from(row: balance_verifications::Model) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            period_id: row.period_id,
            previous_balance: from_minor(row.previous_balance_minor),
            new_balance: from_minor(row.new_balance_minor),
            adjustment_amount: from_minor(row.adjustment_amount_minor),
            reason: row.reason,
            verified_by: row.verified_by,
        }
    }
}

/// Input for a manual BD change.
#[derive(Debug, Clone)]
pub struct SetBroughtDownInput {
    /// Account ID.
    pub account_id: Uuid,
    /// Period ID.
    pub period_id: Uuid,
    /// New balance brought down.
    pub new_balance: Decimal,
    /// Why it changed.
    pub notes: Option<String>,
    /// Who verified it.
    pub verified_by: UserId,
}

fn span(model: &balance_periods::Model) -> PeriodSpan {
    PeriodSpan {
        id: PeriodId::from_uuid(model.id),
        name: model.period_name.clone(),
        start_date: model.period_start_date,
        end_date: model.period_end_date,
        is_closed: model.is_closed,
    }
}

fn period_balance(
    row: &account_period_balances::Model,
    account_type: ledger::AccountType,
) -> PeriodBalance {
    PeriodBalance {
        account_id: AccountId::from_uuid(row.account_id),
        account_type,
        brought_down: from_minor(row.balance_brought_down_minor),
        total_debits: from_minor(row.total_debits_minor),
        total_credits: from_minor(row.total_credits_minor),
        transaction_count: row.transaction_count,
    }
}

async fn all_spans<C: ConnectionTrait>(conn: &C) -> Result<Vec<PeriodSpan>, DbErr> {
    let rows = balance_periods::Entity::find()
        .order_by_asc(balance_periods::Column::PeriodStartDate)
        .all(conn)
        .await?;
    Ok(rows.iter().map(span).collect())
}

async fn covering_period<C: ConnectionTrait>(
    conn: &C,
    date: NaiveDate,
) -> Result<Option<balance_periods::Model>, DbErr> {
    balance_periods::Entity::find()
        .filter(balance_periods::Column::PeriodStartDate.lte(date))
        .filter(balance_periods::Column::PeriodEndDate.gte(date))
        .one(conn)
        .await
}

async fn account_type_of<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
) -> Result<ledger::AccountType, PeriodRepoError> {
    accounts::Entity::find_by_id(account_id)
        .one(conn)
        .await?
        .map(|a| a.account_type.into())
        .ok_or_else(|| PeriodError::AccountNotFound(account_id).into())
}

async fn find_row<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    period_id: Uuid,
) -> Result<Option<account_period_balances::Model>, DbErr> {
    let select = account_period_balances::Entity::find()
        .filter(account_period_balances::Column::AccountId.eq(account_id))
        .filter(account_period_balances::Column::PeriodId.eq(period_id));
    for_update(select, conn).one(conn).await
}

/// BD for a row created lazily: the preceding closed period's CD, else zero.
async fn initial_brought_down<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    period: &balance_periods::Model,
) -> Result<Decimal, DbErr> {
    let Some(previous_end) = period.period_start_date.pred_opt() else {
        return Ok(Decimal::ZERO);
    };
    let previous = balance_periods::Entity::find()
        .filter(balance_periods::Column::PeriodEndDate.eq(previous_end))
        .filter(balance_periods::Column::IsClosed.eq(true))
        .one(conn)
        .await?;
    let Some(previous) = previous else {
        return Ok(Decimal::ZERO);
    };

    Ok(account_period_balances::Entity::find()
        .filter(account_period_balances::Column::AccountId.eq(account_id))
        .filter(account_period_balances::Column::PeriodId.eq(previous.id))
        .one(conn)
        .await?
        .map_or(Decimal::ZERO, |row| from_minor(row.balance_carried_down_minor)))
}

/// Writes a period row, inserting it when `existing` is `None`.
async fn save_row<C: ConnectionTrait>(
    conn: &C,
    existing: Option<account_period_balances::Model>,
    period_id: Uuid,
    balance: &PeriodBalance,
) -> Result<account_period_balances::Model, PeriodRepoError> {
    let row = account_period_balances::ActiveModel {
        id: Set(existing.as_ref().map_or_else(Uuid::now_v7, |r| r.id)),
        account_id: Set(balance.account_id.into_inner()),
        period_id: Set(period_id),
        balance_brought_down_minor: Set(to_minor(balance.brought_down)?),
        total_debits_minor: Set(to_minor(balance.total_debits)?),
        total_credits_minor: Set(to_minor(balance.total_credits)?),
        balance_carried_down_minor: Set(to_minor(balance.carried_down())?),
        transaction_count: Set(balance.transaction_count),
        updated_at: Set(Utc::now().into()),
    };
    let saved = if existing.is_some() {
        row.update(conn).await?
    } else {
        row.insert(conn).await?
    };
    Ok(saved)
}

/// Debits and credits of posted entries for an account inside a date range.
async fn period_activity<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BalanceTotals, DbErr> {
    let rows = journal_entries::Entity::find()
        .find_also_related(transactions::Entity)
        .filter(journal_entries::Column::AccountId.eq(account_id))
        .filter(journal_entries::Column::DeletedAt.is_null())
        .filter(transactions::Column::Status.eq(TransactionStatus::Posted))
        .filter(transactions::Column::DeletedAt.is_null())
        .filter(transactions::Column::TransactionDate.gte(start))
        .filter(transactions::Column::TransactionDate.lte(end))
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

/// Rejects a posting date that falls inside a closed period.
pub(crate) async fn ensure_open<C: ConnectionTrait>(
    conn: &C,
    date: NaiveDate,
) -> Result<(), PeriodRepoError> {
    if let Some(period) = covering_period(conn, date).await? {
        if period.is_closed {
            return Err(LedgerError::PeriodClosed {
                name: period.period_name,
                date,
            }
            .into());
        }
    }
    Ok(())
}

/// Adds one posted entry to the period row covering its date.
///
/// Dates outside every period are skipped with a warning.
pub(crate) async fn accumulate_entry<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    account_type: ledger::AccountType,
    entry_type: EntryType,
    amount: Decimal,
    date: NaiveDate,
) -> Result<(), PeriodRepoError> {
    let Some(period) = covering_period(conn, date).await? else {
        warn!(account_id = %account_id, %date, "No balance period covers entry date, skipping period accumulation");
        return Ok(());
    };
    if period.is_closed {
        return Err(LedgerError::PeriodClosed {
            name: period.period_name,
            date,
        }
        .into());
    }

    let existing = find_row(conn, account_id, period.id).await?;
    let mut balance = match &existing {
        Some(row) => period_balance(row, account_type),
        None => PeriodBalance {
            account_id: AccountId::from_uuid(account_id),
            account_type,
            brought_down: initial_brought_down(conn, account_id, &period).await?,
            total_debits: Decimal::ZERO,
            total_credits: Decimal::ZERO,
            transaction_count: 0,
        },
    };
    match entry_type {
        EntryType::Debit => balance.total_debits += amount,
        EntryType::Credit => balance.total_credits += amount,
    }
    balance.transaction_count += 1;

    save_row(conn, existing, period.id, &balance).await?;
    Ok(())
}

/// Rebuilds the period rows covering `dates` for every given account from
/// posted entries, keeping each row's BD.
pub(crate) async fn recompute_period_rows<C: ConnectionTrait>(
    conn: &C,
    account_ids: &[Uuid],
    dates: &[NaiveDate],
) -> Result<(), PeriodRepoError> {
    let mut periods: Vec<balance_periods::Model> = Vec::new();
    for date in dates {
        let Some(period) = covering_period(conn, *date).await? else {
            continue;
        };
        if period.is_closed {
            return Err(LedgerError::PeriodClosed {
                name: period.period_name,
                date: *date,
            }
            .into());
        }
        if !periods.iter().any(|p| p.id == period.id) {
            periods.push(period);
        }
    }

    let accounts: BTreeSet<Uuid> = account_ids.iter().copied().collect();
    for period in &periods {
        for account_id in &accounts {
            let account_type = account_type_of(conn, *account_id).await?;
            let existing = find_row(conn, *account_id, period.id).await?;
            let activity = period_activity(
                conn,
                *account_id,
                period.period_start_date,
                period.period_end_date,
            )
            .await?;
            if existing.is_none() && activity.transaction_count == 0 {
                continue;
            }
            let brought_down = match &existing {
                Some(row) => from_minor(row.balance_brought_down_minor),
                None => initial_brought_down(conn, *account_id, period).await?,
            };
            let balance = PeriodService::rebuild_balance(
                AccountId::from_uuid(*account_id),
                account_type,
                brought_down,
                &activity,
            );
            save_row(conn, existing, period.id, &balance).await?;
        }
    }
    Ok(())
}

/// Period repository.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    db: DatabaseConnection,
}

impl PeriodRepository {
    /// Creates a new period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a period directly after the latest existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is reversed, overlaps, or leaves a gap.
    pub async fn create_period(
        &self,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PeriodView, PeriodRepoError> {
        let txn = self.db.begin().await?;
        let existing = all_spans(&txn).await?;
        PeriodService::validate_new_period(start_date, end_date, &existing)?;

        let period = balance_periods::ActiveModel {
            id: Set(Uuid::now_v7()),
            period_name: Set(name.to_string()),
            period_start_date: Set(start_date),
            period_end_date: Set(end_date),
            is_closed: Set(false),
            closed_at: Set(None),
            closed_by: Set(None),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(period_id = %period.id, name = %period.period_name, "Balance period created");
        Ok(period.into())
    }

    /// Lists periods ordered by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_periods(&self) -> Result<Vec<PeriodView>, PeriodRepoError> {
        let rows = balance_periods::Entity::find()
            .order_by_asc(balance_periods::Column::PeriodStartDate)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Gets a period.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the period does not exist.
    pub async fn get_period(&self, period_id: Uuid) -> Result<PeriodView, PeriodRepoError> {
        balance_periods::Entity::find_by_id(period_id)
            .one(&self.db)
            .await?
            .map(Into::into)
            .ok_or_else(|| PeriodError::NotFound(period_id).into())
    }

    /// Explicitly opens an account in a period with a given BD.
    ///
    /// # Errors
    ///
    /// Returns `BalanceExists` if the account already has a row there.
    pub async fn open_account_period(
        &self,
        account_id: Uuid,
        period_id: Uuid,
        brought_down: Decimal,
    ) -> Result<AccountPeriodView, PeriodRepoError> {
        let txn = self.db.begin().await?;
        balance_periods::Entity::find_by_id(period_id)
            .one(&txn)
            .await?
            .ok_or(PeriodError::NotFound(period_id))?;
        let account_type = account_type_of(&txn, account_id).await?;

        if find_row(&txn, account_id, period_id).await?.is_some() {
            return Err(PeriodError::BalanceExists {
                account_id,
                period_id,
            }
            .into());
        }

        let balance = PeriodBalance {
            account_id: AccountId::from_uuid(account_id),
            account_type,
            brought_down,
            total_debits: Decimal::ZERO,
            total_credits: Decimal::ZERO,
            transaction_count: 0,
        };
        let row = save_row(&txn, None, period_id, &balance).await?;
        txn.commit().await?;

        info!(account_id = %account_id, period_id = %period_id, bd = %brought_down, "Account opened in period");
        Ok(row.into())
    }

    /// Gets one account's row in a period.
    ///
    /// # Errors
    ///
    /// Returns `BalanceNotFound` if the row does not exist.
    pub async fn get_account_period(
        &self,
        account_id: Uuid,
        period_id: Uuid,
    ) -> Result<AccountPeriodView, PeriodRepoError> {
        account_period_balances::Entity::find()
            .filter(account_period_balances::Column::AccountId.eq(account_id))
            .filter(account_period_balances::Column::PeriodId.eq(period_id))
            .one(&self.db)
            .await?
            .map(Into::into)
            .ok_or_else(|| {
                PeriodError::BalanceNotFound {
                    account_id,
                    period_id,
                }
                .into()
            })
    }

    /// Builds the trial balance of a period from its rows.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the period does not exist.
    pub async fn get_trial_balance(&self, period_id: Uuid) -> Result<TrialBalance, PeriodRepoError> {
        let period = balance_periods::Entity::find_by_id(period_id)
            .one(&self.db)
            .await?
            .ok_or(PeriodError::NotFound(period_id))?;

        let rows = account_period_balances::Entity::find()
            .filter(account_period_balances::Column::PeriodId.eq(period_id))
            .all(&self.db)
            .await?;
        let infos = accounts::Entity::find()
            .filter(
                accounts::Column::Id.is_in(rows.iter().map(|r| r.account_id).collect::<Vec<_>>()),
            )
            .all(&self.db)
            .await?;

        let lines = rows
            .iter()
            .filter_map(|row| {
                let account = infos.iter().find(|a| a.id == row.account_id)?;
                Some(TrialBalanceLine {
                    account_id: AccountId::from_uuid(row.account_id),
                    code: account.code.clone(),
                    name: account.name.clone(),
                    account_type: account.account_type.into(),
                    brought_down: from_minor(row.balance_brought_down_minor),
                    total_debits: from_minor(row.total_debits_minor),
                    total_credits: from_minor(row.total_credits_minor),
                    carried_down: from_minor(row.balance_carried_down_minor),
                })
            })
            .collect();

        Ok(PeriodService::build_trial_balance(&span(&period), lines))
    }

    /// Replaces an account's BD in a period and logs the change.
    ///
    /// Allowed in closed periods; later periods are not touched.
    ///
    /// # Errors
    ///
    /// Returns `BalanceNotFound` if the account has no row in the period.
    pub async fn set_balance_brought_down(
        &self,
        input: SetBroughtDownInput,
    ) -> Result<(AccountPeriodView, BroughtDownAdjustment), PeriodRepoError> {
        let txn = self.db.begin().await?;
        let account_type = account_type_of(&txn, input.account_id).await?;
        let existing = find_row(&txn, input.account_id, input.period_id)
            .await?
            .ok_or(PeriodError::BalanceNotFound {
                account_id: input.account_id,
                period_id: input.period_id,
            })?;

        let current = period_balance(&existing, account_type);
        let (updated, adjustment) = PeriodService::adjust_brought_down(&current, input.new_balance);
        let row = save_row(&txn, Some(existing), input.period_id, &updated).await?;

        balance_verifications::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(input.account_id),
            period_id: Set(input.period_id),
            previous_balance_minor: Set(to_minor(adjustment.previous_balance)?),
            new_balance_minor: Set(to_minor(adjustment.new_balance)?),
            adjustment_amount_minor: Set(to_minor(adjustment.adjustment_amount)?),
            reason: Set(input.notes),
            verified_by: Set(input.verified_by.into_inner()),
            verified_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(
            account_id = %input.account_id,
            period_id = %input.period_id,
            previous = %adjustment.previous_balance,
            new = %adjustment.new_balance,
            "Balance brought down adjusted"
        );
        Ok((row.into(), adjustment))
    }

    /// Lists the BD adjustments of an account in a period, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_verifications(
        &self,
        account_id: Uuid,
        period_id: Uuid,
    ) -> Result<Vec<VerificationView>, PeriodRepoError> {
        let rows = balance_verifications::Entity::find()
            .filter(balance_verifications::Column::AccountId.eq(account_id))
            .filter(balance_verifications::Column::PeriodId.eq(period_id))
            .order_by_asc(balance_verifications::Column::VerifiedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Closes a period and carries every CD into the next period's BD.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClosed` for closed periods and `NoSubsequentPeriod`
    /// when no period starts the day after this one ends.
    pub async fn close_period(
        &self,
        period_id: Uuid,
        closed_by: UserId,
    ) -> Result<PeriodView, PeriodRepoError> {
        let txn = self.db.begin().await?;
        let period = for_update(balance_periods::Entity::find_by_id(period_id), &txn)
            .one(&txn)
            .await?
            .ok_or(PeriodError::NotFound(period_id))?;

        let spans = all_spans(&txn).await?;
        let next_id = PeriodService::check_can_close(&span(&period), &spans)?
            .id
            .into_inner();
        let next = balance_periods::Entity::find_by_id(next_id)
            .one(&txn)
            .await?
            .ok_or(PeriodError::NotFound(next_id))?;

        // Every postable account gets a row, plus any account already holding one.
        let live = accounts::Entity::find()
            .filter(accounts::Column::DeletedAt.is_null())
            .filter(accounts::Column::IsCategory.eq(false))
            .all(&txn)
            .await?;
        let existing_rows = account_period_balances::Entity::find()
            .filter(account_period_balances::Column::PeriodId.eq(period.id))
            .all(&txn)
            .await?;
        let mut account_ids: BTreeSet<Uuid> = live.iter().map(|a| a.id).collect();
        account_ids.extend(existing_rows.iter().map(|r| r.account_id));

        let mut balances = Vec::with_capacity(account_ids.len());
        for account_id in &account_ids {
            let account_type = account_type_of(&txn, *account_id).await?;
            let brought_down = match existing_rows.iter().find(|r| r.account_id == *account_id) {
                Some(row) => from_minor(row.balance_brought_down_minor),
                None => initial_brought_down(&txn, *account_id, &period).await?,
            };
            let activity = period_activity(
                &txn,
                *account_id,
                period.period_start_date,
                period.period_end_date,
            )
            .await?;
            balances.push(PeriodService::rebuild_balance(
                AccountId::from_uuid(*account_id),
                account_type,
                brought_down,
                &activity,
            ));
        }

        let plan = PeriodService::plan_close(balances);
        for line in &plan.closing {
            let account_id = line.balance.account_id.into_inner();
            let existing = find_row(&txn, account_id, period.id).await?;
            save_row(&txn, existing, period.id, &line.balance).await?;
        }

        for (account_id, account_type, carried_down) in plan.carry_forward() {
            let existing = find_row(&txn, account_id.into_inner(), next.id).await?;
            let next_balance = match &existing {
                Some(row) => PeriodBalance {
                    brought_down: carried_down,
                    ..period_balance(row, account_type)
                },
                None => PeriodBalance {
                    account_id,
                    account_type,
                    brought_down: carried_down,
                    total_debits: Decimal::ZERO,
                    total_credits: Decimal::ZERO,
                    transaction_count: 0,
                },
            };
            save_row(&txn, existing, next.id, &next_balance).await?;
        }

        let now = Utc::now().into();
        let mut active: balance_periods::ActiveModel = period.into();
        active.is_closed = Set(true);
        active.closed_at = Set(Some(now));
        active.closed_by = Set(Some(closed_by.into_inner()));
        let closed = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            period_id = %closed.id,
            next_period_id = %next.id,
            accounts = plan.closing.len(),
            "Balance period closed"
        );
        Ok(closed.into())
    }
}


#[cfg(test)]
mod tests {
    use sea_orm::{ConnectOptions, Database};

    use super::*;
    use crate::migration::{Migrator, MigratorTrait};

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_recompute_in_closed_period_reports_posting_date() {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let periods = PeriodRepository::new(db.clone());
        let january = periods.create_period("2026-01", day(1, 1), day(1, 31)).await.unwrap();
        periods.create_period("2026-02", day(2, 1), day(2, 28)).await.unwrap();
        periods.close_period(january.id, UserId::new()).await.unwrap();

        let err = recompute_period_rows(&db, &[], &[day(2, 10), day(1, 20)])
            .await
            .unwrap_err();
        match err {
            PeriodRepoError::Ledger(LedgerError::PeriodClosed { name, date }) => {
                assert_eq!(name, "2026-01");
                assert_eq!(date, day(1, 20));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
