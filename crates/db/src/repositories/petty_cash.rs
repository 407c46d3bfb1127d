//! Petty-cash repository.
//!
//! Every movement writes the main-ledger transaction, the subledger row and
//! the box totals in one database transaction.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use lodgebook_core::{
    ledger::{CreateTransactionInput, JournalEntryInput},
    petty_cash::{
        CounterpartyRule, LedgerCodes, PettyCashError, PettyCashMovement, PettyCashService,
        PettyCashState, PettyCashTransactionType,
    },
};
use lodgebook_shared::{
    AppError, LedgerConfig,
    types::{AccountId, MoneyError, UserId, from_minor, to_minor},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::account::{account_info, find_live_by_code};
use super::balance::locked_balance;
use super::transaction::{TransactionError, record_transaction};
use crate::entities::{petty_cash_accounts, petty_cash_transactions};
use crate::locking::for_update;

/// Error types for petty-cash operations.
#[derive(Debug, thiserror::Error)]
pub enum PettyCashRepoError {
    /// Petty-cash rule violated.
    #[error(transparent)]
    PettyCash(#[from] PettyCashError),

    /// The mirrored ledger transaction was rejected.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Amount does not fit the persisted range.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<PettyCashRepoError> for AppError {
    fn from(err: PettyCashRepoError) -> Self {
        match err {
            PettyCashRepoError::PettyCash(e) => e.into(),
            PettyCashRepoError::Transaction(e) => e.into(),
            PettyCashRepoError::Money(e) => e.into(),
            PettyCashRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// When and by whom a movement happens.
#[derive(Debug, Clone)]
pub struct MovementMeta {
    /// Date of the movement and its ledger transaction.
    pub transaction_date: NaiveDate,
    /// Receipt number or similar.
    pub reference: Option<String>,
    /// Acting user.
    pub created_by: UserId,
}

/// A petty-cash box with its running totals.
#[derive(Debug, Clone, Serialize)]
pub struct PettyCashAccountView {
    /// Box ID.
    pub id: Uuid,
    /// Custodian.
    pub user_id: Uuid,
    /// Boarding house.
    pub boarding_house_id: Uuid,
    /// Cash in the box.
    pub current_balance: Decimal,
    /// Opening amount.
    pub beginning_balance: Decimal,
    /// Money in, excluding the opening amount.
    pub total_inflows: Decimal,
    /// Money out.
    pub total_outflows: Decimal,
}

impl From<petty_cash_accounts::Model> for PettyCashAccountView {
    fn from(row: petty_cash_accounts::Model) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            boarding_house_id: row.boarding_house_id,
            current_balance: from_minor(row.current_balance_minor),
            beginning_balance: from_minor(row.beginning_balance_minor),
            total_inflows: from_minor(row.total_inflows_minor),
            total_outflows: from_minor(row.total_outflows_minor),
        }
    }
}

/// One subledger row.
#[derive(Debug, Clone, Serialize)]
pub struct PettyCashEntryView {
    /// Row ID.
    pub id: Uuid,
    /// Movement kind.
    pub transaction_type: PettyCashTransactionType,
    /// Positive amount.
    pub amount: Decimal,
    /// Narrative.
    pub description: String,
    /// Receipt number or similar.
    pub reference: Option<String>,
    /// Mirrored main-ledger transaction.
    pub ledger_transaction_id: Option<Uuid>,
    /// Movement date.
    pub transaction_date: NaiveDate,
    /// Box balance after this movement.
    pub balance_after: Decimal,
    /// Acting user.
    pub created_by: Uuid,
    /// Recording time.
    pub created_at: DateTime<FixedOffset>,
}

impl From<petty_cash_transactions::Model> for PettyCashEntryView {
    fn from(row: petty_cash_transactions::Model) -> Self {
        Self {
            id: row.id,
            transaction_type: row.transaction_type.into(),
            amount: from_minor(row.amount_minor),
            description: row.description,
            reference: row.reference,
            ledger_transaction_id: row.ledger_transaction_id,
            transaction_date: row.transaction_date,
            balance_after: from_minor(row.balance_after_minor),
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

/// Result of a recorded movement.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedMovement {
    /// Box after the movement.
    pub account: PettyCashAccountView,
    /// The new subledger row.
    pub entry: PettyCashEntryView,
}

fn state_of(row: &petty_cash_accounts::Model, transaction_count: u64) -> PettyCashState {
    PettyCashState {
        current_balance: from_minor(row.current_balance_minor),
        beginning_balance: from_minor(row.beginning_balance_minor),
        total_inflows: from_minor(row.total_inflows_minor),
        total_outflows: from_minor(row.total_outflows_minor),
        transaction_count,
    }
}

/// Petty-cash repository.
#[derive(Debug, Clone)]
pub struct PettyCashRepository {
    db: DatabaseConnection,
    codes: LedgerCodes,
    currency: String,
}

impl PettyCashRepository {
    /// Creates a new petty-cash repository posting against the configured codes.
    #[must_use]
    pub fn new(db: DatabaseConnection, ledger: &LedgerConfig) -> Self {
        Self {
            db,
            codes: LedgerCodes {
                petty_cash_code: ledger.petty_cash_account_code.clone(),
                uncategorized_expense_code: ledger.uncategorized_expense_code.clone(),
            },
            currency: ledger.currency.clone(),
        }
    }

    /// Returns the box of a user in a boarding house, creating an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn open_account(
        &self,
        user_id: Uuid,
        boarding_house_id: Uuid,
    ) -> Result<PettyCashAccountView, PettyCashRepoError> {
        let txn = self.db.begin().await?;
        let existing = petty_cash_accounts::Entity::find()
            .filter(petty_cash_accounts::Column::UserId.eq(user_id))
            .filter(petty_cash_accounts::Column::BoardingHouseId.eq(boarding_house_id))
            .one(&txn)
            .await?;
        if let Some(account) = existing {
            return Ok(account.into());
        }

        let now = Utc::now().into();
        let account = petty_cash_accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            boarding_house_id: Set(boarding_house_id),
            current_balance_minor: Set(0),
            beginning_balance_minor: Set(0),
            total_inflows_minor: Set(0),
            total_outflows_minor: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(petty_cash_account_id = %account.id, user_id = %user_id, "Petty cash account opened");
        Ok(account.into())
    }

    /// Gets a box.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the box does not exist.
    pub async fn get_account(
        &self,
        account_id: Uuid,
    ) -> Result<PettyCashAccountView, PettyCashRepoError> {
        petty_cash_accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .map(Into::into)
            .ok_or_else(|| PettyCashError::AccountNotFound(account_id).into())
    }

    /// Lists a box's movements in recording order.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the box does not exist.
    pub async fn list_transactions(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<PettyCashEntryView>, PettyCashRepoError> {
        self.get_account(account_id).await?;
        let rows = petty_cash_transactions::Entity::find()
            .filter(petty_cash_transactions::Column::PettyCashAccountId.eq(account_id))
            .order_by_asc(petty_cash_transactions::Column::CreatedAt)
            .order_by_asc(petty_cash_transactions::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Records a movement in both ledgers.
    ///
    /// # Errors
    ///
    /// Returns petty-cash rule errors (amount, funds, counterparty type),
    /// `LedgerAccountNotFound` for unknown codes, and any posting error of
    /// the mirrored transaction.
    pub async fn record_movement(
        &self,
        account_id: Uuid,
        movement: PettyCashMovement,
        meta: MovementMeta,
    ) -> Result<RecordedMovement, PettyCashRepoError> {
        let txn = self.db.begin().await?;
        let account = for_update(petty_cash_accounts::Entity::find_by_id(account_id), &txn)
            .one(&txn)
            .await?
            .ok_or(PettyCashError::AccountNotFound(account_id))?;
        let count = petty_cash_transactions::Entity::find()
            .filter(petty_cash_transactions::Column::PettyCashAccountId.eq(account_id))
            .count(&txn)
            .await?;

        let plan = PettyCashService::plan(movement, &state_of(&account, count), &self.codes)?;

        let petty = find_live_by_code(&txn, &self.codes.petty_cash_code)
            .await?
            .ok_or_else(|| PettyCashError::LedgerAccountNotFound(self.codes.petty_cash_code.clone()))?;
        let counterparty = find_live_by_code(&txn, &plan.counterparty_code)
            .await?
            .ok_or_else(|| PettyCashError::LedgerAccountNotFound(plan.counterparty_code.clone()))?;
        let available = match plan.counterparty_rule {
            CounterpartyRule::FundedAsset => locked_balance(&txn, counterparty.id).await?,
            _ => Decimal::ZERO,
        };
        PettyCashService::check_counterparty(&plan, &account_info(&counterparty), available)?;

        let petty_id = AccountId::from_uuid(petty.id);
        let counterparty_id = AccountId::from_uuid(counterparty.id);
        let entries = if plan.transaction_type.is_inflow() {
            vec![
                JournalEntryInput::debit(petty_id, plan.amount),
                JournalEntryInput::credit(counterparty_id, plan.amount),
            ]
        } else {
            vec![
                JournalEntryInput::debit(counterparty_id, plan.amount),
                JournalEntryInput::credit(petty_id, plan.amount),
            ]
        };

        let ledger_txn = record_transaction(
            &txn,
            CreateTransactionInput {
                transaction_type: format!("petty_cash_{}", plan.transaction_type.as_str()),
                reference: meta.reference.clone(),
                description: plan.description.clone(),
                transaction_date: meta.transaction_date,
                currency: self.currency.clone(),
                boarding_house_id: Some(account.boarding_house_id),
                as_draft: false,
                entries,
                created_by: meta.created_by,
            },
        )
        .await?;

        let state = plan.new_state;
        let entry = petty_cash_transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            petty_cash_account_id: Set(account_id),
            transaction_type: Set(plan.transaction_type.into()),
            amount_minor: Set(to_minor(plan.amount)?),
            description: Set(plan.description),
            reference: Set(meta.reference),
            ledger_transaction_id: Set(Some(ledger_txn.id)),
            transaction_date: Set(meta.transaction_date),
            balance_after_minor: Set(to_minor(state.current_balance)?),
            created_by: Set(meta.created_by.into_inner()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        let mut active: petty_cash_accounts::ActiveModel = account.into();
        active.current_balance_minor = Set(to_minor(state.current_balance)?);
        active.beginning_balance_minor = Set(to_minor(state.beginning_balance)?);
        active.total_inflows_minor = Set(to_minor(state.total_inflows)?);
        active.total_outflows_minor = Set(to_minor(state.total_outflows)?);
        active.updated_at = Set(Utc::now().into());
        let account = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            petty_cash_account_id = %account_id,
            kind = plan.transaction_type.as_str(),
            amount = %entry.amount_minor,
            ledger_transaction_id = %ledger_txn.id,
            "Petty cash movement recorded"
        );
        Ok(RecordedMovement {
            account: account.into(),
            entry: entry.into(),
        })
    }

    /// Moves cash from an asset account into the box.
    ///
    /// # Errors
    ///
    /// See [`Self::record_movement`].
    pub async fn add_cash(
        &self,
        account_id: Uuid,
        amount: Decimal,
        source_account_code: String,
        description: Option<String>,
        meta: MovementMeta,
    ) -> Result<RecordedMovement, PettyCashRepoError> {
        let movement = PettyCashMovement::AddCash {
            amount,
            source_account_code,
            description,
        };
        self.record_movement(account_id, movement, meta).await
    }

    /// Moves cash out of the box into an asset account.
    ///
    /// # Errors
    ///
    /// See [`Self::record_movement`].
    pub async fn withdraw_cash(
        &self,
        account_id: Uuid,
        amount: Decimal,
        destination_account_code: String,
        description: Option<String>,
        meta: MovementMeta,
    ) -> Result<RecordedMovement, PettyCashRepoError> {
        let movement = PettyCashMovement::Withdraw {
            amount,
            destination_account_code,
            description,
        };
        self.record_movement(account_id, movement, meta).await
    }

    /// Pays an expense from the box.
    ///
    /// # Errors
    ///
    /// See [`Self::record_movement`].
    pub async fn add_expense(
        &self,
        account_id: Uuid,
        amount: Decimal,
        expense_account_code: Option<String>,
        description: Option<String>,
        meta: MovementMeta,
    ) -> Result<RecordedMovement, PettyCashRepoError> {
        let movement = PettyCashMovement::Expense {
            amount,
            expense_account_code,
            description,
        };
        self.record_movement(account_id, movement, meta).await
    }

    /// Takes a student's cash payment into the box.
    ///
    /// # Errors
    ///
    /// See [`Self::record_movement`].
    pub async fn record_student_payment(
        &self,
        account_id: Uuid,
        amount: Decimal,
        revenue_account_code: String,
        description: Option<String>,
        meta: MovementMeta,
    ) -> Result<RecordedMovement, PettyCashRepoError> {
        let movement = PettyCashMovement::StudentPayment {
            amount,
            revenue_account_code,
            description,
        };
        self.record_movement(account_id, movement, meta).await
    }

    /// Sets the opening amount of a box that has no movements yet.
    ///
    /// # Errors
    ///
    /// Returns `BeginningBalanceLocked` once the box has any movement.
    pub async fn set_beginning_balance(
        &self,
        account_id: Uuid,
        amount: Decimal,
        offset_account_code: String,
        meta: MovementMeta,
    ) -> Result<RecordedMovement, PettyCashRepoError> {
        let movement = PettyCashMovement::BeginningBalance {
            amount,
            offset_account_code,
            description: None,
        };
        self.record_movement(account_id, movement, meta).await
    }
}
