//! Account repository for chart of accounts database operations.

use std::collections::HashMap;

use chrono::Utc;
use lodgebook_core::ledger::{self, AccountInfo, LedgerError, validation::validate_account_code};
use lodgebook_shared::{AppError, types::AccountId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::entities::{accounts, journal_entries};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Ledger rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// No live account carries this code.
    #[error("Account code not found: {0}")]
    CodeNotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Ledger(e) => e.into(),
            AccountError::NotFound(_) | AccountError::CodeNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            AccountError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account code; its leading digit must agree with the type.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: ledger::AccountType,
    /// Category accounts group others and never carry entries.
    pub is_category: bool,
    /// Parent category.
    pub parent_id: Option<Uuid>,
}

/// Account as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    /// Account ID.
    pub id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: ledger::AccountType,
    /// Whether the account is a category.
    pub is_category: bool,
    /// Parent category.
    pub parent_id: Option<Uuid>,
}

impl From<accounts::Model> for AccountView {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            account_type: model.account_type.into(),
            is_category: model.is_category,
            parent_id: model.parent_id,
        }
    }
}

/// Projects an account row onto what the ledger rules need.
pub(crate) fn account_info(model: &accounts::Model) -> AccountInfo {
    AccountInfo {
        id: AccountId::from_uuid(model.id),
        code: model.code.clone(),
        account_type: model.account_type.into(),
        is_category: model.is_category,
        is_deleted: model.deleted_at.is_some(),
    }
}

/// Loads the accounts referenced by a set of entries, keyed by ID.
pub(crate) async fn load_account_infos<C, I>(
    conn: &C,
    ids: I,
) -> Result<HashMap<AccountId, AccountInfo>, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = Uuid>,
{
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let rows = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(ids))
        .all(conn)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (AccountId::from_uuid(row.id), account_info(row)))
        .collect())
}

/// Finds a live account by code.
pub(crate) async fn find_live_by_code<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> Result<Option<accounts::Model>, DbErr> {
    accounts::Entity::find()
        .filter(accounts::Column::Code.eq(code))
        .filter(accounts::Column::DeletedAt.is_null())
        .one(conn)
        .await
}

/// Finds a live account by ID.
pub(crate) async fn find_live_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<accounts::Model>, DbErr> {
    accounts::Entity::find_by_id(id)
        .filter(accounts::Column::DeletedAt.is_null())
        .one(conn)
        .await
}

/// Account repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The code prefix does not match the type (or the code is empty)
    /// - The code already exists
    /// - The parent does not exist or is not a category
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<AccountView, AccountError> {
        let code = input.code.trim().to_string();
        validate_account_code(&code, input.account_type)?;

        let existing = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(&code))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(LedgerError::DuplicateAccountCode(code).into());
        }

        if let Some(parent_id) = input.parent_id {
            let parent = find_live_by_id(&self.db, parent_id).await?;
            if !parent.is_some_and(|p| p.is_category) {
                return Err(LedgerError::InvalidParent(parent_id).into());
            }
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(code),
            name: Set(input.name),
            account_type: Set(input.account_type.into()),
            is_category: Set(input.is_category),
            parent_id: Set(input.parent_id),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        info!(account_id = %account.id, code = %account.code, "Account created");
        Ok(account.into())
    }

    /// Finds a live account by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist or is deleted.
    pub async fn find_by_id(&self, id: Uuid) -> Result<AccountView, AccountError> {
        find_live_by_id(&self.db, id)
            .await?
            .map(Into::into)
            .ok_or(AccountError::NotFound(id))
    }

    /// Finds a live account by code.
    ///
    /// # Errors
    ///
    /// Returns `CodeNotFound` if no live account has the code.
    pub async fn find_by_code(&self, code: &str) -> Result<AccountView, AccountError> {
        find_live_by_code(&self.db, code)
            .await?
            .map(Into::into)
            .ok_or_else(|| AccountError::CodeNotFound(code.to_string()))
    }

    /// Lists live accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self) -> Result<Vec<AccountView>, AccountError> {
        let rows = accounts::Entity::find()
            .filter(accounts::Column::DeletedAt.is_null())
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Soft-deletes an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountInUse` while the account has live children or live
    /// journal entries.
    pub async fn soft_delete_account(&self, id: Uuid) -> Result<(), AccountError> {
        let account = find_live_by_id(&self.db, id)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let children = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(id))
            .filter(accounts::Column::DeletedAt.is_null())
            .count(&self.db)
            .await?;
        let entries = journal_entries::Entity::find()
            .filter(journal_entries::Column::AccountId.eq(id))
            .filter(journal_entries::Column::DeletedAt.is_null())
            .count(&self.db)
            .await?;
        if children > 0 || entries > 0 {
            return Err(LedgerError::AccountInUse(id).into());
        }

        let now = Utc::now().into();
        let mut active: accounts::ActiveModel = account.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        info!(account_id = %id, "Account soft-deleted");
        Ok(())
    }
}
