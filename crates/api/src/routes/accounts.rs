//! Chart of accounts and balance routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use lodgebook_core::ledger::AccountType;
use lodgebook_db::{
    AccountRepository, BalanceRepository, TransactionRepository, repositories::CreateAccountInput,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, AppState};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{account_id}", get(get_account).delete(delete_account))
        .route("/accounts/{account_id}/balance", get(get_balance))
        .route("/accounts/{account_id}/balance/recompute", post(recompute_balance))
        .route("/accounts/{account_id}/balance/verify", get(verify_balance))
        .route("/accounts/{account_id}/transactions", get(account_transactions))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Account code; the leading digit must agree with the type.
    pub code: String,
    /// Account name.
    pub name: String,
    /// asset, liability, equity, revenue or expense.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Category accounts group others and never carry entries.
    #[serde(default)]
    pub is_category: bool,
    /// Parent category.
    pub parent_id: Option<Uuid>,
}

/// Date window for an account statement.
#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    /// Start date (inclusive, YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// End date (inclusive, YYYY-MM-DD).
    pub to: Option<NaiveDate>,
}

/// GET `/accounts` - List live accounts ordered by code.
async fn list_accounts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let accounts = AccountRepository::new((*state.db).clone())
        .list_accounts()
        .await?;
    Ok(Json(json!({ "accounts": accounts })))
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = AccountRepository::new((*state.db).clone())
        .create_account(CreateAccountInput {
            code: payload.code,
            name: payload.name,
            account_type: payload.account_type,
            is_category: payload.is_category,
            parent_id: payload.parent_id,
        })
        .await?;

    info!(account_id = %account.id, code = %account.code, "Account created");
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET `/accounts/{account_id}`
async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let account = AccountRepository::new((*state.db).clone())
        .find_by_id(account_id)
        .await?;
    Ok(Json(account))
}

/// DELETE `/accounts/{account_id}` - Soft delete an unused account.
async fn delete_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    AccountRepository::new((*state.db).clone())
        .soft_delete_account(account_id)
        .await?;
    info!(account_id = %account_id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/accounts/{account_id}/balance` - Materialized current balance.
async fn get_balance(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let balance = BalanceRepository::new((*state.db).clone())
        .get_balance(account_id)
        .await?;
    Ok(Json(balance))
}

/// POST `/accounts/{account_id}/balance/recompute` - Rebuild from the journal.
async fn recompute_balance(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let balance = BalanceRepository::new((*state.db).clone())
        .recompute_account(account_id)
        .await?;
    Ok(Json(balance))
}

/// GET `/accounts/{account_id}/balance/verify` - Compare cache and journal.
async fn verify_balance(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let check = BalanceRepository::new((*state.db).clone())
        .verify_account(account_id)
        .await?;
    Ok(Json(check))
}

/// GET `/accounts/{account_id}/transactions?from&to` - Statement with running balance.
async fn account_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Query(query): Query<StatementQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(ApiError::validation("from must not be after to"));
        }
    }

    let statement = TransactionRepository::new((*state.db).clone())
        .get_account_transactions(account_id, query.from, query.to)
        .await?;
    Ok(Json(statement))
}
