//! Transaction management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use lodgebook_core::ledger::{
    CreateTransactionInput, EntryType, JournalEntryInput, TransactionStatus,
};
use lodgebook_db::{TransactionRepository, repositories::TransactionFilter};
use lodgebook_shared::types::{AccountId, PageRequest, UserId};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, AppState, extractors::ActingUser};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route(
            "/transactions/{transaction_id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route("/transactions/{transaction_id}/post", post(post_transaction))
        .route("/transactions/{transaction_id}/void", post(void_transaction))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by status.
    pub status: Option<TransactionStatus>,
    /// Filter by type tag.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Filter by boarding house.
    pub boarding_house_id: Option<Uuid>,
    /// Filter by date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Filter by date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default: 20, max: 100).
    pub per_page: Option<u32>,
}

/// Request body for creating or rewriting a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    /// Free-form type tag.
    #[serde(rename = "type", default = "default_transaction_type")]
    pub transaction_type: String,
    /// Human reference code.
    pub reference: Option<String>,
    /// Description.
    pub description: String,
    /// Transaction date (YYYY-MM-DD).
    pub transaction_date: NaiveDate,
    /// ISO 4217 code; the configured currency when absent.
    pub currency: Option<String>,
    /// Boarding house the movement belongs to.
    pub boarding_house_id: Option<Uuid>,
    /// Keep as draft instead of posting.
    #[serde(default)]
    pub draft: bool,
    /// Journal lines.
    pub entries: Vec<EntryRequest>,
}

fn default_transaction_type() -> String {
    "manual".to_string()
}

/// One journal line in a request.
#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    /// Account ID.
    pub account_id: Uuid,
    /// debit or credit.
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
    /// Line description.
    pub description: Option<String>,
}

/// Request body for voiding a transaction.
#[derive(Debug, Deserialize)]
pub struct VoidRequest {
    /// Why the transaction is voided.
    pub reason: String,
}

impl TransactionRequest {
    fn into_input(self, default_currency: &str, created_by: UserId) -> CreateTransactionInput {
        CreateTransactionInput {
            transaction_type: self.transaction_type,
            reference: self.reference,
            description: self.description,
            transaction_date: self.transaction_date,
            currency: self.currency.unwrap_or_else(|| default_currency.to_string()),
            boarding_house_id: self.boarding_house_id,
            as_draft: self.draft,
            entries: self
                .entries
                .into_iter()
                .map(|e| JournalEntryInput {
                    account_id: AccountId::from_uuid(e.account_id),
                    entry_type: e.entry_type,
                    amount: e.amount,
                    description: e.description,
                })
                .collect(),
            created_by,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/transactions` - List transaction headers, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = TransactionFilter {
        status: query.status,
        transaction_type: query.transaction_type,
        boarding_house_id: query.boarding_house_id,
        date_from: query.from,
        date_to: query.to,
    };
    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    let transactions = TransactionRepository::new((*state.db).clone())
        .list_transactions(filter, page)
        .await?;
    Ok(Json(transactions))
}

/// POST `/transactions` - Create a posted (or draft) transaction.
async fn create_transaction(
    State(state): State<AppState>,
    user: ActingUser,
    Json(payload): Json<TransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = payload.into_input(&state.ledger.currency, user.user_id());
    let created = TransactionRepository::new((*state.db).clone())
        .create_transaction(input)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET `/transactions/{transaction_id}` - Header with entries.
async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction = TransactionRepository::new((*state.db).clone())
        .get_transaction(transaction_id)
        .await?;
    Ok(Json(transaction))
}

/// PUT `/transactions/{transaction_id}` - Rewrite a draft or posted transaction.
async fn update_transaction(
    State(state): State<AppState>,
    user: ActingUser,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<TransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = payload.into_input(&state.ledger.currency, user.user_id());
    let updated = TransactionRepository::new((*state.db).clone())
        .update_transaction(transaction_id, input)
        .await?;
    Ok(Json(updated))
}

/// DELETE `/transactions/{transaction_id}` - Soft delete.
async fn delete_transaction(
    State(state): State<AppState>,
    user: ActingUser,
    Path(transaction_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    TransactionRepository::new((*state.db).clone())
        .delete_transaction(transaction_id)
        .await?;
    info!(transaction_id = %transaction_id, user_id = %user.user_id(), "Transaction deleted via API");
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/transactions/{transaction_id}/post` - Post a draft.
async fn post_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let header = TransactionRepository::new((*state.db).clone())
        .post_transaction(transaction_id)
        .await?;
    Ok(Json(header))
}

/// POST `/transactions/{transaction_id}/void` - Void a posted transaction.
async fn void_transaction(
    State(state): State<AppState>,
    user: ActingUser,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<VoidRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.reason.trim().is_empty() {
        return Err(ApiError::validation("A void reason is required"));
    }

    let header = TransactionRepository::new((*state.db).clone())
        .void_transaction(transaction_id, payload.reason.trim(), user.user_id())
        .await?;
    Ok(Json(header))
}
