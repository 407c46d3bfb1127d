//! Bank statement and reconciliation routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use lodgebook_core::reconciliation::{ConfirmedMatch, StatementLineInput};
use lodgebook_db::{
    ReconciliationRepository,
    repositories::{CreateReconciliationInput, ImportStatementInput},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiError, AppState, extractors::ActingUser};

/// Creates the reconciliation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bank-statements", post(import_statement))
        .route("/reconciliations", post(create_reconciliation))
        .route("/reconciliations/{reconciliation_id}", get(get_reconciliation))
        .route("/reconciliations/{reconciliation_id}/auto-match", get(auto_match))
        .route("/reconciliations/{reconciliation_id}/matches", post(confirm_matches))
}

/// Request body for importing a bank statement.
#[derive(Debug, Deserialize)]
pub struct ImportStatementRequest {
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
}

/// Request body for starting a reconciliation.
#[derive(Debug, Deserialize)]
pub struct CreateReconciliationRequest {
    /// Bank account being reconciled.
    pub account_id: Uuid,
    /// Cut-off date.
    pub reconciliation_date: NaiveDate,
    /// Balance per books.
    pub book_balance: Decimal,
    /// Balance per bank.
    pub bank_balance: Decimal,
    /// Statement feeding the bank side.
    pub statement_id: Option<Uuid>,
}

/// Request body for confirming pairs.
#[derive(Debug, Deserialize)]
pub struct ConfirmMatchesRequest {
    /// Book/bank pairs to mark as reconciled.
    pub matches: Vec<ConfirmedMatch>,
}

/// POST `/bank-statements` - Import a statement with its lines.
async fn import_statement(
    State(state): State<AppState>,
    user: ActingUser,
    Json(payload): Json<ImportStatementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let statement = repository(&state)
        .import_bank_statement(ImportStatementInput {
            account_id: payload.account_id,
            statement_date: payload.statement_date,
            opening_balance: payload.opening_balance,
            closing_balance: payload.closing_balance,
            file_reference: payload.file_reference,
            lines: payload.lines,
            created_by: user.user_id(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(statement)))
}

/// POST `/reconciliations` - Snapshot book and bank items.
async fn create_reconciliation(
    State(state): State<AppState>,
    user: ActingUser,
    Json(payload): Json<CreateReconciliationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reconciliation = repository(&state)
        .create_reconciliation(CreateReconciliationInput {
            account_id: payload.account_id,
            reconciliation_date: payload.reconciliation_date,
            book_balance: payload.book_balance,
            bank_balance: payload.bank_balance,
            statement_id: payload.statement_id,
            created_by: user.user_id(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(reconciliation)))
}

/// GET `/reconciliations/{reconciliation_id}` - Header with items.
async fn get_reconciliation(
    State(state): State<AppState>,
    Path(reconciliation_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reconciliation = repository(&state)
        .get_reconciliation(reconciliation_id)
        .await?;
    Ok(Json(reconciliation))
}

/// GET `/reconciliations/{reconciliation_id}/auto-match` - Proposals only.
async fn auto_match(
    State(state): State<AppState>,
    Path(reconciliation_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let proposals = repository(&state)
        .auto_match_transactions(reconciliation_id)
        .await?;
    Ok(Json(json!({ "proposals": proposals })))
}

/// POST `/reconciliations/{reconciliation_id}/matches` - Confirm pairs.
async fn confirm_matches(
    State(state): State<AppState>,
    user: ActingUser,
    Path(reconciliation_id): Path<Uuid>,
    Json(payload): Json<ConfirmMatchesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reconciliation = repository(&state)
        .update_reconciliation_items(reconciliation_id, payload.matches, user.user_id())
        .await?;
    Ok(Json(reconciliation))
}

fn repository(state: &AppState) -> ReconciliationRepository {
    ReconciliationRepository::new((*state.db).clone())
        .with_match_window(state.ledger.match_window_days)
}
