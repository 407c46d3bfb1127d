//! Petty-cash routes.
//!
//! Every movement is mirrored into the main ledger in the same unit of work,
//! so these handlers only translate the request.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use lodgebook_db::{PettyCashRepository, repositories::MovementMeta};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiError, AppState, extractors::ActingUser, routes::today};

/// Creates the petty-cash routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/petty-cash/accounts", post(open_account))
        .route("/petty-cash/accounts/{account_id}", get(get_account))
        .route("/petty-cash/accounts/{account_id}/transactions", get(list_transactions))
        .route("/petty-cash/accounts/{account_id}/add-cash", post(add_cash))
        .route("/petty-cash/accounts/{account_id}/withdraw", post(withdraw_cash))
        .route("/petty-cash/accounts/{account_id}/expenses", post(add_expense))
        .route("/petty-cash/accounts/{account_id}/student-payments", post(student_payment))
        .route("/petty-cash/accounts/{account_id}/beginning-balance", post(beginning_balance))
}

/// Request body for opening a box.
#[derive(Debug, Deserialize)]
pub struct OpenAccountRequest {
    /// Holder of the box; the acting user when absent.
    pub user_id: Option<Uuid>,
    /// Boarding house the box belongs to.
    pub boarding_house_id: Uuid,
}

/// Request body shared by every movement.
///
/// The counterparty code travels under the name that fits the movement
/// (`source_account_code` for add-cash, `expense_account_code` for expenses...).
#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    /// Positive amount.
    pub amount: Decimal,
    /// Counterparty account code.
    #[serde(
        alias = "source_account_code",
        alias = "destination_account_code",
        alias = "expense_account_code",
        alias = "revenue_account_code",
        alias = "offset_account_code"
    )]
    pub account_code: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Receipt number or similar.
    pub reference: Option<String>,
    /// Movement date; today when absent.
    pub transaction_date: Option<NaiveDate>,
}

impl MovementRequest {
    fn required_code(&self, field: &str) -> Result<String, ApiError> {
        self.account_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::validation(format!("{field} is required")))
    }

    fn meta(&self, user: ActingUser) -> MovementMeta {
        MovementMeta {
            transaction_date: self.transaction_date.unwrap_or_else(today),
            reference: self.reference.clone(),
            created_by: user.user_id(),
        }
    }
}

fn repository(state: &AppState) -> PettyCashRepository {
    PettyCashRepository::new((*state.db).clone(), &state.ledger)
}

/// POST `/petty-cash/accounts` - Get or create the box.
async fn open_account(
    State(state): State<AppState>,
    user: ActingUser,
    Json(payload): Json<OpenAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let holder = payload.user_id.unwrap_or_else(|| user.user_id().into_inner());
    let account = repository(&state)
        .open_account(holder, payload.boarding_house_id)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET `/petty-cash/accounts/{account_id}`
async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let account = repository(&state).get_account(account_id).await?;
    Ok(Json(account))
}

/// GET `/petty-cash/accounts/{account_id}/transactions`
async fn list_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = repository(&state).list_transactions(account_id).await?;
    Ok(Json(json!({ "transactions": history })))
}

/// POST `/petty-cash/accounts/{account_id}/add-cash`
async fn add_cash(
    State(state): State<AppState>,
    user: ActingUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<MovementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = payload.required_code("source_account_code")?;
    let meta = payload.meta(user);
    let recorded = repository(&state)
        .add_cash(account_id, payload.amount, code, payload.description, meta)
        .await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// POST `/petty-cash/accounts/{account_id}/withdraw`
async fn withdraw_cash(
    State(state): State<AppState>,
    user: ActingUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<MovementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = payload.required_code("destination_account_code")?;
    let meta = payload.meta(user);
    let recorded = repository(&state)
        .withdraw_cash(account_id, payload.amount, code, payload.description, meta)
        .await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// POST `/petty-cash/accounts/{account_id}/expenses`
///
/// Without an expense code the configured uncategorized account is used.
async fn add_expense(
    State(state): State<AppState>,
    user: ActingUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<MovementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let meta = payload.meta(user);
    let code = payload.required_code("expense_account_code").ok();
    let recorded = repository(&state)
        .add_expense(account_id, payload.amount, code, payload.description, meta)
        .await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// POST `/petty-cash/accounts/{account_id}/student-payments`
async fn student_payment(
    State(state): State<AppState>,
    user: ActingUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<MovementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = payload.required_code("revenue_account_code")?;
    let meta = payload.meta(user);
    let recorded = repository(&state)
        .record_student_payment(account_id, payload.amount, code, payload.description, meta)
        .await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// POST `/petty-cash/accounts/{account_id}/beginning-balance`
async fn beginning_balance(
    State(state): State<AppState>,
    user: ActingUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<MovementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = payload.required_code("offset_account_code")?;
    let meta = payload.meta(user);
    let recorded = repository(&state)
        .set_beginning_balance(account_id, payload.amount, code, meta)
        .await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::test_support::{amount, create_account, post_transfer, send, test_app};

    #[tokio::test]
    async fn test_petty_cash_flow_over_http() {
        let app = test_app().await;
        create_account(&app, "1010", "Petty Cash", "asset").await;
        let bank = create_account(&app, "1100", "Bank", "asset").await;
        let equity = create_account(&app, "3000", "Equity", "equity").await;
        let misc = create_account(&app, "5999", "Uncategorized", "expense").await;
        post_transfer(&app, "2026-01-01", &bank, &equity, "300.00").await;

        let (status, account) = send(
            &app,
            Method::POST,
            "/api/v1/petty-cash/accounts",
            Some(json!({ "boarding_house_id": "0190c8a8-0000-7000-8000-000000000001" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = account["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/petty-cash/accounts/{id}/add-cash"),
            Some(json!({
                "amount": "500.00",
                "source_account_code": "1100",
                "transaction_date": "2026-01-02"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INSUFFICIENT_FUNDS");

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/petty-cash/accounts/{id}/add-cash"),
            Some(json!({
                "amount": "200.00",
                "source_account_code": "1100",
                "transaction_date": "2026-01-02"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(amount(&body["account"]["current_balance"]), dec!(200));

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/petty-cash/accounts/{id}/expenses"),
            Some(json!({
                "amount": "35.00",
                "description": "soap",
                "transaction_date": "2026-01-03"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(amount(&body["entry"]["balance_after"]), dec!(165));

        let (_, balance) =
            send(&app, Method::GET, &format!("/api/v1/accounts/{misc}/balance"), None).await;
        assert_eq!(amount(&balance["current_balance"]), dec!(35));

        let (_, history) = send(
            &app,
            Method::GET,
            &format!("/api/v1/petty-cash/accounts/{id}/transactions"),
            None,
        )
        .await;
        assert_eq!(history["transactions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_withdraw_needs_destination_code() {
        let app = test_app().await;
        let (_, account) = send(
            &app,
            Method::POST,
            "/api/v1/petty-cash/accounts",
            Some(json!({ "boarding_house_id": "0190c8a8-0000-7000-8000-000000000002" })),
        )
        .await;
        let id = account["id"].as_str().unwrap();

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/petty-cash/accounts/{id}/withdraw"),
            Some(json!({ "amount": "10.00" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation error: destination_account_code is required");
    }
}
