//! Balance period routes: BD/CD rows, trial balance and period close.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use lodgebook_db::{PeriodRepository, repositories::SetBroughtDownInput};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiError, AppState, extractors::ActingUser};

/// Creates the period routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/periods", get(list_periods).post(create_period))
        .route("/periods/{period_id}", get(get_period))
        .route("/periods/{period_id}/close", post(close_period))
        .route("/periods/{period_id}/trial-balance", get(trial_balance))
        .route("/periods/{period_id}/accounts", post(open_account_period))
        .route("/periods/{period_id}/accounts/{account_id}", get(get_account_period))
        .route(
            "/periods/{period_id}/accounts/{account_id}/brought-down",
            put(set_brought_down),
        )
        .route(
            "/periods/{period_id}/accounts/{account_id}/verifications",
            get(list_verifications),
        )
}

/// Request body for creating a period.
#[derive(Debug, Deserialize)]
pub struct CreatePeriodRequest {
    /// Display name, e.g. "2026-01".
    pub name: String,
    /// First day (inclusive).
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
}

/// Request body for explicitly opening an account in a period.
#[derive(Debug, Deserialize)]
pub struct OpenAccountPeriodRequest {
    /// Account to open.
    pub account_id: Uuid,
    /// Opening balance brought down.
    #[serde(default)]
    pub balance_brought_down: Decimal,
}

/// Request body for a manual BD change.
#[derive(Debug, Deserialize)]
pub struct BroughtDownRequest {
    /// New balance brought down.
    pub balance: Decimal,
    /// Why the balance changes; kept on the verification log.
    pub notes: Option<String>,
}

/// GET `/periods`
async fn list_periods(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let periods = PeriodRepository::new((*state.db).clone())
        .list_periods()
        .await?;
    Ok(Json(json!({ "periods": periods })))
}

/// POST `/periods` - Append a contiguous period.
async fn create_period(
    State(state): State<AppState>,
    Json(payload): Json<CreatePeriodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let period = PeriodRepository::new((*state.db).clone())
        .create_period(payload.name.trim(), payload.start_date, payload.end_date)
        .await?;
    Ok((StatusCode::CREATED, Json(period)))
}

/// GET `/periods/{period_id}`
async fn get_period(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let period = PeriodRepository::new((*state.db).clone())
        .get_period(period_id)
        .await?;
    Ok(Json(period))
}

/// POST `/periods/{period_id}/close` - Close and carry every CD forward.
async fn close_period(
    State(state): State<AppState>,
    user: ActingUser,
    Path(period_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let period = PeriodRepository::new((*state.db).clone())
        .close_period(period_id, user.user_id())
        .await?;
    Ok(Json(period))
}

/// GET `/periods/{period_id}/trial-balance`
async fn trial_balance(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let trial = PeriodRepository::new((*state.db).clone())
        .get_trial_balance(period_id)
        .await?;
    Ok(Json(trial))
}

/// POST `/periods/{period_id}/accounts` - Open an account row with a BD.
async fn open_account_period(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
    Json(payload): Json<OpenAccountPeriodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = PeriodRepository::new((*state.db).clone())
        .open_account_period(payload.account_id, period_id, payload.balance_brought_down)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET `/periods/{period_id}/accounts/{account_id}`
async fn get_account_period(
    State(state): State<AppState>,
    Path((period_id, account_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let row = PeriodRepository::new((*state.db).clone())
        .get_account_period(account_id, period_id)
        .await?;
    Ok(Json(row))
}

/// PUT `/periods/{period_id}/accounts/{account_id}/brought-down`
async fn set_brought_down(
    State(state): State<AppState>,
    user: ActingUser,
    Path((period_id, account_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<BroughtDownRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (row, adjustment) = PeriodRepository::new((*state.db).clone())
        .set_balance_brought_down(SetBroughtDownInput {
            account_id,
            period_id,
            new_balance: payload.balance,
            notes: payload.notes,
            verified_by: user.user_id(),
        })
        .await?;
    Ok(Json(json!({ "balance": row, "adjustment": adjustment })))
}

/// GET `/periods/{period_id}/accounts/{account_id}/verifications`
async fn list_verifications(
    State(state): State<AppState>,
    Path((period_id, account_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let log = PeriodRepository::new((*state.db).clone())
        .list_verifications(account_id, period_id)
        .await?;
    Ok(Json(json!({ "verifications": log })))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};

    use crate::test_support::{amount, create_account, post_transfer, send, test_app};

    async fn create_period(app: &axum::Router, name: &str, start: &str, end: &str) -> Value {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/v1/periods",
            Some(json!({ "name": name, "start_date": start, "end_date": end })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    #[tokio::test]
    async fn test_close_carries_balances_and_blocks_postings() {
        let app = test_app().await;
        let bank = create_account(&app, "1100", "Bank", "asset").await;
        let rent = create_account(&app, "4100", "Rent", "revenue").await;
        let january = create_period(&app, "2026-01", "2026-01-01", "2026-01-31").await;
        let february = create_period(&app, "2026-02", "2026-02-01", "2026-02-28").await;
        let (jan, feb) = (january["id"].as_str().unwrap(), february["id"].as_str().unwrap());

        post_transfer(&app, "2026-01-10", &bank, &rent, "400.00").await;

        let (status, trial) =
            send(&app, Method::GET, &format!("/api/v1/periods/{jan}/trial-balance"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(trial["is_balanced"], true);

        let (status, closed) =
            send(&app, Method::POST, &format!("/api/v1/periods/{jan}/close"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(closed["is_closed"], true);

        let (status, carried) = send(
            &app,
            Method::GET,
            &format!("/api/v1/periods/{feb}/accounts/{bank}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(amount(&carried["balance_brought_down"]), dec!(400));

        let (status, body) = post_transfer(&app, "2026-01-20", &bank, &rent, "10.00").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        let (status, _) =
            send(&app, Method::POST, &format!("/api/v1/periods/{jan}/close"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_brought_down_change_is_logged() {
        let app = test_app().await;
        let bank = create_account(&app, "1100", "Bank", "asset").await;
        let january = create_period(&app, "2026-01", "2026-01-01", "2026-01-31").await;
        let jan = january["id"].as_str().unwrap();

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/periods/{jan}/accounts"),
            Some(json!({ "account_id": bank, "balance_brought_down": "100.00" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/periods/{jan}/accounts/{bank}/brought-down"),
            Some(json!({ "balance": "130.00", "notes": "bank letter" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(amount(&body["adjustment"]["adjustment_amount"]), dec!(30));
        assert_eq!(amount(&body["balance"]["balance_carried_down"]), dec!(130));

        let (_, log) = send(
            &app,
            Method::GET,
            &format!("/api/v1/periods/{jan}/accounts/{bank}/verifications"),
            None,
        )
        .await;
        assert_eq!(log["verifications"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_last_period_cannot_close() {
        let app = test_app().await;
        let only = create_period(&app, "2026-01", "2026-01-01", "2026-01-31").await;
        let id = only["id"].as_str().unwrap();

        let (status, body) =
            send(&app, Method::POST, &format!("/api/v1/periods/{id}/close"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }
}
