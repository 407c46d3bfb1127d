//! Router fixtures for handler tests.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use lodgebook_db::migration::{Migrator, MigratorTrait};
use lodgebook_shared::LedgerConfig;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{AppState, create_router, extractors::USER_ID_HEADER};

/// Full router over a fresh migrated in-memory database.
pub async fn test_app() -> Router {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    create_router(AppState::new(db, LedgerConfig::default()))
}

/// Sends one request as a fixed user and decodes the JSON body.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, Uuid::nil().to_string())
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Reads a decimal that travelled as a string.
pub fn amount(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal string")).unwrap()
}

/// Creates a non-category account and returns its id.
pub async fn create_account(app: &Router, code: &str, name: &str, account_type: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/accounts",
        Some(json!({ "code": code, "name": name, "type": account_type })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

/// Posts a two-line transfer and returns the response.
pub async fn post_transfer(
    app: &Router,
    date: &str,
    debit: &str,
    credit: &str,
    value: &str,
) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/v1/transactions",
        Some(json!({
            "description": "transfer",
            "transaction_date": date,
            "entries": [
                { "account_id": debit, "entry_type": "debit", "amount": value },
                { "account_id": credit, "entry_type": "credit", "amount": value }
            ]
        })),
    )
    .await
}
