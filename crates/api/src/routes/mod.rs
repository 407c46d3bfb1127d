//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod health;
pub mod periods;
pub mod petty_cash;
pub mod reconciliations;
pub mod transactions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(periods::routes())
        .merge(reconciliations::routes())
        .merge(petty_cash::routes())
}

/// Today's date, used when a request omits one.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
