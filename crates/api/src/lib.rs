//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - The acting-user extractor
//! - Mapping of ledger errors onto HTTP responses

pub mod error;
pub mod extractors;
pub mod routes;

#[cfg(test)]
mod test_support;

use axum::Router;
use lodgebook_shared::LedgerConfig;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Ledger settings (currency, petty-cash codes, match window).
    pub ledger: Arc<LedgerConfig>,
}

impl AppState {
    /// Wraps a connection and ledger settings.
    #[must_use]
    pub fn new(db: DatabaseConnection, ledger: LedgerConfig) -> Self {
        Self {
            db: Arc::new(db),
            ledger: Arc::new(ledger),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
