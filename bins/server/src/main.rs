//! Lodgebook API Server
//!
//! Main entry point for the boarding-house ledger service.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lodgebook_api::{AppState, create_router};
use lodgebook_db::connect_with;
use lodgebook_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lodgebook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    info!(
        currency = %config.ledger.currency,
        petty_cash_account = %config.ledger.petty_cash_account_code,
        uncategorized_expense = %config.ledger.uncategorized_expense_code,
        match_window_days = config.ledger.match_window_days,
        "Ledger configured"
    );
    let app = create_router(AppState::new(db, config.ledger));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
