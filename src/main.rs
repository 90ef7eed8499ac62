use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use bookings::app;
use bookings::config::AppConfig;
use bookings::db;
use bookings::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let store = match db::connect(&config.database_url) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "database connection failed");
            std::process::exit(1);
        }
    };

    tracing::info!(environment = ?config.environment, "configuration loaded");

    let state = Arc::new(AppState {
        store: Box::new(store),
        config: config.clone(),
    });

    let app = app::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");
    tracing::info!("health check: http://localhost:{}/health", config.port);
    tracing::info!("db status: http://localhost:{}/api/db-status", config.port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
