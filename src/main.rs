use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use travel_intake::config::AppConfig;
use travel_intake::db;
use travel_intake::router::build_router;
use travel_intake::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        database = %config.database_url,
        broadcast_window_minutes = config.broadcast_window_minutes,
        normalize_dates = config.normalize_dates,
        "loaded configuration"
    );

    let conn = db::init_db(&config.database_url)?;
    let state = Arc::new(AppState::new(conn, config.clone()));

    let app = build_router(state.clone());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    match Arc::try_unwrap(state) {
        Ok(state) => db::close_db(state.into_connection())?,
        Err(_) => tracing::warn!("state still shared at shutdown, leaving database to close on drop"),
    }

    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
    state.begin_shutdown();
}
