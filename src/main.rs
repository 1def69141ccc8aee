use std::sync::{Arc, Mutex};
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use salonbook::config::AppConfig;
use salonbook::db;
use salonbook::handlers;
use salonbook::services::{notify, sweep};
use salonbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.admin_token == "changeme" {
        tracing::warn!("ADMIN_TOKEN is the default value, set it before exposing the server");
    }

    let conn = db::init_db(&config.database_url)?;
    let notifier = notify::from_config(&config)?;

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        notifier,
    });

    if config.sweep_interval_minutes > 0 {
        let sweep_state = Arc::clone(&state);
        let every = Duration::from_secs(config.sweep_interval_minutes.saturating_mul(60));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let state = Arc::clone(&sweep_state);
                // rusqlite is blocking; keep it off the async workers
                let result = tokio::task::spawn_blocking(move || sweep::run_for_state(&state)).await;
                match result {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => tracing::error!(error = %e, "scheduled sweep failed"),
                    Err(e) => tracing::error!(error = %e, "scheduled sweep panicked"),
                }
            }
        });
        tracing::info!(minutes = config.sweep_interval_minutes, "background sweep enabled");
    }

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
