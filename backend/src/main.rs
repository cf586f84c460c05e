mod calendar;
mod clock;
mod config;
mod error;
mod google;
mod handlers;
mod routes;
mod state;
mod tokens;
mod views;

use anyhow::Result;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::routes::create_app;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading RUST_LOG
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timer_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!("Starting task timer server");
    tracing::info!(
        "Calendar: {}, timezone: {}",
        config.calendar_id,
        config.timezone
    );

    let state = AppState::from_config(&config)?;
    if !state.tokens.exists().await {
        tracing::warn!(
            "No Google tokens at {}; connect the calendar from /admin",
            state.tokens.path().display()
        );
    }

    let app = create_app(state, &config.public_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
