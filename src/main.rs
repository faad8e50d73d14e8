// ==============================================================================
// main.rs - Gateway Trust Reference Service
// ==============================================================================
// Description: Axum server wiring the gateway trust layer around a small
//              reference API
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gateway_trust::{secure, GatewayTrustConfig, SecurityState};

mod handlers;

const DEFAULT_PORT: u16 = 8099;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting Gateway Trust Reference Service v1.0.0");

    let config = GatewayTrustConfig::from_env().context("Invalid security configuration")?;
    if !config.enabled {
        info!("Gateway trust disabled; all requests are permitted");
    }
    let state = SecurityState::new(config).context("Failed to initialize security state")?;

    let app = build_router(state);

    let port = match std::env::var("PORT") {
        Ok(value) => value.parse::<u16>().context("PORT must be a valid port number")?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// `RUST_LOG` filter (default info); `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}

fn build_router(state: SecurityState) -> Router {
    let api_routes = Router::new()
        .route("/public/health", get(handlers::health_check))
        .route("/me", get(handlers::me))
        .route("/profile", post(handlers::update_profile))
        .route("/resources/{owner_id}", get(handlers::get_resource))
        .route("/admin/error-codes", get(handlers::list_error_codes));

    let routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes);

    secure(routes, state)
}
