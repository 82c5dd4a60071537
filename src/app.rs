use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::config::{ConfigError, RelayConfig};
use crate::room::InMemoryRoomDirectory;
use crate::shared::{not_found, AppState};
use crate::websockets::{websocket_handler, InMemoryConnectionManager};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Assembles the HTTP surface: the WebSocket endpoint, the banner route
/// outside production, and a JSON 404 for everything else.
pub fn build_router(state: AppState, config: &RelayConfig) -> Result<Router, ConfigError> {
    let origin = HeaderValue::from_str(&config.cors_origin)
        .map_err(|_| ConfigError::InvalidOrigin(config.cors_origin.clone()))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let mut router = Router::new().route("/ws", get(websocket_handler));

    if !config.is_production() {
        router = router.route("/", get(|| async { "API is running.." }));
    }

    Ok(router
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state))
}

/// State wired with the in-memory directory and connection manager
pub fn default_state(config: &RelayConfig) -> AppState {
    AppState::new(
        Arc::new(InMemoryRoomDirectory::new()),
        Arc::new(InMemoryConnectionManager::new()),
        config.heartbeat,
    )
}

/// Binds the listener and serves until Ctrl-C
pub async fn run_server(config: RelayConfig) -> Result<(), ServerError> {
    let app = build_router(default_state(&config), &config)?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        port = config.port,
        cors_origin = %config.cors_origin,
        environment = ?config.environment,
        "Server running on PORT {}",
        config.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
