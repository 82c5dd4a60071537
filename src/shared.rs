use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::HeartbeatConfig;
use crate::relay::RoomRelay;
use crate::room::RoomDirectory;
use crate::websockets::ConnectionManager;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn RoomDirectory>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub relay: Arc<RoomRelay>,
    pub heartbeat: HeartbeatConfig,
}

impl AppState {
    pub fn new(
        directory: Arc<dyn RoomDirectory>,
        connection_manager: Arc<dyn ConnectionManager>,
        heartbeat: HeartbeatConfig,
    ) -> Self {
        let relay = Arc::new(RoomRelay::new(
            Arc::clone(&directory),
            Arc::clone(&connection_manager),
        ));
        Self {
            directory,
            connection_manager,
            relay,
            heartbeat,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Fallback for every route the server does not know
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Not Found - {}", uri.path()))
}
