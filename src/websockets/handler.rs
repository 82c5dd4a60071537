use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::relay::{InboundEvent, RoomRelay};
use crate::room::ConnectionId;
use crate::shared::AppState;
use crate::websockets::messages::WebSocketMessage;

use super::socket::{Connection, MessageHandler};

/// Message handler that decodes client frames and feeds them to the relay
pub struct RelayMessageHandler {
    relay: Arc<RoomRelay>,
}

impl RelayMessageHandler {
    pub fn new(relay: Arc<RoomRelay>) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl MessageHandler for RelayMessageHandler {
    async fn handle_message(&self, connection_id: &ConnectionId, message: String) {
        debug!(
            connection_id = %connection_id,
            message = %message,
            "Received message"
        );

        let event = match WebSocketMessage::decode(&message) {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                return;
            }
        };

        let event_name = event.name();
        match self.relay.handle(connection_id, event).await {
            Ok(delivered) => {
                debug!(
                    connection_id = %connection_id,
                    event = event_name,
                    delivered = delivered,
                    "Event handled"
                );
            }
            // Payload problems were reported by the relay itself
            Err(e) if e.is_malformed_payload() => {}
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    event = event_name,
                    error = %e,
                    "Event dropped"
                );
            }
        }
    }
}

/// WebSocket endpoint. Every upgrade becomes a new, anonymous connection;
/// the client identifies itself afterwards with a `setup` event.
/// GET /ws
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Response {
    debug!("WebSocket connection requested");
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let connection_id = ConnectionId::generate();
    info!(connection_id = %connection_id, "Client connected");

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    app_state
        .connection_manager
        .add_connection(connection_id.clone(), outbound_sender)
        .await;

    let message_handler = Arc::new(RelayMessageHandler::new(Arc::clone(&app_state.relay)));

    let connection = Connection::new(
        connection_id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
        app_state.heartbeat,
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(connection_id = %connection_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(
                connection_id = %connection_id,
                error = %e,
                "WebSocket connection ended with error"
            );
        }
    }

    teardown_connection(&app_state, &connection_id).await;
}

/// Transport-side cleanup once a socket is gone: drop its room memberships,
/// then its outbound channel, then let the relay observe the disconnect.
/// A connection that is no longer live is never reachable through a room.
pub async fn teardown_connection(app_state: &AppState, connection_id: &ConnectionId) {
    let rooms = app_state.directory.remove_connection(connection_id).await;
    debug!(
        connection_id = %connection_id,
        rooms = ?rooms,
        "Connection removed from rooms"
    );

    app_state
        .connection_manager
        .remove_connection(connection_id)
        .await;

    if let Err(e) = app_state
        .relay
        .handle(connection_id, InboundEvent::Disconnect)
        .await
    {
        warn!(
            connection_id = %connection_id,
            error = %e,
            "Disconnect handling failed"
        );
    }
}
