use serde_json::Value;

use chat_relay::{websockets::teardown_connection, ConnectionId, MessageHandler, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a WebSocket message through the same entry point the socket uses
    pub async fn send_message(&self, connection: &str, message: WebSocketMessage) {
        let message_json = serde_json::to_string(&message).unwrap();
        self.send_raw(connection, &message_json).await;
    }

    /// Send an arbitrary text frame
    pub async fn send_raw(&self, connection: &str, frame: &str) {
        self.input_handler
            .handle_message(&ConnectionId::from(connection), frame.to_string())
            .await;
    }

    /// Close the connection the way the transport does
    pub async fn disconnect(&self, connection: &str) {
        teardown_connection(&self.state, &ConnectionId::from(connection)).await;
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn send_setup(&self, connection: &str, user_id: &str) {
        self.send_message(connection, WebSocketMessage::setup(user_id))
            .await;
    }

    pub async fn send_join_chat(&self, connection: &str, room_id: &str) {
        self.send_message(connection, WebSocketMessage::join_chat(room_id))
            .await;
    }

    pub async fn send_typing(&self, connection: &str, room_id: &str) {
        self.send_message(connection, WebSocketMessage::typing(room_id))
            .await;
    }

    pub async fn send_stop_typing(&self, connection: &str, room_id: &str) {
        self.send_message(connection, WebSocketMessage::stop_typing(room_id))
            .await;
    }

    pub async fn send_new_message(&self, connection: &str, payload: Value) {
        self.send_message(connection, WebSocketMessage::new_message(payload))
            .await;
    }

    /// Setup every connection as the user of the same name and clear the acks
    pub async fn setup_all_as_users(&self) {
        for connection in &self.connections {
            self.send_setup(connection, connection).await;
        }
        self.clear_messages().await;
    }
}
