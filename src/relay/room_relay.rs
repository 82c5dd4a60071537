use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::error::RelayError;
use super::events::{InboundEvent, MessageRoute, OutboundEvent, UserIdentity};
use crate::room::{ConnectionId, RoomDirectory};
use crate::websockets::{ConnectionManager, WebSocketMessage};

/// Routes inbound client events to the connections that should see them
///
/// Two kinds of room are in play. `setup` puts a connection in the room
/// named after its user id; `new message` delivery targets those rooms.
/// `join chat` puts it in a room named after a chat id; typing indicators
/// target those. A user who never ran `setup` therefore gets no message
/// notifications even while sitting in the chat room.
///
/// The relay keeps no state of its own. Membership lives in the
/// `RoomDirectory`, outbound channels in the `ConnectionManager`.
pub struct RoomRelay {
    directory: Arc<dyn RoomDirectory>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl RoomRelay {
    pub fn new(
        directory: Arc<dyn RoomDirectory>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            directory,
            connection_manager,
        }
    }

    /// Handles one inbound event to completion.
    ///
    /// Returns the number of frames handed to the connection manager. Errors
    /// are already logged when they are returned; callers only need them for
    /// bookkeeping.
    pub async fn handle(
        &self,
        connection_id: &ConnectionId,
        event: InboundEvent,
    ) -> Result<usize, RelayError> {
        match event {
            InboundEvent::Setup(user) => self.handle_setup(connection_id, user).await,
            InboundEvent::JoinChat(room) => self.handle_join_chat(connection_id, &room).await,
            InboundEvent::Typing(room_id) => {
                self.broadcast_to_room(connection_id, &room_id, OutboundEvent::Typing)
                    .await
            }
            InboundEvent::StopTyping(room_id) => {
                self.broadcast_to_room(connection_id, &room_id, OutboundEvent::StopTyping)
                    .await
            }
            InboundEvent::NewMessage(payload) => {
                self.handle_new_message(connection_id, payload).await
            }
            InboundEvent::Disconnect => {
                info!(connection_id = %connection_id, "User disconnected");
                Ok(0)
            }
        }
    }

    async fn handle_setup(
        &self,
        connection_id: &ConnectionId,
        user: Option<UserIdentity>,
    ) -> Result<usize, RelayError> {
        let Some(user_id) = user.as_ref().and_then(UserIdentity::user_id) else {
            error!(
                connection_id = %connection_id,
                user = ?user,
                "Invalid user data received on setup"
            );
            return Err(RelayError::InvalidSetup);
        };

        self.directory.join(connection_id, user_id).await;
        info!(connection_id = %connection_id, user_id = %user_id, "User setup complete");

        let ack_target = std::slice::from_ref(connection_id);
        self.emit(ack_target, OutboundEvent::Connected).await
    }

    async fn handle_join_chat(
        &self,
        connection_id: &ConnectionId,
        room_id: &str,
    ) -> Result<usize, RelayError> {
        self.directory.join(connection_id, room_id).await;
        info!(connection_id = %connection_id, room_id = %room_id, "User joined room");
        Ok(0)
    }

    async fn handle_new_message(
        &self,
        connection_id: &ConnectionId,
        payload: serde_json::Value,
    ) -> Result<usize, RelayError> {
        let recipients: Vec<String> = match MessageRoute::from_payload(&payload) {
            Ok(route) => route.recipients().map(str::to_string).collect(),
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Invalid chat or chat users in new message, nothing delivered"
                );
                return Err(e);
            }
        };

        // Serialize once, the same frame goes to every recipient.
        let frame = WebSocketMessage::from(OutboundEvent::MessageReceived(payload)).to_json()?;

        let mut delivered = 0;
        for user_id in &recipients {
            let targets = self.others_in_room(connection_id, user_id).await;
            if targets.is_empty() {
                debug!(user_id = %user_id, "Recipient has no live setup connection, dropping");
                continue;
            }
            self.connection_manager
                .send_to_connections(&targets, &frame)
                .await;
            delivered += targets.len();
        }

        debug!(
            connection_id = %connection_id,
            recipients = recipients.len(),
            delivered = delivered,
            "New message relayed"
        );

        Ok(delivered)
    }

    async fn broadcast_to_room(
        &self,
        connection_id: &ConnectionId,
        room_id: &str,
        event: OutboundEvent,
    ) -> Result<usize, RelayError> {
        let targets = self.others_in_room(connection_id, room_id).await;
        self.emit(&targets, event).await
    }

    /// Members of the room other than the given connection, in a stable order
    async fn others_in_room(
        &self,
        connection_id: &ConnectionId,
        room_id: &str,
    ) -> Vec<ConnectionId> {
        let mut members: Vec<ConnectionId> = self
            .directory
            .members_of(room_id)
            .await
            .into_iter()
            .filter(|member| member != connection_id)
            .collect();
        members.sort();
        members
    }

    async fn emit(
        &self,
        targets: &[ConnectionId],
        event: OutboundEvent,
    ) -> Result<usize, RelayError> {
        if targets.is_empty() {
            return Ok(0);
        }

        let frame = WebSocketMessage::from(event).to_json()?;
        self.connection_manager
            .send_to_connections(targets, &frame)
            .await;
        Ok(targets.len())
    }
}
