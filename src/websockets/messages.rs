use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};

use crate::relay::{InboundEvent, OutboundEvent, RelayError, UserIdentity};

/// Event names carried in the `type` field of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum MessageType {
    // Client -> Server
    #[serde(rename = "setup")]
    #[strum(serialize = "setup")]
    Setup,
    #[serde(rename = "join chat")]
    #[strum(serialize = "join chat")]
    JoinChat,
    #[serde(rename = "new message")]
    #[strum(serialize = "new message")]
    NewMessage,

    // Both directions
    #[serde(rename = "typing")]
    #[strum(serialize = "typing")]
    Typing,
    #[serde(rename = "stop typing")]
    #[strum(serialize = "stop typing")]
    StopTyping,

    // Server -> Client
    #[serde(rename = "connected")]
    #[strum(serialize = "connected")]
    Connected,
    #[serde(rename = "message received")]
    #[strum(serialize = "message received")]
    MessageReceived,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<WebSocketMessageMeta>,
}

impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    /// Create a `setup` message
    pub fn setup(user_id: &str) -> Self {
        Self::new(MessageType::Setup, serde_json::json!({ "_id": user_id }))
    }

    /// Create a `join chat` message
    pub fn join_chat(room_id: &str) -> Self {
        Self::new(MessageType::JoinChat, Value::String(room_id.to_string()))
    }

    /// Create a `typing` message addressed to a chat room
    pub fn typing(room_id: &str) -> Self {
        Self::new(MessageType::Typing, Value::String(room_id.to_string()))
    }

    /// Create a `stop typing` message addressed to a chat room
    pub fn stop_typing(room_id: &str) -> Self {
        Self::new(MessageType::StopTyping, Value::String(room_id.to_string()))
    }

    /// Create a `new message` message
    pub fn new_message(payload: Value) -> Self {
        Self::new(MessageType::NewMessage, payload)
    }

    /// Parses a text frame into an inbound event
    pub fn decode(text: &str) -> Result<InboundEvent, RelayError> {
        let message: WebSocketMessage =
            serde_json::from_str(text).map_err(|e| RelayError::InvalidFrame(e.to_string()))?;
        InboundEvent::try_from(message)
    }

    pub fn to_json(&self) -> Result<String, RelayError> {
        serde_json::to_string(self).map_err(|e| RelayError::Serialization(e.to_string()))
    }
}

fn room_id_payload(message_type: MessageType, payload: Value) -> Result<String, RelayError> {
    match payload {
        Value::String(room_id) => Ok(room_id),
        other => Err(RelayError::InvalidFrame(format!(
            "'{}' expects a room identifier string, got {}",
            message_type, other
        ))),
    }
}

impl TryFrom<WebSocketMessage> for InboundEvent {
    type Error = RelayError;

    fn try_from(message: WebSocketMessage) -> Result<Self, Self::Error> {
        let WebSocketMessage {
            message_type,
            payload,
            ..
        } = message;

        match message_type {
            // A payload that is not an identity object is handed over as "no
            // identity" so the relay reports it like any other invalid setup.
            MessageType::Setup => Ok(InboundEvent::Setup(
                serde_json::from_value::<UserIdentity>(payload).ok(),
            )),
            MessageType::JoinChat => Ok(InboundEvent::JoinChat(room_id_payload(
                message_type,
                payload,
            )?)),
            MessageType::Typing => Ok(InboundEvent::Typing(room_id_payload(
                message_type,
                payload,
            )?)),
            MessageType::StopTyping => Ok(InboundEvent::StopTyping(room_id_payload(
                message_type,
                payload,
            )?)),
            MessageType::NewMessage => Ok(InboundEvent::NewMessage(payload)),
            MessageType::Connected | MessageType::MessageReceived => {
                Err(RelayError::UnexpectedEvent(message_type.to_string()))
            }
        }
    }
}

impl From<OutboundEvent> for WebSocketMessage {
    fn from(event: OutboundEvent) -> Self {
        match event {
            OutboundEvent::Connected => Self::new(MessageType::Connected, Value::Null),
            OutboundEvent::Typing => Self::new(MessageType::Typing, Value::Null),
            OutboundEvent::StopTyping => Self::new(MessageType::StopTyping, Value::Null),
            OutboundEvent::MessageReceived(payload) => {
                Self::new(MessageType::MessageReceived, payload)
            }
        }
    }
}
