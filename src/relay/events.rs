use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::RelayError;

/// Events a client can raise on its connection
///
/// Closed set: every inbound frame is decoded into one of these before it
/// reaches the relay, so dispatch is an exhaustive match.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Register the user behind the connection. `None` when the client sent no payload.
    Setup(Option<UserIdentity>),

    /// Open a chat window: join the chat-scoped room
    JoinChat(String),

    /// Typing indicator for a chat-scoped room
    Typing(String),

    /// Typing stopped in a chat-scoped room
    StopTyping(String),

    /// A persisted message to fan out to the chat participants, kept as raw JSON
    NewMessage(Value),

    /// Raised by the transport when the connection closes
    Disconnect,
}

impl InboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::Setup(_) => "setup",
            InboundEvent::JoinChat(_) => "join chat",
            InboundEvent::Typing(_) => "typing",
            InboundEvent::StopTyping(_) => "stop typing",
            InboundEvent::NewMessage(_) => "new message",
            InboundEvent::Disconnect => "disconnect",
        }
    }
}

/// Events the relay emits towards clients
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// Acknowledges a successful setup
    Connected,
    Typing,
    StopTyping,
    /// Carries the inbound `new message` payload untouched
    MessageReceived(Value),
}

/// User identity sent with `setup`. Extra fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }

    /// The identifier, if present and non-empty
    pub fn user_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// The two fields of a message payload the relay inspects: `chat.users[]._id`
/// and `sender._id`. Everything else is opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRoute<'a> {
    pub sender_id: &'a str,
    pub participant_ids: Vec<&'a str>,
}

impl<'a> MessageRoute<'a> {
    /// Reads routing information out of a message payload.
    ///
    /// A missing `chat`, `chat.users` or `sender._id` rejects the whole
    /// payload. Individual participants without a string `_id` are skipped.
    pub fn from_payload(payload: &'a Value) -> Result<Self, RelayError> {
        let chat = payload
            .get("chat")
            .filter(|chat| !chat.is_null())
            .ok_or(RelayError::MissingChat)?;

        let users = chat
            .get("users")
            .and_then(Value::as_array)
            .ok_or(RelayError::MissingChatUsers)?;

        let sender_id = payload
            .get("sender")
            .and_then(|sender| sender.get("_id"))
            .and_then(Value::as_str)
            .ok_or(RelayError::MissingSender)?;

        let participant_ids = users
            .iter()
            .filter_map(|user| user.get("_id").and_then(Value::as_str))
            .filter(|id| !id.is_empty())
            .collect();

        Ok(Self {
            sender_id,
            participant_ids,
        })
    }

    /// Participants other than the sender, in chat order. Duplicates are kept.
    pub fn recipients(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.participant_ids
            .iter()
            .copied()
            .filter(move |id| *id != self.sender_id)
    }
}
