use thiserror::Error;

/// Errors raised while decoding or routing a relay event
///
/// None of these are fatal. The connection loop logs them and moves on to
/// the next frame; the originating client never sees them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("setup payload is missing a user identifier")]
    InvalidSetup,

    #[error("message payload has no chat")]
    MissingChat,

    #[error("message chat has no users list")]
    MissingChatUsers,

    #[error("message payload has no sender identifier")]
    MissingSender,

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("event '{0}' cannot be sent by a client")]
    UnexpectedEvent(String),

    #[error("failed to serialize outbound frame: {0}")]
    Serialization(String),
}

impl RelayError {
    /// Whether the error comes from a payload the relay refused to route
    pub fn is_malformed_payload(&self) -> bool {
        matches!(
            self,
            RelayError::InvalidSetup
                | RelayError::MissingChat
                | RelayError::MissingChatUsers
                | RelayError::MissingSender
        )
    }
}
