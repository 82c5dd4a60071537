// Event routing core: decides which connections see which events.

// Public API
pub use error::RelayError;
pub use events::{InboundEvent, MessageRoute, OutboundEvent, UserIdentity};
pub use room_relay::RoomRelay;

// Internal modules
mod error;
mod events;
mod room_relay;
