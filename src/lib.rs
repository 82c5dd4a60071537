// Library crate for the chat relay server
// This file exposes the public API for integration tests

pub mod app;
pub mod config;
pub mod relay;
pub mod room;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use app::{build_router, run_server, ServerError};
pub use config::{HeartbeatConfig, RelayConfig};
pub use relay::{InboundEvent, OutboundEvent, RelayError, RoomRelay, UserIdentity};
pub use room::{ConnectionId, InMemoryRoomDirectory, RoomDirectory};
pub use shared::{AppError, AppState};
pub use websockets::{
    ConnectionManager, InMemoryConnectionManager, MessageHandler, MessageType,
    RelayMessageHandler, WebSocketMessage,
};
