// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use handler::{teardown_connection, websocket_handler, RelayMessageHandler};
pub use messages::{MessageType, WebSocketMessage, WebSocketMessageMeta};
pub use socket::{Connection, MessageHandler, SocketError, SocketFrame, SocketWrapper};

// Internal modules
mod connection_manager;
mod handler;
mod messages;
mod socket;
