// Public API - what other modules can use
pub use directory::{InMemoryRoomDirectory, RoomDirectory};
pub use types::ConnectionId;

// Internal modules
mod directory;
mod types;
