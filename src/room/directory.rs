use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::types::ConnectionId;

/// Membership table mapping rooms to the connections currently inside them
///
/// Rooms are plain string keys: a user id for user-scoped rooms, a chat id
/// for chat-scoped rooms. Joining is additive and idempotent; there is no
/// explicit leave, membership only goes away with `remove_connection`.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Adds the connection to the room. Returns false if it was already a member.
    async fn join(&self, connection_id: &ConnectionId, room_id: &str) -> bool;

    /// Snapshot of the connections currently in the room
    async fn members_of(&self, room_id: &str) -> HashSet<ConnectionId>;

    /// Rooms the connection currently belongs to
    async fn rooms_of(&self, connection_id: &ConnectionId) -> HashSet<String>;

    /// Drops every membership held by the connection, returning the rooms it left
    async fn remove_connection(&self, connection_id: &ConnectionId) -> Vec<String>;
}

#[derive(Default)]
struct Memberships {
    // room_id -> connections
    rooms: HashMap<String, HashSet<ConnectionId>>,
    // connection_id -> room_ids
    connections: HashMap<ConnectionId, HashSet<String>>,
}

/// In-memory implementation of RoomDirectory
pub struct InMemoryRoomDirectory {
    memberships: RwLock<Memberships>,
}

impl Default for InMemoryRoomDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomDirectory {
    pub fn new() -> Self {
        Self {
            memberships: RwLock::new(Memberships::default()),
        }
    }

    /// Number of rooms with at least one member
    #[cfg(test)]
    async fn room_count(&self) -> usize {
        self.memberships.read().await.rooms.len()
    }
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    #[instrument(skip(self))]
    async fn join(&self, connection_id: &ConnectionId, room_id: &str) -> bool {
        let mut memberships = self.memberships.write().await;

        let inserted = memberships
            .rooms
            .entry(room_id.to_string())
            .or_default()
            .insert(connection_id.clone());
        memberships
            .connections
            .entry(connection_id.clone())
            .or_default()
            .insert(room_id.to_string());

        if inserted {
            debug!(connection_id = %connection_id, room_id = %room_id, "Connection joined room");
        } else {
            debug!(
                connection_id = %connection_id,
                room_id = %room_id,
                "Connection already in room"
            );
        }

        inserted
    }

    async fn members_of(&self, room_id: &str) -> HashSet<ConnectionId> {
        let memberships = self.memberships.read().await;
        memberships.rooms.get(room_id).cloned().unwrap_or_default()
    }

    async fn rooms_of(&self, connection_id: &ConnectionId) -> HashSet<String> {
        let memberships = self.memberships.read().await;
        memberships
            .connections
            .get(connection_id)
            .cloned()
            .unwrap_or_default()
    }

    #[instrument(skip(self))]
    async fn remove_connection(&self, connection_id: &ConnectionId) -> Vec<String> {
        let mut memberships = self.memberships.write().await;

        let Some(room_ids) = memberships.connections.remove(connection_id) else {
            debug!(connection_id = %connection_id, "Connection held no room memberships");
            return Vec::new();
        };

        for room_id in &room_ids {
            if let Some(members) = memberships.rooms.get_mut(room_id) {
                members.remove(connection_id);
                if members.is_empty() {
                    memberships.rooms.remove(room_id);
                }
            }
        }

        debug!(
            connection_id = %connection_id,
            rooms = room_ids.len(),
            "Removed connection from all rooms"
        );

        let mut left: Vec<String> = room_ids.into_iter().collect();
        left.sort();
        left
    }
}
