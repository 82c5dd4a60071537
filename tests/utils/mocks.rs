use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use chat_relay::{ConnectionId, ConnectionManager};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records every frame addressed to a live connection. Frames for unknown or
/// removed connections are dropped, like the real transport does.
#[derive(Clone)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<ConnectionId, VecDeque<String>>>>,
    connected: Arc<RwLock<HashSet<ConnectionId>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self {
            sent_messages: Arc::new(RwLock::new(HashMap::new())),
            connected: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub async fn connect(&self, connection: &str) {
        self.connected
            .write()
            .await
            .insert(ConnectionId::from(connection));
    }

    pub async fn get_messages_for(&self, connection: &str) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(&ConnectionId::from(connection))
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Pops the oldest frame sent to the connection
    pub async fn consume_message_for(&self, connection: &str) -> Option<String> {
        self.sent_messages
            .write()
            .await
            .get_mut(&ConnectionId::from(connection))
            .and_then(VecDeque::pop_front)
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(
        &self,
        connection_id: ConnectionId,
        _sender: mpsc::UnboundedSender<String>,
    ) {
        self.connected.write().await.insert(connection_id);
    }

    async fn remove_connection(&self, connection_id: &ConnectionId) {
        self.connected.write().await.remove(connection_id);
    }

    async fn send_to_connection(&self, connection_id: &ConnectionId, message: &str) {
        if !self.connected.read().await.contains(connection_id) {
            return;
        }
        self.sent_messages
            .write()
            .await
            .entry(connection_id.clone())
            .or_default()
            .push_back(message.to_string());
    }

    async fn send_to_connections(&self, connection_ids: &[ConnectionId], message: &str) {
        for connection_id in connection_ids {
            self.send_to_connection(connection_id, message).await;
        }
    }

    async fn count_connections(&self) -> usize {
        self.connected.read().await.len()
    }
}
