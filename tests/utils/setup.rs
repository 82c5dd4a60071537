#![allow(dead_code)]

use std::sync::Arc;

use chat_relay::{config::HeartbeatConfig, AppState, InMemoryRoomDirectory, RelayMessageHandler};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub state: AppState,
    pub directory: Arc<InMemoryRoomDirectory>,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub input_handler: RelayMessageHandler,
    pub connections: Vec<String>,
}

pub struct TestSetupBuilder {
    connections: Vec<String>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            connections: vec![],
        }
    }

    pub fn with_connections(mut self, connections: Vec<&str>) -> Self {
        self.connections = connections.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_connections(self) -> Self {
        self.with_connections(vec!["alice", "bob"])
    }

    pub fn with_three_connections(self) -> Self {
        self.with_connections(vec!["alice", "bob", "charlie"])
    }

    pub async fn build(self) -> TestSetup {
        let directory = Arc::new(InMemoryRoomDirectory::new());
        let mock_conn_manager = Arc::new(MockConnectionManager::new());

        for connection in &self.connections {
            mock_conn_manager.connect(connection).await;
        }

        let state = AppState::new(
            directory.clone(),
            mock_conn_manager.clone(),
            HeartbeatConfig::default(),
        );
        let input_handler = RelayMessageHandler::new(state.relay.clone());

        TestSetup {
            state,
            directory,
            mock_conn_manager,
            input_handler,
            connections: self.connections,
        }
    }
}
