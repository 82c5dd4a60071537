use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::config::HeartbeatConfig;
use crate::room::ConnectionId;

/// One inbound frame, reduced to what the relay cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketFrame {
    /// A text frame carrying an event
    Text(String),
    /// Ping, pong or binary: proof of life, nothing to dispatch
    Heartbeat,
}

/// Simple WebSocket abstraction - all we care about is send/receive
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text message to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Send a heartbeat ping
    async fn send_ping(&mut self) -> Result<(), SocketError>;

    /// Receive the next frame from the client (None if connection closed)
    async fn receive_message(&mut self) -> Result<Option<SocketFrame>, SocketError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Handler for incoming WebSocket messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle an incoming text frame from the client
    async fn handle_message(&self, connection_id: &ConnectionId, message: String);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SocketError {
    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    #[error("no traffic from client within the heartbeat window")]
    HeartbeatTimeout,
}

/// Direct implementation on axum's WebSocket
#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn send_ping(&mut self) -> Result<(), SocketError> {
        self.send(Message::Ping(Vec::new()))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<SocketFrame>, SocketError> {
        match self.next().await {
            Some(Ok(Message::Text(text))) => Ok(Some(SocketFrame::Text(text))),
            Some(Ok(Message::Close(_))) => Ok(None),
            Some(Ok(_)) => Ok(Some(SocketFrame::Heartbeat)), // binary/ping/pong
            Some(Err(e)) => Err(SocketError::ReceiveFailed(e.to_string())),
            None => Ok(None), // Connection closed
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// Connection represents a managed WebSocket connection
///
/// Inbound frames are handed to the message handler one at a time, each
/// to completion, so events from one client are processed in send order.
/// The outbound receiver drains frames queued through the ConnectionManager.
pub struct Connection {
    pub connection_id: ConnectionId,
    socket: Box<dyn SocketWrapper>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    message_handler: Arc<dyn MessageHandler>,
    heartbeat: HeartbeatConfig,
}

impl Connection {
    pub fn new(
        connection_id: ConnectionId,
        socket: Box<dyn SocketWrapper>,
        outbound_receiver: mpsc::UnboundedReceiver<String>,
        message_handler: Arc<dyn MessageHandler>,
        heartbeat: HeartbeatConfig,
    ) -> Self {
        Self {
            connection_id,
            socket,
            outbound_receiver,
            message_handler,
            heartbeat,
        }
    }

    /// Run the connection - handles sending, receiving and heartbeats until disconnect
    pub async fn run(mut self) -> Result<(), SocketError> {
        let idle_limit = self.heartbeat.idle_limit();

        let mut ping_timer = time::interval_at(
            Instant::now() + self.heartbeat.ping_interval,
            self.heartbeat.ping_interval,
        );
        ping_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let idle_deadline = time::sleep(idle_limit);
        tokio::pin!(idle_deadline);

        loop {
            tokio::select! {
                // Handle outbound messages (from our app to client)
                msg = self.outbound_receiver.recv() => {
                    match msg {
                        Some(message) => self.socket.send_message(message).await?,
                        None => break, // Channel closed, disconnect
                    }
                }

                // Handle inbound messages (from client to our app)
                frame = self.socket.receive_message() => {
                    match frame {
                        Ok(Some(frame)) => {
                            idle_deadline.as_mut().reset(Instant::now() + idle_limit);
                            if let SocketFrame::Text(message) = frame {
                                self.message_handler
                                    .handle_message(&self.connection_id, message)
                                    .await;
                            }
                        }
                        Ok(None) => break, // Client disconnected
                        Err(e) => return Err(e),
                    }
                }

                _ = ping_timer.tick() => {
                    debug!(connection_id = %self.connection_id, "Sending heartbeat ping");
                    self.socket.send_ping().await?;
                }

                _ = &mut idle_deadline => {
                    warn!(
                        connection_id = %self.connection_id,
                        idle_limit_ms = idle_limit.as_millis() as u64,
                        "Client went silent, closing connection"
                    );
                    let _ = self.socket.close().await;
                    return Err(SocketError::HeartbeatTimeout);
                }
            }
        }

        // Clean disconnect
        let _ = self.socket.close().await;
        Ok(())
    }
}
