//! Broadcast hub grouping live connections by order.
//!
//! ```text
//! Order: 7f3a…          Order: 91c2…
//! ├── conn-a (phone)    └── conn-d (tablet)
//! ├── conn-b (tablet)
//! └── conn-c (phone)
//! ```
//!
//! A mutation on order 7f3a… is pushed to a, b and c only. One mutex guards
//! the whole registry, so join, leave and broadcast never interleave.
//!
//! The hub never writes to a socket itself. Each connection owns a bounded
//! outbound queue drained by its writer task; broadcasting is a non-blocking
//! `try_send` per connection, so a slow or dead peer cannot stall the others.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex, Notify};
use uuid::Uuid;

use crate::domain::foundation::OrderId;

use super::messages::{MessageType, OutboundMessage};

/// Server-generated identifier for one WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a frame could not be queued for a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendFailure {
    /// The outbound queue is at capacity.
    #[error("outbound queue full")]
    QueueFull,
    /// The writer task has gone away.
    #[error("connection closed")]
    Closed,
    /// The payload could not be serialized; nothing was queued.
    #[error("could not encode frame: {0}")]
    Encode(String),
}

/// Cheap, cloneable handle to a connection's outbound side.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::Sender<String>,
    shutdown: Arc<Notify>,
}

impl ConnectionHandle {
    /// Creates a handle plus the receiving end its writer task drains.
    pub fn new(queue_capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (outbound, rx) = mpsc::channel(queue_capacity.max(1));
        let handle = Self {
            id: ConnectionId::new(),
            outbound,
            shutdown: Arc::new(Notify::new()),
        };
        (handle, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a text frame without waiting.
    pub fn try_send(&self, frame: String) -> Result<(), SendFailure> {
        self.outbound.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendFailure::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SendFailure::Closed,
        })
    }

    /// Serializes `{type, data}` and queues it for this connection only.
    pub fn send_message<T: Serialize>(
        &self,
        message_type: MessageType,
        data: &T,
    ) -> Result<(), SendFailure> {
        match OutboundMessage::encode(message_type, data) {
            Ok(frame) => self.try_send(frame),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize outbound message");
                Err(SendFailure::Encode(e.to_string()))
            }
        }
    }

    /// Asks the writer task to close the socket.
    ///
    /// The permit is stored if the writer is not waiting yet, so a close
    /// requested before the writer starts is not lost.
    pub fn close(&self) {
        self.shutdown.notify_one();
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub async fn closed(&self) {
        self.shutdown.notified().await;
    }
}

type Registry = HashMap<OrderId, HashMap<ConnectionId, ConnectionHandle>>;

/// Registry of connections subscribed to each order.
#[derive(Debug, Default)]
pub struct BroadcastHub {
    orders: Mutex<Registry>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to an order. Joining twice is a no-op.
    pub async fn join(&self, order_id: OrderId, connection: ConnectionHandle) {
        let mut orders = self.orders.lock().await;
        let connection_id = connection.id();
        orders
            .entry(order_id)
            .or_default()
            .entry(connection_id)
            .or_insert(connection);

        tracing::debug!(
            order_id = %order_id,
            connection_id = %connection_id,
            subscribers = orders.get(&order_id).map(HashMap::len).unwrap_or(0),
            "Connection joined order"
        );
    }

    /// Unsubscribes a connection, dropping the order entry once empty.
    ///
    /// Unknown orders or connections are ignored.
    pub async fn leave(&self, order_id: &OrderId, connection_id: &ConnectionId) {
        let mut orders = self.orders.lock().await;
        let Some(connections) = orders.get_mut(order_id) else {
            return;
        };

        if connections.remove(connection_id).is_some() {
            tracing::debug!(
                order_id = %order_id,
                connection_id = %connection_id,
                "Connection left order"
            );
        }
        if connections.is_empty() {
            orders.remove(order_id);
        }
    }

    /// Pushes `{type, data}` to every subscriber of `order_id`.
    ///
    /// A connection whose queue is full or closed is told to close and
    /// skipped; it stays registered until its own handler leaves. Returns
    /// the number of connections the frame was queued for.
    pub async fn broadcast<T: Serialize>(
        &self,
        order_id: &OrderId,
        message_type: MessageType,
        data: &T,
    ) -> usize {
        let frame = match OutboundMessage::encode(message_type, data) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(
                    order_id = %order_id,
                    message_type = %message_type,
                    error = %e,
                    "Failed to serialize broadcast"
                );
                return 0;
            }
        };

        let orders = self.orders.lock().await;
        let Some(connections) = orders.get(order_id) else {
            return 0;
        };

        let mut delivered = 0;
        for connection in connections.values() {
            match connection.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(failure) => {
                    tracing::warn!(
                        order_id = %order_id,
                        connection_id = %connection.id(),
                        reason = %failure,
                        "Failed to send broadcast, closing connection"
                    );
                    connection.close();
                }
            }
        }

        tracing::trace!(
            order_id = %order_id,
            message_type = %message_type,
            delivered,
            "Broadcast sent"
        );
        delivered
    }

    /// Number of connections subscribed to an order.
    pub async fn subscriber_count(&self, order_id: &OrderId) -> usize {
        self.orders
            .lock()
            .await
            .get(order_id)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    /// Orders with at least one subscriber.
    pub async fn active_orders(&self) -> Vec<OrderId> {
        self.orders.lock().await.keys().copied().collect()
    }

    pub async fn total_connections(&self) -> usize {
        self.orders.lock().await.values().map(HashMap::len).sum()
    }
}
