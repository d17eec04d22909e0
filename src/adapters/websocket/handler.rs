//! WebSocket upgrade handler for live order channels.
//!
//! Connection lifecycle:
//! 1. Check the order exists and pick up the caller's identity
//! 2. Upgrade to WebSocket
//! 3. Join the order in the broadcast hub
//! 4. Apply each inbound request and broadcast the resulting order view
//! 5. Leave the hub when either side of the socket finishes

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::Caller;
use crate::adapters::http::orders::dto::{ItemRequest, OrderView, UpdateOrderRequest};
use crate::adapters::http::state::AppState;
use crate::application::handlers::order::{
    AddItemCommand, DeleteItemCommand, GetOrderQuery, UpdateOrderCommand,
};
use crate::domain::foundation::{Actor, OrderId};
use crate::domain::order::OrderError;

use super::hub::{ConnectionHandle, SendFailure};
use super::messages::{error_text, InboundMessage, MessageType};

/// Per-connection socket limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebSocketSettings {
    pub write_buffer_size: usize,
    /// Frames queued for one connection before it counts as stalled.
    pub outbound_queue_capacity: usize,
    pub max_message_size: usize,
    pub max_frame_size: usize,
}

impl Default for WebSocketSettings {
    fn default() -> Self {
        Self {
            write_buffer_size: 4096,
            outbound_queue_capacity: 64,
            max_message_size: 64 * 1024,
            max_frame_size: 16 * 1024,
        }
    }
}

/// Routes: `GET /orders/:order_id/ws`
pub fn websocket_routes() -> Router<AppState> {
    Router::new().route("/orders/:order_id/ws", get(ws_handler))
}

/// Upgrades a request to a live channel for one order.
///
/// Identity comes from the auth middleware, which also accepts `?token=` on
/// upgrade requests since browsers cannot set headers on a WebSocket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(order_id): Path<OrderId>,
    Caller(actor): Caller,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    state
        .get_order_handler()
        .handle(GetOrderQuery { order_id })
        .await?;

    let settings = state.websocket;

    Ok(ws
        .write_buffer_size(settings.write_buffer_size)
        .max_message_size(settings.max_message_size)
        .max_frame_size(settings.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, order_id, actor, state)))
}

async fn handle_socket(socket: WebSocket, order_id: OrderId, actor: Actor, state: AppState) {
    let (sink, stream) = socket.split();
    let (connection, outbound) = ConnectionHandle::new(state.websocket.outbound_queue_capacity);
    let connection_id = connection.id();

    state.hub.join(order_id, connection.clone()).await;
    tracing::debug!(
        order_id = %order_id,
        connection_id = %connection_id,
        authenticated = actor.is_authenticated(),
        "WebSocket connected"
    );

    let mut send_task = tokio::spawn(write_loop(sink, outbound, connection.clone()));
    let mut recv_task = tokio::spawn(read_loop(stream, order_id, actor, state.clone(), connection));

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.leave(&order_id, &connection_id).await;
    tracing::debug!(
        order_id = %order_id,
        connection_id = %connection_id,
        "WebSocket disconnected"
    );
}

/// Drains the outbound queue into the socket until a write fails or the hub
/// asks the connection to close.
async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<String>,
    connection: ConnectionHandle,
) {
    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                if let Err(e) = sink.send(Message::Text(frame)).await {
                    tracing::debug!(
                        connection_id = %connection.id(),
                        error = %e,
                        "Write failed, closing connection"
                    );
                    break;
                }
            }
            _ = connection.closed() => {
                tracing::debug!(connection_id = %connection.id(), "Close requested");
                break;
            }
        }
    }

    if let Err(e) = sink.close().await {
        tracing::trace!(connection_id = %connection.id(), error = %e, "Close frame not sent");
    }
}

async fn read_loop(
    mut stream: SplitStream<WebSocket>,
    order_id: OrderId,
    actor: Actor,
    state: AppState,
    connection: ConnectionHandle,
) {
    while let Some(frame) = stream.next().await {
        let payload = match frame {
            Ok(Message::Text(text)) => text.into_bytes(),
            Ok(Message::Binary(bytes)) => bytes,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => {
                tracing::debug!(connection_id = %connection.id(), "Peer sent close frame");
                break;
            }
            Err(e) => {
                tracing::debug!(connection_id = %connection.id(), error = %e, "Read failed");
                break;
            }
        };

        match dispatch(&state, order_id, &actor, &payload).await {
            Outcome::Broadcast(message_type, view) => {
                state.hub.broadcast(&order_id, message_type, &view).await;
            }
            Outcome::Reject(text) => {
                if let Err(failure) = connection.send_message(MessageType::Error, &text) {
                    tracing::warn!(
                        connection_id = %connection.id(),
                        reason = %failure,
                        "Failed to send error reply"
                    );
                    if failure == SendFailure::Closed {
                        break;
                    }
                }
            }
        }
    }
}

/// Result of applying one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    /// Push the fresh view to every subscriber.
    Broadcast(MessageType, OrderView),
    /// Tell only the sender what went wrong.
    Reject(String),
}

async fn dispatch(state: &AppState, order_id: OrderId, actor: &Actor, frame: &[u8]) -> Outcome {
    let envelope = match InboundMessage::decode(frame) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(order_id = %order_id, error = %e, "Malformed frame");
            return Outcome::Reject(error_text::MALFORMED_FRAME.to_string());
        }
    };

    let Some(message_type) = MessageType::parse_request(&envelope.message_type) else {
        tracing::debug!(
            order_id = %order_id,
            message_type = %envelope.message_type,
            "Unknown request type"
        );
        return Outcome::Reject(error_text::UNKNOWN_TYPE.to_string());
    };

    let result = match message_type {
        MessageType::AddItem => {
            let request: ItemRequest = match decode_payload(envelope.data) {
                Ok(request) => request,
                Err(text) => return Outcome::Reject(text),
            };
            state
                .add_item_handler()
                .handle(AddItemCommand {
                    order_id,
                    menu_item_id: request.menu_item_id(),
                })
                .await
                .map(|added| added.order)
        }
        MessageType::DeleteItem => {
            let request: ItemRequest = match decode_payload(envelope.data) {
                Ok(request) => request,
                Err(text) => return Outcome::Reject(text),
            };
            state
                .delete_item_handler()
                .handle(DeleteItemCommand {
                    order_id,
                    order_item_id: request.order_item_id(),
                })
                .await
        }
        MessageType::UpdateOrder => {
            let request: UpdateOrderRequest = match decode_payload(envelope.data) {
                Ok(request) => request,
                Err(text) => return Outcome::Reject(text),
            };
            let update = match request.into_update() {
                Ok(update) => update,
                Err(e) => {
                    return Outcome::Reject(format!("{}: {}", error_text::INVALID_PAYLOAD, e))
                }
            };
            state
                .update_order_handler()
                .handle(UpdateOrderCommand {
                    order_id,
                    update,
                    actor: actor.clone(),
                })
                .await
        }
        MessageType::Error => return Outcome::Reject(error_text::UNKNOWN_TYPE.to_string()),
    };

    match result {
        Ok(order) => Outcome::Broadcast(message_type, OrderView::from(&order)),
        Err(err) => Outcome::Reject(failure_text(order_id, message_type, &err)),
    }
}

fn decode_payload<T: DeserializeOwned>(data: Value) -> Result<T, String> {
    serde_json::from_value(data).map_err(|e| format!("{}: {}", error_text::MALFORMED_FRAME, e))
}

fn failure_text(order_id: OrderId, message_type: MessageType, err: &OrderError) -> String {
    let operation = match message_type {
        MessageType::AddItem => error_text::ADD_ITEM_FAILED,
        MessageType::DeleteItem => error_text::DELETE_ITEM_FAILED,
        _ => error_text::UPDATE_ORDER_FAILED,
    };

    if err.is_server_fault() {
        tracing::error!(order_id = %order_id, operation, error = %err, "Order mutation failed");
        operation.to_string()
    } else {
        tracing::debug!(order_id = %order_id, operation, error = %err, "Order mutation rejected");
        format!("{}: {}", operation, err)
    }
}
