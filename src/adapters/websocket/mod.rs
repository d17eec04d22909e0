//! Live order channels over WebSocket.
//!
//! ```text
//!  phone ──ws──┐                         ┌── tablet
//!              ▼                         ▼
//!        read loop ── handlers ── repository
//!              │
//!              ▼
//!        BroadcastHub ── order_id ──▶ every subscriber's queue ──▶ writer task
//! ```
//!
//! - [`hub`] - order → connections registry and fan-out
//! - [`messages`] - `{type, data}` envelopes
//! - [`handler`] - upgrade route and per-connection loops

pub mod handler;
pub mod hub;
pub mod messages;

pub use handler::{websocket_routes, ws_handler, WebSocketSettings};
pub use hub::{BroadcastHub, ConnectionHandle, ConnectionId, SendFailure};
pub use messages::{InboundMessage, MessageType, OutboundMessage};
