//! Wire envelopes for the order WebSocket.
//!
//! Every frame in either direction is JSON text shaped `{type, data}`.
//! Requests carry `add_item`, `delete_item` or `update_order`; broadcasts
//! reuse the request type, and failures come back as `error` with a plain
//! string in `data`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message types on the order channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    AddItem,
    DeleteItem,
    UpdateOrder,
    Error,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::AddItem => "add_item",
            MessageType::DeleteItem => "delete_item",
            MessageType::UpdateOrder => "update_order",
            MessageType::Error => "error",
        }
    }

    /// Maps an inbound `type` string to a request type.
    ///
    /// `error` is outbound only, so it is not accepted here.
    pub fn parse_request(raw: &str) -> Option<Self> {
        match raw {
            "add_item" => Some(MessageType::AddItem),
            "delete_item" => Some(MessageType::DeleteItem),
            "update_order" => Some(MessageType::UpdateOrder),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client frame before its payload is interpreted.
///
/// `type` stays a raw string so an unknown value can be told apart from a
/// frame that is not an envelope at all.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub data: Value,
}

impl InboundMessage {
    pub fn decode(frame: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(frame)
    }
}

/// Server frame.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage<'a, T: Serialize> {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub data: &'a T,
}

impl<'a, T: Serialize> OutboundMessage<'a, T> {
    /// Serializes `{type, data}` to a text frame.
    pub fn encode(message_type: MessageType, data: &'a T) -> Result<String, serde_json::Error> {
        serde_json::to_string(&OutboundMessage { message_type, data })
    }
}

/// Error texts sent back to the originating connection.
pub mod error_text {
    pub const MALFORMED_FRAME: &str = "failed to unmarshal message";
    pub const UNKNOWN_TYPE: &str = "unknown request type";
    pub const INVALID_PAYLOAD: &str = "dto validation failed";
    pub const ADD_ITEM_FAILED: &str = "failed to add item to order";
    pub const DELETE_ITEM_FAILED: &str = "failed to delete item from an order";
    pub const UPDATE_ORDER_FAILED: &str = "failed to update an order";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_type_serializes_snake_case() {
        assert_eq!(serde_json::to_value(MessageType::AddItem).unwrap(), "add_item");
        assert_eq!(
            serde_json::to_value(MessageType::UpdateOrder).unwrap(),
            "update_order"
        );
        assert_eq!(MessageType::DeleteItem.to_string(), "delete_item");
    }

    #[test]
    fn parse_request_rejects_error_and_unknown() {
        assert_eq!(MessageType::parse_request("add_item"), Some(MessageType::AddItem));
        assert_eq!(MessageType::parse_request("error"), None);
        assert_eq!(MessageType::parse_request("ping"), None);
    }

    #[test]
    fn inbound_envelope_keeps_raw_type() {
        let msg = InboundMessage::decode(br#"{"type":"dance","data":{"x":1}}"#).unwrap();
        assert_eq!(msg.message_type, "dance");
        assert_eq!(msg.data, json!({"x": 1}));
    }

    #[test]
    fn inbound_envelope_without_data_defaults_to_null() {
        let msg = InboundMessage::decode(br#"{"type":"update_order"}"#).unwrap();
        assert!(msg.data.is_null());
    }

    #[test]
    fn inbound_non_envelope_fails() {
        assert!(InboundMessage::decode(b"not json").is_err());
        assert!(InboundMessage::decode(br#"{"data":{}}"#).is_err());
    }

    #[test]
    fn outbound_error_carries_plain_string() {
        let frame = OutboundMessage::encode(MessageType::Error, &error_text::UNKNOWN_TYPE).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&frame).unwrap(),
            json!({"type": "error", "data": "unknown request type"})
        );
    }
}
