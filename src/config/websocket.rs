//! WebSocket configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::websocket::WebSocketSettings;

/// Per-connection buffer sizes and queue depth.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketConfig {
    #[serde(default = "default_buffer_size")]
    pub write_buffer_size: usize,

    /// Frames queued per subscriber before the hub drops it
    #[serde(default = "default_queue_capacity")]
    pub outbound_queue_capacity: usize,

    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Must not exceed `max_message_size`
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
}

impl WebSocketConfig {
    pub fn settings(&self) -> WebSocketSettings {
        WebSocketSettings {
            write_buffer_size: self.write_buffer_size,
            outbound_queue_capacity: self.outbound_queue_capacity,
            max_message_size: self.max_message_size,
            max_frame_size: self.max_frame_size,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.write_buffer_size == 0 {
            return Err(ValidationError::InvalidWebSocketSetting("WRITE_BUFFER_SIZE"));
        }
        if self.outbound_queue_capacity == 0 {
            return Err(ValidationError::InvalidWebSocketSetting(
                "OUTBOUND_QUEUE_CAPACITY",
            ));
        }
        if self.max_message_size == 0 {
            return Err(ValidationError::InvalidWebSocketSetting("MAX_MESSAGE_SIZE"));
        }
        if self.max_frame_size == 0 || self.max_frame_size > self.max_message_size {
            return Err(ValidationError::InvalidWebSocketSetting("MAX_FRAME_SIZE"));
        }
        Ok(())
    }
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        let settings = WebSocketSettings::default();
        Self {
            write_buffer_size: settings.write_buffer_size,
            outbound_queue_capacity: settings.outbound_queue_capacity,
            max_message_size: settings.max_message_size,
            max_frame_size: settings.max_frame_size,
        }
    }
}

fn default_buffer_size() -> usize {
    WebSocketSettings::default().write_buffer_size
}

fn default_queue_capacity() -> usize {
    WebSocketSettings::default().outbound_queue_capacity
}

fn default_max_message_size() -> usize {
    WebSocketSettings::default().max_message_size
}

fn default_max_frame_size() -> usize {
    WebSocketSettings::default().max_frame_size
}
