use serde::{Deserialize, Serialize};

use crate::event::EVENT_COVERAGE;

fn default_event() -> String {
    EVENT_COVERAGE.to_string()
}

/// Frames a streaming client may send.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Start receiving events named `event` (coverage events by default).
    #[serde(rename = "subscribe")]
    Subscribe {
        #[serde(default = "default_event")]
        event: String,
    },

    /// Drop every subscription this connection holds for `event`.
    #[serde(rename = "unsubscribe")]
    Unsubscribe {
        #[serde(default = "default_event")]
        event: String,
    },

    /// Publish a free-form message event.
    #[serde(rename = "publish")]
    Publish { name: String, payload: String },
}

/// Frames the server sends to streaming clients.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "subscribed")]
    Subscribed { id: String },

    #[serde(rename = "unsubscribed")]
    Unsubscribed { event: String, removed: usize },

    #[serde(rename = "event")]
    Event { name: String, data: String },

    #[serde(rename = "error")]
    Error { message: String },
}
