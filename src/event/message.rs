use serde::{Deserialize, Serialize};

/// A free-form event published under an arbitrary name.
///
/// Used for topics that carry no structured data of their own, for example
/// messages pushed by websocket clients.
///
/// # Fields
///
/// - `name` - The event name subscribers register under.
/// - `payload` - The message content, usually a human readable string.
/// - `timestamp` - Unix timestamp in milliseconds of when it was created.
///
/// # Example
///
/// ```rust
/// use covbus::event::Message;
///
/// let msg = Message::new("deploys", "api v2 rolled out");
/// assert_eq!(msg.name, "deploys");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    pub payload: String,
    pub timestamp: i64,
}

impl Message {
    /// Creates a message stamped with the current time.
    ///
    /// `name` must not be empty; use [`Message::try_new`] for names that come
    /// from outside the process.
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Like [`Message::new`], but returns `None` for an empty name.
    pub fn try_new(name: &str, payload: impl Into<String>) -> Option<Self> {
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, payload))
    }
}
