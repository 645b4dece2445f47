//! The `transport` module streams events to websocket clients.
//!
//! Each connection becomes a [`StreamWriter`](crate::subscriber::StreamWriter)
//! that the client can subscribe to event names. It defines the JSON frames
//! exchanged with clients and the server that accepts connections and
//! forwards client requests to the roster and broker.

pub mod message;
pub mod websocket;
