//! Transport abstraction layer for Crownhunt.
//!
//! Connections carry text frames. Each accepted [`Connection`] is split into
//! a [`FrameReader`] and a [`FrameWriter`] so that reading and writing run in
//! separate tasks and a slow reader never holds up outbound delivery.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    WebSocketConnection, WebSocketReader, WebSocketTransport, WebSocketWriter,
};

use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// A freshly accepted connection, before it is split.
pub trait Connection: Send + 'static {
    /// Read half.
    type Reader: FrameReader;
    /// Write half.
    type Writer: FrameWriter;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Splits the connection into independently owned halves.
    fn split(self) -> (Self::Reader, Self::Writer);
}

/// The receiving half of a connection.
pub trait FrameReader: Send + 'static {
    /// The error type for read operations.
    type Error: std::error::Error + Send + Sync;

    /// Receives the next text frame.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&mut self) -> Result<Option<String>, Self::Error>;
}

/// The sending half of a connection.
pub trait FrameWriter: Send + 'static {
    /// The error type for write operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one text frame.
    async fn send(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Closes the connection.
    async fn close(&mut self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_transport_error_messages() {
        let err = TransportError::ConnectionClosed("peer went away".into());
        assert_eq!(err.to_string(), "connection closed: peer went away");
        assert_eq!(
            TransportError::InvalidFrame.to_string(),
            "frame is not valid UTF-8"
        );
    }
}
