//! Transport abstraction for deck connections.

use async_trait::async_trait;
use thiserror::Error;

use crate::events::DeckId;

/// Dial, read or ping failure on a deck connection.
#[derive(Debug, Error)]
pub enum TransportError {
    /// WebSocket protocol or I/O error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The connection could not be established.
    #[error("dial failed: {0}")]
    Dial(String),
}

/// What a transport delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A text frame, to be decoded by the codec.
    Text(String),
    /// Answer to a ping.
    Pong,
    /// The peer closed the connection.
    Closed,
    /// Anything else (server pings, binary junk, raw frames).
    Other,
}

/// Opens connections for a deck. Every call yields a fresh, independent
/// connection using the same parameters.
#[async_trait]
pub trait DeckConnector: Send + Sync {
    type Transport: DeckTransport;

    async fn connect(&self, deck: DeckId) -> Result<Self::Transport, TransportError>;
}

/// One open connection.
///
/// `recv` must be cancel-safe: the supervisor polls it inside `select!`.
#[async_trait]
pub trait DeckTransport: Send {
    /// Next inbound item, or `None` once the stream has ended.
    async fn recv(&mut self) -> Option<Result<Inbound, TransportError>>;

    /// Send a liveness ping. The pong arrives through [`recv`](Self::recv).
    async fn ping(&mut self) -> Result<(), TransportError>;

    /// Close the connection. Errors are ignored; the connection is being
    /// discarded anyway.
    async fn close(&mut self);
}
