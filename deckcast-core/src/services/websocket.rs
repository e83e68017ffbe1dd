//! WebSocket implementation of the deck transport.

use async_trait::async_trait;
use deckcast_sdk::client::{ClientError, DeckStream, StreamingClient};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use super::transport::{DeckConnector, DeckTransport, Inbound, TransportError};
use crate::events::DeckId;

/// Dials `stream=playlist&deck={n}` on the Mastodon streaming endpoint.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    client: StreamingClient,
}

impl WebSocketConnector {
    pub fn new(client: StreamingClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DeckConnector for WebSocketConnector {
    type Transport = WebSocketTransport;

    async fn connect(&self, deck: DeckId) -> Result<Self::Transport, TransportError> {
        match self.client.connect(deck.get()).await {
            Ok(stream) => Ok(WebSocketTransport { stream }),
            Err(ClientError::WebSocket(e)) => Err(TransportError::WebSocket(e)),
            Err(e) => Err(TransportError::Dial(e.to_string())),
        }
    }
}

/// An open deck stream.
pub struct WebSocketTransport {
    stream: DeckStream,
}

#[async_trait]
impl DeckTransport for WebSocketTransport {
    async fn recv(&mut self) -> Option<Result<Inbound, TransportError>> {
        let message = match self.stream.next().await? {
            Ok(message) => message,
            Err(e) => return Some(Err(e.into())),
        };

        let inbound = match message {
            Message::Text(text) => Inbound::Text(text.to_string()),
            Message::Binary(data) => match String::from_utf8(data.to_vec()) {
                Ok(text) => Inbound::Text(text),
                Err(_) => Inbound::Other,
            },
            Message::Pong(_) => Inbound::Pong,
            Message::Close(_) => Inbound::Closed,
            // Server pings are answered by tungstenite on the next read.
            Message::Ping(_) | Message::Frame(_) => Inbound::Other,
        };
        Some(Ok(inbound))
    }

    async fn ping(&mut self) -> Result<(), TransportError> {
        self.stream.send(Message::Ping(Default::default())).await?;
        Ok(())
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
