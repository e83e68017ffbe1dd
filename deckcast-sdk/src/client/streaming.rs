//! Playlist streaming client.
//!
//! Each deck has its own WebSocket subscription on the Mastodon streaming
//! endpoint, selected with `stream=playlist&deck={n}` and authenticated
//! with the `access_token` query parameter. Reconnects use the identical
//! URL.

use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use super::ClientError;

/// An open streaming connection for one deck.
pub type DeckStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Dials the playlist stream of a deck.
#[derive(Debug, Clone)]
pub struct StreamingClient {
    endpoint: Url,
    access_token: String,
}

impl StreamingClient {
    /// * `endpoint` – streaming root, e.g. `wss://music.pawoo.net/api/v1/streaming/`.
    /// * `access_token` – OAuth token of the bot account.
    pub fn new(endpoint: Url, access_token: impl Into<String>) -> Self {
        Self {
            endpoint,
            access_token: access_token.into(),
        }
    }

    /// The subscription URL for `deck`.
    pub fn deck_url(&self, deck: u16) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("access_token", &self.access_token)
            .append_pair("stream", "playlist")
            .append_pair("deck", &deck.to_string());
        url
    }

    /// Open the WebSocket subscription for `deck`.
    pub async fn connect(&self, deck: u16) -> Result<DeckStream, ClientError> {
        let url = self.deck_url(deck);
        let (stream, _response) = connect_async(url.as_str()).await?;
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_url_parameters() {
        let client = StreamingClient::new(
            Url::parse("wss://music.pawoo.net/api/v1/streaming/").unwrap(),
            "tok en",
        );
        let url = client.deck_url(3);
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/api/v1/streaming/");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("access_token".to_string(), "tok en".to_string()),
                ("stream".to_string(), "playlist".to_string()),
                ("deck".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_deck_url_is_stable_across_calls() {
        let client = StreamingClient::new(
            Url::parse("wss://example.com/api/v1/streaming/?stale=1").unwrap(),
            "t",
        );
        assert_eq!(client.deck_url(1), client.deck_url(1));
        assert!(!client.deck_url(1).as_str().contains("stale"));
    }
}
