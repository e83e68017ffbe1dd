//! Collaborators the processors talk to.
//!
//! Each collaborator is a trait so that processors can be driven by
//! in-memory fakes in tests. Production implementations are thin adapters
//! over the `deckcast-sdk` clients:
//!
//! - [`Announcer`], [`AccountLookup`], [`SnapshotLoader`]: `MastodonClient`
//! - [`AlertSink`]: `SlackWebhook`
//! - [`DeckConnector`] / [`DeckTransport`]: `StreamingClient`

mod mastodon;
mod slack;
mod transport;
mod websocket;

pub use mastodon::build_mastodon_client;
pub use transport::{DeckConnector, DeckTransport, Inbound, TransportError};
pub use websocket::{WebSocketConnector, WebSocketTransport};

use async_trait::async_trait;
use deckcast_sdk::client::ClientError;
use deckcast_sdk::objects::{Account, DeckInfo, StatusVisibility};
use thiserror::Error;

use crate::events::{Alert, DeckId};

/// Errors returned by collaborator calls.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The underlying HTTP client failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The collaborator is not reachable or refused the call.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Publishes announcement text.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn post(&self, text: &str, visibility: StatusVisibility) -> Result<(), ServiceError>;
}

/// Resolves an account id to a displayable profile.
#[async_trait]
pub trait AccountLookup: Send + Sync {
    async fn get(&self, account_id: i64) -> Result<Account, ServiceError>;
}

/// Delivers operator alerts.
///
/// Callers go through [`AlertHandle`](crate::events::AlertHandle), which
/// queues alerts without blocking; only the alert forwarder calls this.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify(&self, alert: &Alert) -> Result<(), ServiceError>;
}

/// Fetches the current queue of a deck.
#[async_trait]
pub trait SnapshotLoader: Send + Sync {
    async fn fetch(&self, deck: DeckId) -> Result<DeckInfo, ServiceError>;
}
