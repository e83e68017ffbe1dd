//! Mastodon-backed collaborators.

use async_trait::async_trait;
use deckcast_sdk::client::MastodonClient;
use deckcast_sdk::objects::{Account, DeckInfo, NewStatus, StatusVisibility};
use tracing::debug;

use super::{AccountLookup, Announcer, ServiceError, SnapshotLoader};
use crate::config::RuntimeConfig;
use crate::events::DeckId;

/// Build the Mastodon client with the configured request timeout.
pub fn build_mastodon_client(config: &RuntimeConfig) -> MastodonClient {
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    MastodonClient::new(config.base_url.clone(), config.access_token.clone())
        .with_http_client(http)
}

#[async_trait]
impl Announcer for MastodonClient {
    async fn post(&self, text: &str, visibility: StatusVisibility) -> Result<(), ServiceError> {
        let status = NewStatus {
            status: text.to_string(),
            visibility,
        };
        let posted = self.post_status(&status).await?;
        debug!(status_id = %posted.id, "Status posted");
        Ok(())
    }
}

#[async_trait]
impl AccountLookup for MastodonClient {
    async fn get(&self, account_id: i64) -> Result<Account, ServiceError> {
        Ok(self.get_account(account_id).await?)
    }
}

#[async_trait]
impl SnapshotLoader for MastodonClient {
    async fn fetch(&self, deck: DeckId) -> Result<DeckInfo, ServiceError> {
        Ok(self.get_playlist(deck.get()).await?)
    }
}
