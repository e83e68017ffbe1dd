//! Mastodon REST client.
//!
//! Covers the three endpoints the bot needs: account lookup, status
//! posting and the deck playlist snapshot.

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::{Account, DeckInfo, NewStatus, PostedStatus};

/// Typed HTTP client for a Mastodon instance that hosts music decks.
///
/// Account and status calls carry the access token as a bearer token.
/// The playlist endpoint is public and is called without credentials.
#[derive(Debug, Clone)]
pub struct MastodonClient {
    http: Client,
    base_url: Url,
    access_token: String,
}

impl MastodonClient {
    /// Create a new `MastodonClient`.
    ///
    /// * `base_url` – root URL of the instance (e.g. `https://music.pawoo.net`).
    /// * `access_token` – OAuth token of the bot account.
    pub fn new(base_url: Url, access_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            access_token: access_token.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /api/v1/accounts/{id}` – fetch the public profile of an account.
    pub async fn get_account(&self, account_id: i64) -> Result<Account, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/accounts/{account_id}"))?;

        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `POST /api/v1/statuses` – publish a status as the bot account.
    pub async fn post_status(&self, status: &NewStatus) -> Result<PostedStatus, ClientError> {
        let url = self.base_url.join("/api/v1/statuses")?;

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(status)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/v1/playlists/{deck}` – current queue and limits of a deck.
    pub async fn get_playlist(&self, deck: u16) -> Result<DeckInfo, ClientError> {
        let url = self.base_url.join(&format!("/api/v1/playlists/{deck}"))?;

        let resp = self.http.get(url).send().await?;

        parse_response(resp).await
    }
}
