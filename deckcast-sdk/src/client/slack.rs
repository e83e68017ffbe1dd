//! Slack incoming-webhook client.

use reqwest::Client;
use url::Url;

use super::ClientError;
use crate::objects::SlackMessage;

/// Posts messages to a single Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackWebhook {
    http: Client,
    url: Url,
}

impl SlackWebhook {
    pub fn new(url: Url) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Post a message. Slack answers `200 ok` with a plain-text body, so
    /// only the status code is checked.
    pub async fn post(&self, message: &SlackMessage) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url.clone())
            .json(message)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }
        Ok(())
    }
}
