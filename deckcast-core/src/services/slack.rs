//! Slack-backed alert sink.

use async_trait::async_trait;
use deckcast_sdk::client::SlackWebhook;
use deckcast_sdk::objects::SlackMessage;

use super::{AlertSink, ServiceError};
use crate::events::Alert;

#[async_trait]
impl AlertSink for SlackWebhook {
    async fn notify(&self, alert: &Alert) -> Result<(), ServiceError> {
        let message = SlackMessage::new(alert.message.clone(), alert.detail.as_deref());
        self.post(&message).await?;
        Ok(())
    }
}
