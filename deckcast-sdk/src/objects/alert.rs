//! Slack incoming-webhook payload.

use serde::{Deserialize, Serialize};

/// A message posted to a Slack incoming webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackAttachment {
    pub text: String,
}

impl SlackMessage {
    /// Build a message with an optional detail block (e.g. a backtrace).
    pub fn new(text: impl Into<String>, detail: Option<&str>) -> Self {
        Self {
            text: text.into(),
            attachments: detail
                .map(|text| {
                    vec![SlackAttachment {
                        text: text.to_string(),
                    }]
                })
                .unwrap_or_default(),
        }
    }
}
