//! TOML file configuration structures.
//!
//! These structs directly map to the `deckcast.toml` file format. Every
//! section and field is optional; a missing field takes its default.

use deckcast_sdk::objects::StatusVisibility;
use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub mastodon: MastodonConfig,
    pub decks: DecksConfig,
    pub connection: ConnectionConfig,
    pub alerts: AlertsConfig,
}

/// Mastodon instance section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MastodonConfig {
    /// Root of the REST API.
    pub base_url: Url,
    /// Root of the streaming API.
    pub streaming_url: Url,
    /// Visibility of announcement statuses.
    pub visibility: StatusVisibility,
    pub request_timeout_secs: u64,
}

impl Default for MastodonConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            streaming_url: default_streaming_url(),
            visibility: StatusVisibility::default(),
            request_timeout_secs: 60,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("https://music.pawoo.net").expect("valid default URL")
}

fn default_streaming_url() -> Url {
    Url::parse("wss://music.pawoo.net/api/v1/streaming/").expect("valid default URL")
}

/// Decks to follow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecksConfig {
    pub ids: Vec<u16>,
}

impl Default for DecksConfig {
    fn default() -> Self {
        Self {
            ids: (1..=6).collect(),
        }
    }
}

/// Heartbeat, rotation and reconnect timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub heartbeat_interval_secs: u64,
    pub liveness_timeout_secs: u64,
    pub rotation_interval_secs: u64,
    pub dial_timeout_secs: u64,
    pub reconnect_min_delay_ms: u64,
    pub reconnect_max_delay_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 60,
            liveness_timeout_secs: 3,
            rotation_interval_secs: 600,
            dial_timeout_secs: 30,
            reconnect_min_delay_ms: 1_000,
            reconnect_max_delay_ms: 30_000,
        }
    }
}

/// Where alerts go.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Slack incoming webhook. `SLACK_INCOMING_URL` takes precedence.
    pub slack_webhook_url: Option<Url>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[mastodon]
base_url = "https://music.example.com"
streaming_url = "wss://music.example.com/api/v1/streaming/"
visibility = "public"
request_timeout_secs = 10

[decks]
ids = [1, 3]

[connection]
heartbeat_interval_secs = 30
liveness_timeout_secs = 5
rotation_interval_secs = 300
reconnect_min_delay_ms = 500
reconnect_max_delay_ms = 10000

[alerts]
slack_webhook_url = "https://hooks.slack.com/services/T/B/X"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.mastodon.base_url.host_str(), Some("music.example.com"));
        assert_eq!(config.mastodon.visibility, StatusVisibility::Public);
        assert_eq!(config.mastodon.request_timeout_secs, 10);
        assert_eq!(config.decks.ids, vec![1, 3]);
        assert_eq!(config.connection.heartbeat_interval_secs, 30);
        assert_eq!(config.connection.reconnect_max_delay_ms, 10_000);
        assert!(config.alerts.slack_webhook_url.is_some());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.mastodon.base_url.as_str(), "https://music.pawoo.net/");
        assert_eq!(config.mastodon.visibility, StatusVisibility::Unlisted);
        assert_eq!(config.decks.ids, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(config.connection.liveness_timeout_secs, 3);
        assert_eq!(config.connection.rotation_interval_secs, 600);
        assert_eq!(config.connection.dial_timeout_secs, 30);
        assert!(config.alerts.slack_webhook_url.is_none());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: FileConfig = toml::from_str("[connection]\nrotation_interval_secs = 120\n").unwrap();
        assert_eq!(config.connection.rotation_interval_secs, 120);
        assert_eq!(config.connection.heartbeat_interval_secs, 60);
    }
}
