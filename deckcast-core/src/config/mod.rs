//! Runtime configuration types for deckcast.
//!
//! These types represent the validated runtime configuration used by the
//! processors. Loading and validating the TOML file is handled by the daemon
//! crate.

mod timing;

pub use timing::ConnectionTiming;

use deckcast_sdk::objects::StatusVisibility;
use url::Url;

use crate::events::DeckId;

/// Everything the processors need at runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Root URL of the Mastodon instance (REST API).
    pub base_url: Url,
    /// Streaming root the deck subscriptions are opened on.
    pub streaming_url: Url,
    /// Bot account OAuth token.
    pub access_token: String,
    /// Timeout applied to every REST call.
    pub request_timeout: std::time::Duration,
    /// Visibility of announcement statuses.
    pub visibility: StatusVisibility,
    /// The fixed set of decks to follow.
    pub decks: Vec<DeckId>,
    /// Heartbeat, rotation and reconnect timing.
    pub timing: ConnectionTiming,
    /// Slack incoming webhook for alerts. Alerts are only logged when unset.
    pub slack_webhook_url: Option<Url>,
}
