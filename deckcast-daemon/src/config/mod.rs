//! Configuration module for deckcast-daemon.
//!
//! Handles loading configuration from the TOML file, CLI arguments,
//! and environment variables, and validating the result.

pub mod file;
pub mod runtime;

use crate::config::file::{ConnectionConfig, FileConfig};
use crate::config::runtime::{ConnectionTiming, DeckId, RuntimeConfig};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("MASTODON_ACCESS_TOKEN environment variable not set")]
    MissingAccessToken,
}

/// Values that come from the command line or the environment rather than
/// the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Decks given with `--deck`; replaces `[decks].ids` when non-empty.
    pub decks: Vec<u16>,
    /// `MASTODON_ACCESS_TOKEN`.
    pub access_token: Option<String>,
    /// `SLACK_INCOMING_URL`; replaces `[alerts].slack_webhook_url`.
    pub slack_webhook_url: Option<Url>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    overrides: Overrides,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            overrides,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI and environment overrides
    /// 3. Validate the configuration
    /// 4. Build the runtime configuration
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let config_content =
            std::fs::read_to_string(&self.config_path).map_err(|source| ConfigError::IoError {
                path: self.config_path.clone(),
                source,
            })?;
        let file_config: FileConfig = toml::from_str(&config_content)?;
        self.build(file_config)
    }

    /// Apply overrides to an already parsed file and validate it.
    pub fn build(&self, mut file_config: FileConfig) -> Result<RuntimeConfig, ConfigError> {
        if !self.overrides.decks.is_empty() {
            file_config.decks.ids = self.overrides.decks.clone();
        }
        if let Some(url) = &self.overrides.slack_webhook_url {
            file_config.alerts.slack_webhook_url = Some(url.clone());
        }

        self.validate(&file_config)?;

        let access_token = self
            .overrides
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingAccessToken)?
            .to_string();

        Ok(RuntimeConfig {
            base_url: file_config.mastodon.base_url,
            streaming_url: file_config.mastodon.streaming_url,
            access_token,
            request_timeout: Duration::from_secs(file_config.mastodon.request_timeout_secs),
            visibility: file_config.mastodon.visibility,
            decks: file_config.decks.ids.into_iter().map(DeckId).collect(),
            timing: convert_timing(&file_config.connection),
            slack_webhook_url: file_config.alerts.slack_webhook_url,
        })
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let ids = &config.decks.ids;
        if ids.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one deck must be configured".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
            return Err(ConfigError::ValidationError(format!(
                "deck {dup} is listed more than once"
            )));
        }

        if !matches!(config.mastodon.streaming_url.scheme(), "ws" | "wss") {
            return Err(ConfigError::ValidationError(format!(
                "streaming_url must be a ws:// or wss:// URL, got {}",
                config.mastodon.streaming_url
            )));
        }
        if config.mastodon.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        let c = &config.connection;
        for (name, value) in [
            ("heartbeat_interval_secs", c.heartbeat_interval_secs),
            ("liveness_timeout_secs", c.liveness_timeout_secs),
            ("rotation_interval_secs", c.rotation_interval_secs),
            ("dial_timeout_secs", c.dial_timeout_secs),
            ("reconnect_min_delay_ms", c.reconnect_min_delay_ms),
            ("reconnect_max_delay_ms", c.reconnect_max_delay_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        if c.liveness_timeout_secs >= c.heartbeat_interval_secs {
            return Err(ConfigError::ValidationError(
                "liveness_timeout_secs must be shorter than heartbeat_interval_secs".to_string(),
            ));
        }
        if c.reconnect_min_delay_ms > c.reconnect_max_delay_ms {
            return Err(ConfigError::ValidationError(
                "reconnect_min_delay_ms must not exceed reconnect_max_delay_ms".to_string(),
            ));
        }
        Ok(())
    }
}

fn convert_timing(c: &ConnectionConfig) -> ConnectionTiming {
    ConnectionTiming {
        heartbeat_interval: Duration::from_secs(c.heartbeat_interval_secs),
        liveness_timeout: Duration::from_secs(c.liveness_timeout_secs),
        rotation_interval: Duration::from_secs(c.rotation_interval_secs),
        dial_timeout: Duration::from_secs(c.dial_timeout_secs),
        reconnect_min_delay: Duration::from_millis(c.reconnect_min_delay_ms),
        reconnect_max_delay: Duration::from_millis(c.reconnect_max_delay_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(overrides: Overrides) -> ConfigLoader {
        ConfigLoader::new("./deckcast.toml", overrides)
    }

    fn with_token() -> Overrides {
        Overrides {
            access_token: Some("token".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_build_runtime_config() {
        let config = loader(with_token()).build(FileConfig::default()).unwrap();
        assert_eq!(config.decks.len(), 6);
        assert_eq!(config.access_token, "token");
        assert_eq!(config.timing, ConnectionTiming::default());
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.slack_webhook_url.is_none());
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let err = loader(Overrides::default())
            .build(FileConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingAccessToken));

        let blank = Overrides {
            access_token: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(loader(blank).build(FileConfig::default()).is_err());
    }

    #[test]
    fn test_cli_decks_and_env_webhook_override_file() {
        let mut file = FileConfig::default();
        file.alerts.slack_webhook_url = Some(Url::parse("https://file.example/hook").unwrap());

        let overrides = Overrides {
            decks: vec![2, 5],
            slack_webhook_url: Some(Url::parse("https://env.example/hook").unwrap()),
            ..with_token()
        };
        let config = loader(overrides).build(file).unwrap();
        assert_eq!(config.decks, vec![DeckId(2), DeckId(5)]);
        assert_eq!(
            config.slack_webhook_url.unwrap().as_str(),
            "https://env.example/hook"
        );
    }

    #[test]
    fn test_duplicate_decks_are_rejected() {
        let mut file = FileConfig::default();
        file.decks.ids = vec![1, 2, 1];
        let err = loader(with_token()).build(file).unwrap_err();
        assert!(err.to_string().contains("deck 1"));
    }

    #[test]
    fn test_empty_decks_are_rejected() {
        let mut file = FileConfig::default();
        file.decks.ids.clear();
        assert!(loader(with_token()).build(file).is_err());
    }

    #[test]
    fn test_timeout_must_be_shorter_than_heartbeat() {
        let mut file = FileConfig::default();
        file.connection.liveness_timeout_secs = 60;
        assert!(loader(with_token()).build(file).is_err());
    }

    #[test]
    fn test_backoff_bounds_are_ordered() {
        let mut file = FileConfig::default();
        file.connection.reconnect_min_delay_ms = 60_000;
        assert!(loader(with_token()).build(file).is_err());
    }

    #[test]
    fn test_streaming_url_must_be_websocket() {
        let mut file = FileConfig::default();
        file.mastodon.streaming_url = Url::parse("https://music.pawoo.net/api/v1/streaming/").unwrap();
        assert!(loader(with_token()).build(file).is_err());
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = ConfigLoader::new("/nonexistent/deckcast.toml", with_token())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }
}
