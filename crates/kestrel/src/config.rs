//! Configuration for Kestrel.

use crate::error::{RelayError, RelayResult};
use std::path::PathBuf;
use std::time::Duration;

/// Default Telegram Bot API base URL.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default cap on conversations scanned while warming a peer.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Default delay that lets the platform's cache settle before re-probing.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Default long-poll timeout for the inbound feed.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Bot API credential
    pub bot_token: String,

    /// Bot API base URL
    pub api_base_url: String,

    /// Reference to the contact whose messages are relayed
    pub source: String,

    /// Reference to the contact that receives them
    pub destination: String,

    /// Max conversations scanned while warming
    pub conversation_page_size: usize,

    /// Wait before re-probing a route found in the conversation list
    pub warm_settle_delay: Duration,

    /// Long-poll timeout for the inbound feed
    pub poll_timeout: Duration,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Optional JSONL log file, in addition to stderr
    pub log_file: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: DEFAULT_API_URL.to_string(),
            source: String::new(),
            destination: String::new(),
            conversation_page_size: DEFAULT_PAGE_SIZE,
            warm_settle_delay: DEFAULT_SETTLE_DELAY,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
        }
    }
}

impl RelayConfig {
    /// Build a config from defaults overridden by environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    fn load_from_env(&mut self) {
        if let Ok(token) = std::env::var("KESTREL_BOT_TOKEN") {
            self.bot_token = token;
        }
        if let Ok(url) = std::env::var("KESTREL_API_URL") {
            self.api_base_url = url;
        }
        if let Ok(source) = std::env::var("KESTREL_SOURCE") {
            self.source = source;
        }
        if let Ok(destination) = std::env::var("KESTREL_DESTINATION") {
            self.destination = destination;
        }
        if let Some(page_size) = std::env::var("KESTREL_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.conversation_page_size = page_size;
        }
        if let Some(ms) = std::env::var("KESTREL_SETTLE_MS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.warm_settle_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = std::env::var("KESTREL_POLL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.poll_timeout = Duration::from_secs(secs);
        }
        if let Ok(level) = std::env::var("KESTREL_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(path) = std::env::var("KESTREL_LOG_FILE") {
            if !path.is_empty() {
                self.log_file = Some(PathBuf::from(path));
            }
        }
    }

    /// Check that every required field is present, reporting all missing ones at once.
    pub fn validate(&self) -> RelayResult<()> {
        let required = [
            ("KESTREL_BOT_TOKEN", &self.bot_token),
            ("KESTREL_SOURCE", &self.source),
            ("KESTREL_DESTINATION", &self.destination),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(RelayError::Config(format!(
                "Missing required configuration: {}",
                missing.join(", ")
            )));
        }

        if self.conversation_page_size == 0 {
            return Err(RelayError::Config(
                "KESTREL_PAGE_SIZE must be greater than zero".to_string(),
            ));
        }

        if self.poll_timeout.is_zero() {
            return Err(RelayError::Config(
                "KESTREL_POLL_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
