//! Error types for the Telegram Bot API adapter.

use kestrel::PlatformError;
use thiserror::Error;

/// Descriptions the Bot API uses when a chat cannot be addressed.
const ADDRESSING_MARKERS: &[&str] = &[
    "chat not found",
    "peer_id_invalid",
    "user not found",
    "have no access",
];

/// Errors that can occur talking to the Bot API.
#[derive(Error, Debug)]
pub enum BotApiError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The Bot API answered with `ok: false`
    #[error("Bot API error {code}: {description}")]
    Api {
        code: i64,
        description: String,
        retry_after: Option<u64>,
    },

    /// The envelope was `ok` but carried no result
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Result type alias using BotApiError.
pub type BotApiResult<T> = Result<T, BotApiError>;

impl BotApiError {
    fn names_unreachable_chat(description: &str) -> bool {
        let lowered = description.to_ascii_lowercase();
        ADDRESSING_MARKERS.iter().any(|m| lowered.contains(m))
    }

    /// Classify a failure of a send-type call (forward, copy, send*, route probe).
    pub fn into_send_error(self) -> PlatformError {
        match self {
            Self::Api {
                retry_after: Some(wait_secs),
                ..
            } => PlatformError::RateLimited { wait_secs },
            Self::Api { code: 429, .. } => PlatformError::RateLimited { wait_secs: 1 },
            Self::Api {
                code: 403,
                description,
                ..
            } => PlatformError::AddressingFailure(description),
            Self::Api {
                code: 400,
                description,
                ..
            } if Self::names_unreachable_chat(&description) => {
                PlatformError::AddressingFailure(description)
            }
            other => other.into_common(),
        }
    }

    /// Classify a failure of a participant lookup.
    pub fn into_lookup_error(self) -> PlatformError {
        match self {
            Self::Api {
                retry_after: Some(wait_secs),
                ..
            } => PlatformError::RateLimited { wait_secs },
            Self::Api { code: 429, .. } => PlatformError::RateLimited { wait_secs: 1 },
            Self::Api {
                code: 400,
                description,
                ..
            } if Self::names_unreachable_chat(&description) => PlatformError::NotFound(description),
            Self::Api {
                code: 403,
                description,
                ..
            } => PlatformError::AddressingFailure(description),
            other => other.into_common(),
        }
    }

    fn into_common(self) -> PlatformError {
        match self {
            Self::Api {
                code: 401,
                description,
                ..
            } => PlatformError::Transport(format!("unauthorized: {description}")),
            Self::Api {
                code, description, ..
            } => PlatformError::Rejected { code, description },
            Self::Http(e) => PlatformError::Transport(e.to_string()),
            Self::Json(e) => PlatformError::Transport(format!("malformed response: {e}")),
            Self::InvalidResponse(detail) => PlatformError::Transport(detail),
        }
    }
}
