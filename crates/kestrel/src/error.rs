//! Error types for Kestrel.

use thiserror::Error;

/// Structured classification of a failed platform call.
///
/// Platform adapters map their native error codes onto these variants so the
/// relay never has to inspect error text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform asked us to slow down for `wait_secs` seconds.
    #[error("Rate limited, retry after {wait_secs} seconds")]
    RateLimited { wait_secs: u64 },

    /// The target's route is invalid or not known to the addressing layer.
    #[error("Addressing failure: {0}")]
    AddressingFailure(String),

    /// No participant matches the reference.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or authentication failure talking to the platform.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Any other error the platform reported.
    #[error("Platform rejected request ({code}): {description}")]
    Rejected { code: i64, description: String },
}

/// Result type for platform calls.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Failure to turn a reference into a resolved identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// No participant exists for the reference.
    #[error("No participant found for '{0}'")]
    NotFound(String),

    /// The platform reported an error that is not a plain not-found.
    #[error("Could not resolve '{reference}': {detail}")]
    Ambiguous { reference: String, detail: String },

    /// Network or auth failure during lookup.
    #[error("Transient failure resolving '{reference}': {detail}")]
    Transient { reference: String, detail: String },
}

/// Per-message delivery failure, recorded in a `Failed` outcome.
///
/// Polls are not a failure: they end as
/// `DeliveryOutcome::Skipped(SkipReason::PollNotCopyable)`, see [`crate::delivery`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// A rate limit hit again after the single allowed backoff.
    #[error("Rate limited again after backoff (wait {0}s)")]
    RateLimited(u64),

    /// The destination route was rejected on the reconstruct path.
    #[error("Addressing failure: {0}")]
    AddressingFailure(String),

    /// The message kind has no reconstruction and the duplicate primitive failed.
    #[error("Unsupported message kind")]
    UnsupportedKind,

    /// Any other platform failure.
    #[error("{0}")]
    Other(String),
}

impl DeliveryError {
    /// Map a terminal platform failure onto the delivery taxonomy.
    pub fn from_platform(err: PlatformError) -> Self {
        match err {
            PlatformError::RateLimited { wait_secs } => Self::RateLimited(wait_secs),
            PlatformError::AddressingFailure(detail) => Self::AddressingFailure(detail),
            other => Self::Other(other.to_string()),
        }
    }
}

/// Top-level Kestrel error.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup identity resolution failed
    #[error("Failed to resolve {role}: {source}")]
    Resolution {
        role: &'static str,
        #[source]
        source: ResolutionError,
    },

    /// Platform call failed outside of per-message delivery
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Kestrel operations.
pub type RelayResult<T> = Result<T, RelayError>;
