//! Identity resolution.
//!
//! Turns a human-supplied reference (`12345`, `-100123`, `@alice`, `alice`)
//! into a platform-stable identifier, confirming the participant exists.
//! Resolution is read-only: the only side effect is the lookup call.

use crate::error::{PlatformError, ResolutionError};
use crate::platform::{ParticipantRef, PeerId, Platform};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A participant whose reference has been resolved. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    id: PeerId,
    display_name: String,
    handle: Option<String>,
}

impl ResolvedIdentity {
    pub fn new(id: PeerId, display_name: impl Into<String>, handle: Option<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            handle,
        }
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }
}

impl fmt::Display for ResolvedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.handle {
            Some(handle) => write!(f, "{} (@{}, {})", self.display_name, handle, self.id),
            None => write!(f, "{} ({})", self.display_name, self.id),
        }
    }
}

/// Resolves references against the platform's participant directory.
pub struct IdentityResolver {
    platform: Arc<dyn Platform>,
}

impl IdentityResolver {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Resolve `reference` to a stable identity.
    ///
    /// Numeric references are taken as the identifier and only confirmed by
    /// the lookup. Handles are looked up by name.
    pub async fn resolve(&self, reference: &str) -> Result<ResolvedIdentity, ResolutionError> {
        let parsed = ParticipantRef::parse(reference);
        debug!(reference = %parsed, "Resolving participant");

        if matches!(&parsed, ParticipantRef::Handle(handle) if handle.is_empty()) {
            return Err(ResolutionError::NotFound(reference.to_string()));
        }

        let participant = match self.platform.lookup_participant(&parsed).await {
            Ok(participant) => participant,
            Err(e) => {
                warn!(reference = %parsed, error = %e, "Participant lookup failed");
                return Err(classify_lookup_failure(&parsed, e));
            }
        };

        let id = match parsed {
            ParticipantRef::Id(id) => id,
            ParticipantRef::Handle(_) => participant.id,
        };

        let identity = ResolvedIdentity::new(id, participant.display_name, participant.handle);
        info!(reference = %reference.trim(), identity = %identity, "Participant resolved");
        Ok(identity)
    }
}

fn classify_lookup_failure(reference: &ParticipantRef, err: PlatformError) -> ResolutionError {
    let name = match reference {
        ParticipantRef::Id(id) => id.to_string(),
        ParticipantRef::Handle(handle) => handle.clone(),
    };

    match err {
        PlatformError::Transport(detail) => ResolutionError::Transient {
            reference: name,
            detail,
        },
        PlatformError::RateLimited { wait_secs } => ResolutionError::Transient {
            reference: name,
            detail: format!("rate limited for {}s", wait_secs),
        },
        PlatformError::NotFound(_) | PlatformError::AddressingFailure(_) => {
            ResolutionError::NotFound(name)
        }
        // A numeric id that cannot be confirmed does not exist for us.
        PlatformError::Rejected { .. } if matches!(reference, ParticipantRef::Id(_)) => {
            ResolutionError::NotFound(name)
        }
        PlatformError::Rejected { code, description } => ResolutionError::Ambiguous {
            reference: name,
            detail: format!("{} ({})", description, code),
        },
    }
}
