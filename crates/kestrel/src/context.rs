//! Startup context.
//!
//! The resolved Source and Destination are established once at startup and
//! then handed, read-only, to the listener. Nothing else holds them.

use crate::error::{RelayError, RelayResult};
use crate::identity::{IdentityResolver, ResolvedIdentity};
use crate::warmer::{CacheState, PeerWarmer};
use tracing::{error, info};

/// The two endpoints of the relay and their route state at startup.
#[derive(Debug, Clone)]
pub struct RelayContext {
    source: ResolvedIdentity,
    destination: ResolvedIdentity,
    source_cache: CacheState,
    destination_cache: CacheState,
}

impl RelayContext {
    /// Build a context from already resolved identities, with unknown route state.
    pub fn new(source: ResolvedIdentity, destination: ResolvedIdentity) -> Self {
        Self {
            source,
            destination,
            source_cache: CacheState::Unknown,
            destination_cache: CacheState::Unknown,
        }
    }

    /// Resolve both references and warm both peers.
    ///
    /// Failing to resolve either reference is fatal. Warming never is.
    pub async fn establish(
        resolver: &IdentityResolver,
        warmer: &PeerWarmer,
        source_ref: &str,
        destination_ref: &str,
    ) -> RelayResult<Self> {
        info!("Resolving contacts...");

        let source = resolver.resolve(source_ref).await.map_err(|e| {
            error!(reference = %source_ref, error = %e, "Failed to resolve source");
            RelayError::Resolution {
                role: "source",
                source: e,
            }
        })?;
        let destination = resolver.resolve(destination_ref).await.map_err(|e| {
            error!(reference = %destination_ref, error = %e, "Failed to resolve destination");
            RelayError::Resolution {
                role: "destination",
                source: e,
            }
        })?;

        let source_cache = warmer.warm(&source).await;
        let destination_cache = warmer.warm(&destination).await;

        info!(
            source = %source,
            source_cache = %source_cache,
            destination = %destination,
            destination_cache = %destination_cache,
            "Relay context established"
        );

        Ok(Self {
            source,
            destination,
            source_cache,
            destination_cache,
        })
    }

    pub fn source(&self) -> &ResolvedIdentity {
        &self.source
    }

    pub fn destination(&self) -> &ResolvedIdentity {
        &self.destination
    }

    pub fn source_cache(&self) -> CacheState {
        self.source_cache
    }

    pub fn destination_cache(&self) -> CacheState {
        self.destination_cache
    }
}
