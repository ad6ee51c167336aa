//! Peer cache warming.
//!
//! Before the first delivery, the platform's addressing layer may not know how
//! to reach a freshly resolved peer. Warming exercises the addressing layer with
//! progressively more expensive strategies so the first send is less likely to
//! fail. It is advisory: delivery still runs when warming ends `Unreachable`.

use crate::error::PlatformResult;
use crate::identity::ResolvedIdentity;
use crate::platform::{OutboundPayload, PeerId, Platform};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default introduction text for `introduce`.
pub const DEFAULT_INTRODUCTION: &str =
    "Hi! This is an automated message from a message relay. You can safely ignore it.";

/// What we know about the route to a resolved peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheState {
    #[default]
    Unknown,
    /// A direct probe was attempted and did not succeed yet.
    Probed,
    /// A route is confirmed.
    Warmed,
    /// No strategy found a route.
    Unreachable,
}

impl CacheState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Probed => "probed",
            Self::Warmed => "warmed",
            Self::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives a peer's [`CacheState`] to `Warmed` or `Unreachable`.
pub struct PeerWarmer {
    platform: Arc<dyn Platform>,
    page_size: usize,
    settle_delay: Duration,
    states: Mutex<HashMap<PeerId, CacheState>>,
}

impl PeerWarmer {
    pub fn new(platform: Arc<dyn Platform>, page_size: usize, settle_delay: Duration) -> Self {
        Self {
            platform,
            page_size,
            settle_delay,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Last known state for `peer`; `Unknown` if it was never warmed.
    pub fn state_of(&self, peer: PeerId) -> CacheState {
        self.states
            .lock()
            .map(|states| states.get(&peer).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    fn record(&self, peer: PeerId, state: CacheState) -> CacheState {
        if let Ok(mut states) = self.states.lock() {
            states.insert(peer, state);
        }
        state
    }

    /// Warm the route to `identity`. Never fails: lookup errors degrade to
    /// `Unreachable`.
    pub async fn warm(&self, identity: &ResolvedIdentity) -> CacheState {
        let peer = identity.id();

        // 1. Direct probe.
        match self.platform.resolve_route(peer).await {
            Ok(()) => {
                info!(peer = %peer, "Route confirmed by direct probe");
                return self.record(peer, CacheState::Warmed);
            }
            Err(e) => debug!(peer = %peer, error = %e, "Direct route probe failed"),
        }
        self.record(peer, CacheState::Probed);

        // 2. Look for the peer among recent conversations, let the cache settle, re-probe.
        match self.platform.list_recent_conversations(self.page_size).await {
            Ok(conversations) => {
                debug!(
                    peer = %peer,
                    fetched = conversations.len(),
                    page_size = self.page_size,
                    "Scanned recent conversations"
                );
                if let Some(position) = conversations.iter().position(|p| *p == peer) {
                    debug!(peer = %peer, position = position + 1, "Peer found in recent conversations");
                    tokio::time::sleep(self.settle_delay).await;
                    match self.platform.resolve_route(peer).await {
                        Ok(()) => {
                            info!(peer = %peer, "Route confirmed after conversation scan");
                            return self.record(peer, CacheState::Warmed);
                        }
                        Err(e) => debug!(peer = %peer, error = %e, "Re-probe failed"),
                    }
                }
            }
            Err(e) => {
                debug!(peer = %peer, error = %e, "Could not list recent conversations");
            }
        }

        // 3. Give up.
        warn!(
            peer = %peer,
            name = %identity.display_name(),
            "No route to peer; delivery may fail until either party starts a conversation"
        );
        self.record(peer, CacheState::Unreachable)
    }

    /// Establish a conversation with `identity` when no route exists yet.
    ///
    /// Probes first and only sends `notice` if the probe fails. Returns the
    /// state after a settle delay and a re-probe, or the send error if the
    /// notice itself could not be delivered.
    pub async fn introduce(
        &self,
        identity: &ResolvedIdentity,
        notice: &str,
    ) -> PlatformResult<CacheState> {
        let peer = identity.id();

        if self.platform.resolve_route(peer).await.is_ok() {
            info!(peer = %peer, "Conversation already exists, nothing to introduce");
            return Ok(self.record(peer, CacheState::Warmed));
        }

        info!(peer = %peer, "Sending introduction notice");
        let payload = OutboundPayload::Text {
            body: notice.to_string(),
            entities: Vec::new(),
        };
        self.platform.send(peer, &payload).await?;

        tokio::time::sleep(self.settle_delay).await;

        match self.platform.resolve_route(peer).await {
            Ok(()) => Ok(self.record(peer, CacheState::Warmed)),
            Err(e) => {
                warn!(peer = %peer, error = %e, "Introduction sent but route still unresolved");
                Ok(self.record(peer, CacheState::Unreachable))
            }
        }
    }
}
