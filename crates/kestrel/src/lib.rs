//! Kestrel: relays one contact's messages to another.
//!
//! Kestrel watches the messages a session receives, picks out the private
//! messages sent by the Source contact, and delivers each one to the
//! Destination contact. It prefers the platform's native forward, which keeps
//! attribution, and falls back to re-sending the content when the platform
//! cannot route the forward.
//!
//! # Core Invariants
//!
//! 1. **Source-only**: a message is dispatched iff it is private, not ours,
//!    and sent by the resolved Source
//! 2. **One outcome**: every dispatched message yields exactly one
//!    `Delivered`, `Skipped` or `Failed`
//! 3. **Bounded sends**: at most one relay and one reconstruct call per
//!    message, each retried at most once after a rate-limit wait
//! 4. **Sequential**: the next message is not read until the current one has
//!    its outcome
//!
//! # Architecture
//!
//! ```text
//! EventSource -> EventListener -> DeliveryEngine -> Platform
//!                      ^
//!   IdentityResolver + PeerWarmer (startup, via RelayContext)
//! ```

pub mod config;
pub mod context;
pub mod delivery;
pub mod error;
pub mod identity;
pub mod listener;
pub mod message;
pub mod platform;
pub mod warmer;

#[cfg(test)]
mod tests;

pub use config::RelayConfig;
pub use context::RelayContext;
pub use delivery::{
    plan_reconstruction, DeliveryEngine, DeliveryOutcome, DeliveryRoute, Reconstruction,
    SkipReason,
};
pub use error::{
    DeliveryError, PlatformError, PlatformResult, RelayError, RelayResult, ResolutionError,
};
pub use identity::{IdentityResolver, ResolvedIdentity};
pub use listener::{EventListener, ListenerStats};
pub use message::{
    CaptionedMedia, FileRef, InboundEvent, InboundMessage, MessageContent, MessageKind,
    TextEntity,
};
pub use platform::{EventSource, OutboundPayload, Participant, ParticipantRef, PeerId, Platform};
pub use warmer::{CacheState, PeerWarmer, DEFAULT_INTRODUCTION};
