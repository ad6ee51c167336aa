//! The seam between Kestrel and a messaging platform client.
//!
//! Kestrel owns no connection. Everything it does on the network goes through
//! [`Platform`] (outbound calls) and [`EventSource`] (the inbound feed), which
//! an adapter crate implements for a concrete platform.

use crate::error::PlatformResult;
use crate::message::{FileRef, InboundEvent, InboundMessage, TextEntity};
use async_trait::async_trait;
use std::fmt;

/// Platform-stable participant identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub i64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An unresolved, human-supplied participant reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantRef {
    /// A numeric literal, optionally signed.
    Id(PeerId),
    /// A handle with any leading `@` removed.
    Handle(String),
}

impl ParticipantRef {
    /// Parse a reference such as `12345`, `-100123`, `@alice` or `alice`.
    pub fn parse(reference: &str) -> Self {
        let trimmed = reference.trim();
        match trimmed.parse::<i64>() {
            Ok(id) => Self::Id(PeerId(id)),
            Err(_) => Self::Handle(trimmed.strip_prefix('@').unwrap_or(trimmed).to_string()),
        }
    }
}

impl fmt::Display for ParticipantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Handle(handle) => write!(f, "@{}", handle),
        }
    }
}

/// A participant as reported by a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: PeerId,
    pub display_name: String,
    pub handle: Option<String>,
}

/// A freshly built outbound message, one variant per reconstructable kind.
///
/// Each variant carries exactly the fields the platform accepts for that kind.
/// Voice notes, round videos and stickers take no caption.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundPayload {
    Text {
        body: String,
        entities: Vec<TextEntity>,
    },
    Photo {
        file: FileRef,
        caption: String,
    },
    Video {
        file: FileRef,
        caption: String,
    },
    Document {
        file: FileRef,
        caption: String,
    },
    Audio {
        file: FileRef,
        caption: String,
    },
    Animation {
        file: FileRef,
        caption: String,
    },
    Voice {
        file: FileRef,
    },
    VideoNote {
        file: FileRef,
    },
    Sticker {
        file: FileRef,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
    Contact {
        phone_number: String,
        first_name: String,
        last_name: String,
    },
}

impl OutboundPayload {
    /// Name of the platform operation this payload maps to, for logging.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Text { .. } => "send_text",
            Self::Photo { .. } => "send_photo",
            Self::Video { .. } => "send_video",
            Self::Document { .. } => "send_document",
            Self::Audio { .. } => "send_audio",
            Self::Animation { .. } => "send_animation",
            Self::Voice { .. } => "send_voice",
            Self::VideoNote { .. } => "send_video_note",
            Self::Sticker { .. } => "send_sticker",
            Self::Location { .. } => "send_location",
            Self::Contact { .. } => "send_contact",
        }
    }
}

/// Outbound operations Kestrel needs from a platform client.
///
/// Implementations share one authenticated session. Kestrel never calls
/// into a `Platform` from more than one task at a time.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Look up a participant by numeric id or handle.
    async fn lookup_participant(&self, reference: &ParticipantRef) -> PlatformResult<Participant>;

    /// Ask the addressing layer for a route to `peer` without side effects.
    async fn resolve_route(&self, peer: PeerId) -> PlatformResult<()>;

    /// Peers of the caller's most recent conversations, newest first, at most `page_size`.
    async fn list_recent_conversations(&self, page_size: usize) -> PlatformResult<Vec<PeerId>>;

    /// Native forward-with-attribution of `message` to `destination`.
    async fn relay(&self, message: &InboundMessage, destination: PeerId) -> PlatformResult<()>;

    /// Send a freshly built message to `destination`.
    async fn send(&self, destination: PeerId, payload: &OutboundPayload) -> PlatformResult<()>;

    /// Generic copy of `message` without attribution, for kinds with no dedicated send.
    async fn duplicate(&self, message: &InboundMessage, destination: PeerId) -> PlatformResult<()>;
}

/// The inbound subscription feed.
#[async_trait]
pub trait EventSource: Send {
    /// Wait for the next event. `Ok(None)` means the feed has ended.
    async fn next_event(&mut self) -> PlatformResult<Option<InboundEvent>>;
}
