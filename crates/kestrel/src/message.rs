//! Inbound message model.
//!
//! Messages arrive from the platform client already classified by kind. The
//! relay reads them and never mutates them.

use crate::platform::PeerId;
use std::fmt;

/// Opaque reference to a file already stored by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef(pub String);

impl FileRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A formatting span inside a text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntity {
    /// Entity type as named by the platform ("bold", "text_link", ...).
    pub kind: String,
    /// Offset in UTF-16 code units.
    pub offset: u32,
    /// Length in UTF-16 code units.
    pub length: u32,
    pub url: Option<String>,
    pub language: Option<String>,
}

/// A file-backed message that supports a caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionedMedia {
    pub file: FileRef,
    pub caption: Option<String>,
}

impl CaptionedMedia {
    pub fn new(file: FileRef, caption: Option<String>) -> Self {
        Self { file, caption }
    }

    /// Caption for resending; the platform expects an empty string when absent.
    pub fn caption_or_empty(&self) -> String {
        self.caption.clone().unwrap_or_default()
    }
}

/// Kind-specific message content.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text {
        body: String,
        entities: Vec<TextEntity>,
    },
    Photo(CaptionedMedia),
    Video(CaptionedMedia),
    Document(CaptionedMedia),
    Audio(CaptionedMedia),
    Animation(CaptionedMedia),
    Voice(FileRef),
    VideoNote(FileRef),
    Sticker(FileRef),
    Location {
        latitude: f64,
        longitude: f64,
    },
    ContactCard {
        phone_number: String,
        first_name: String,
        last_name: Option<String>,
    },
    Poll {
        question: String,
    },
    /// Anything the client could not classify.
    Unsupported {
        description: String,
    },
}

/// Flat tag for a message's kind, used in logs and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Text,
    Photo,
    Video,
    Document,
    Voice,
    Audio,
    Sticker,
    Animation,
    VideoNote,
    Location,
    ContactCard,
    Poll,
    Unsupported,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Document => "document",
            Self::Voice => "voice",
            Self::Audio => "audio",
            Self::Sticker => "sticker",
            Self::Animation => "animation",
            Self::VideoNote => "video_note",
            Self::Location => "location",
            Self::ContactCard => "contact",
            Self::Poll => "poll",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MessageContent {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Text { .. } => MessageKind::Text,
            Self::Photo(_) => MessageKind::Photo,
            Self::Video(_) => MessageKind::Video,
            Self::Document(_) => MessageKind::Document,
            Self::Audio(_) => MessageKind::Audio,
            Self::Animation(_) => MessageKind::Animation,
            Self::Voice(_) => MessageKind::Voice,
            Self::VideoNote(_) => MessageKind::VideoNote,
            Self::Sticker(_) => MessageKind::Sticker,
            Self::Location { .. } => MessageKind::Location,
            Self::ContactCard { .. } => MessageKind::ContactCard,
            Self::Poll { .. } => MessageKind::Poll,
            Self::Unsupported { .. } => MessageKind::Unsupported,
        }
    }
}

/// A message observed by the session, as produced by the platform client.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Platform-assigned message identifier, unique within `chat_id`.
    pub message_id: i64,
    /// Conversation the message was posted in.
    pub chat_id: PeerId,
    /// Who sent it.
    pub sender: PeerId,
    pub content: MessageContent,
}

impl InboundMessage {
    pub fn kind(&self) -> MessageKind {
        self.content.kind()
    }
}

/// One item from the subscription feed.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub message: InboundMessage,
    /// True for one-to-one conversations, false for groups and channels.
    pub private: bool,
    /// True when the message was sent by this session's own account.
    pub from_self: bool,
}
