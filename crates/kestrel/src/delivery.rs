//! Delivery engine.
//!
//! Per message:
//!
//! ```text
//! poll ──────────────────────────────────────────▶ Skipped(PollNotCopyable)
//!
//! AttemptRelay ──ok──────────────────────────────▶ Delivered(Relay)
//!      │
//!      ├─ AddressingFailure ─▶ AttemptReconstruct ─ok─▶ Delivered(Reconstruct)
//!      │                              └─ error ─────▶ Failed(..)
//!      └─ other error ───────────────────────────────▶ Failed(..)
//! ```
//!
//! Polls are never sent, relayed or not: no platform call is made for them.
//!
//! Either attempt may hit a rate limit. The engine then waits the requested
//! time and retries that same call exactly once; a second rate limit is
//! terminal. So a message costs at most one relay call and one reconstruct
//! call, each with at most one retry.
//!
//! `deliver` is not idempotent: calling it twice sends twice.

use crate::error::{DeliveryError, PlatformError, PlatformResult};
use crate::identity::ResolvedIdentity;
use crate::message::{InboundMessage, MessageContent};
use crate::platform::{OutboundPayload, PeerId, Platform};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How many times a rate-limited call is retried after waiting.
pub const BACKOFF_RETRIES: u32 = 1;

/// Which path got the message to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryRoute {
    /// Native forward with attribution.
    Relay,
    /// Fresh send of the same content, without attribution.
    Reconstruct,
}

/// Why a message was deliberately not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Polls cannot be re-created with the same votes and anonymity.
    PollNotCopyable,
}

/// Terminal result of delivering one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered(DeliveryRoute),
    Skipped(SkipReason),
    Failed(DeliveryError),
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered(DeliveryRoute::Relay) => f.write_str("delivered via relay"),
            Self::Delivered(DeliveryRoute::Reconstruct) => {
                f.write_str("delivered via reconstruction")
            }
            Self::Skipped(SkipReason::PollNotCopyable) => {
                f.write_str("skipped: polls cannot be copied")
            }
            Self::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// How a message is re-expressed when relay is not possible.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconstruction {
    /// A dedicated send for the message kind.
    Send(OutboundPayload),
    /// No dedicated send; use the platform's generic duplicate.
    Duplicate,
    /// Do not send at all.
    Skip(SkipReason),
}

/// Choose the reconstruction for a message's content.
pub fn plan_reconstruction(content: &MessageContent) -> Reconstruction {
    let payload = match content {
        MessageContent::Text { body, entities } => OutboundPayload::Text {
            body: body.clone(),
            entities: entities.clone(),
        },
        MessageContent::Photo(media) => OutboundPayload::Photo {
            file: media.file.clone(),
            caption: media.caption_or_empty(),
        },
        MessageContent::Video(media) => OutboundPayload::Video {
            file: media.file.clone(),
            caption: media.caption_or_empty(),
        },
        MessageContent::Document(media) => OutboundPayload::Document {
            file: media.file.clone(),
            caption: media.caption_or_empty(),
        },
        MessageContent::Audio(media) => OutboundPayload::Audio {
            file: media.file.clone(),
            caption: media.caption_or_empty(),
        },
        MessageContent::Animation(media) => OutboundPayload::Animation {
            file: media.file.clone(),
            caption: media.caption_or_empty(),
        },
        MessageContent::Voice(file) => OutboundPayload::Voice { file: file.clone() },
        MessageContent::VideoNote(file) => OutboundPayload::VideoNote { file: file.clone() },
        MessageContent::Sticker(file) => OutboundPayload::Sticker { file: file.clone() },
        MessageContent::Location {
            latitude,
            longitude,
        } => OutboundPayload::Location {
            latitude: *latitude,
            longitude: *longitude,
        },
        MessageContent::ContactCard {
            phone_number,
            first_name,
            last_name,
        } => OutboundPayload::Contact {
            phone_number: phone_number.clone(),
            first_name: first_name.clone(),
            last_name: last_name.clone().unwrap_or_default(),
        },
        MessageContent::Poll { .. } => return Reconstruction::Skip(SkipReason::PollNotCopyable),
        MessageContent::Unsupported { .. } => return Reconstruction::Duplicate,
    };
    Reconstruction::Send(payload)
}

/// Delivers inbound messages to a destination.
pub struct DeliveryEngine {
    platform: Arc<dyn Platform>,
}

impl DeliveryEngine {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Deliver `message` to `destination`, producing exactly one outcome.
    pub async fn deliver(
        &self,
        message: &InboundMessage,
        destination: &ResolvedIdentity,
    ) -> DeliveryOutcome {
        let target = destination.id();
        let message_id = message.message_id;

        if matches!(message.content, MessageContent::Poll { .. }) {
            let outcome = DeliveryOutcome::Skipped(SkipReason::PollNotCopyable);
            warn!(message_id, kind = %message.kind(), outcome = %outcome, "Message skipped");
            return outcome;
        }

        debug!(message_id, kind = %message.kind(), destination = %target, "Attempting relay");

        let relayed = self
            .with_backoff(message_id, "relay", || self.platform.relay(message, target))
            .await;

        let outcome = match relayed {
            Ok(()) => DeliveryOutcome::Delivered(DeliveryRoute::Relay),
            Err(PlatformError::AddressingFailure(detail)) => {
                warn!(
                    message_id,
                    destination = %target,
                    detail = %detail,
                    "Relay rejected destination route, falling back to reconstruction"
                );
                self.reconstruct(message, target).await
            }
            Err(e) => DeliveryOutcome::Failed(DeliveryError::from_platform(e)),
        };

        match &outcome {
            DeliveryOutcome::Delivered(_) => {
                info!(message_id, kind = %message.kind(), outcome = %outcome, "Message delivered")
            }
            DeliveryOutcome::Skipped(_) => {
                warn!(message_id, kind = %message.kind(), outcome = %outcome, "Message skipped")
            }
            DeliveryOutcome::Failed(_) => {
                error!(message_id, kind = %message.kind(), outcome = %outcome, "Message not delivered")
            }
        }

        outcome
    }

    async fn reconstruct(&self, message: &InboundMessage, target: PeerId) -> DeliveryOutcome {
        let message_id = message.message_id;

        match plan_reconstruction(&message.content) {
            Reconstruction::Skip(reason) => DeliveryOutcome::Skipped(reason),
            Reconstruction::Send(payload) => {
                let operation = payload.operation();
                debug!(message_id, operation, destination = %target, "Reconstructing message");
                match self
                    .with_backoff(message_id, operation, || self.platform.send(target, &payload))
                    .await
                {
                    Ok(()) => DeliveryOutcome::Delivered(DeliveryRoute::Reconstruct),
                    Err(e) => DeliveryOutcome::Failed(DeliveryError::from_platform(e)),
                }
            }
            Reconstruction::Duplicate => {
                debug!(message_id, destination = %target, "No dedicated send, duplicating");
                match self
                    .with_backoff(message_id, "duplicate", || {
                        self.platform.duplicate(message, target)
                    })
                    .await
                {
                    Ok(()) => DeliveryOutcome::Delivered(DeliveryRoute::Reconstruct),
                    Err(PlatformError::RateLimited { wait_secs }) => {
                        DeliveryOutcome::Failed(DeliveryError::RateLimited(wait_secs))
                    }
                    Err(e) => {
                        debug!(message_id, error = %e, "Duplicate failed");
                        DeliveryOutcome::Failed(DeliveryError::UnsupportedKind)
                    }
                }
            }
        }
    }

    /// Run `call`; on a rate limit, wait and run it again, at most
    /// [`BACKOFF_RETRIES`] times. A rate limit on the last try is returned.
    async fn with_backoff<F, Fut>(
        &self,
        message_id: i64,
        operation: &'static str,
        mut call: F,
    ) -> PlatformResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = PlatformResult<()>>,
    {
        let mut retries = 0;
        loop {
            match call().await {
                Err(PlatformError::RateLimited { wait_secs }) if retries < BACKOFF_RETRIES => {
                    retries += 1;
                    warn!(message_id, operation, wait_secs, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                }
                result => return result,
            }
        }
    }
}
