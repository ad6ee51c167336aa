//! Reconstruction sends exactly the fields each message kind supports.

use super::harness::{addressing_failure, destination_identity, message, Call, MockPlatform, SOURCE};
use crate::delivery::{DeliveryEngine, DeliveryOutcome, DeliveryRoute};
use crate::message::{CaptionedMedia, FileRef, MessageContent, TextEntity};
use crate::platform::OutboundPayload;

/// Deliver `content` with relay rejected and return the single reconstruct payload.
async fn reconstructed(content: MessageContent) -> OutboundPayload {
    let platform = MockPlatform::with_contacts();
    platform.script_relay(addressing_failure());
    let engine = DeliveryEngine::new(platform.clone());

    let outcome = engine
        .deliver(&message(1, SOURCE, content), &destination_identity())
        .await;
    assert_eq!(outcome, DeliveryOutcome::Delivered(DeliveryRoute::Reconstruct));

    let sends: Vec<_> = platform
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Send { payload, .. } => Some(payload),
            _ => None,
        })
        .collect();
    assert_eq!(sends.len(), 1, "exactly one reconstruct send");
    sends.into_iter().next().unwrap()
}

fn media(file: &str, caption: Option<&str>) -> CaptionedMedia {
    CaptionedMedia::new(FileRef::new(file), caption.map(str::to_string))
}

#[tokio::test]
async fn text_keeps_body_and_formatting() {
    let entities = vec![TextEntity {
        kind: "bold".into(),
        offset: 0,
        length: 5,
        url: None,
        language: None,
    }];
    let payload = reconstructed(MessageContent::Text {
        body: "Hello *world*".into(),
        entities: entities.clone(),
    })
    .await;

    assert_eq!(
        payload,
        OutboundPayload::Text {
            body: "Hello *world*".into(),
            entities,
        }
    );
}

#[tokio::test]
async fn captioned_media_carries_caption() {
    assert_eq!(
        reconstructed(MessageContent::Photo(media("ph", Some("sunset")))).await,
        OutboundPayload::Photo {
            file: FileRef::new("ph"),
            caption: "sunset".into()
        }
    );
    assert_eq!(
        reconstructed(MessageContent::Video(media("vd", Some("clip")))).await,
        OutboundPayload::Video {
            file: FileRef::new("vd"),
            caption: "clip".into()
        }
    );
    assert_eq!(
        reconstructed(MessageContent::Document(media("dc", None))).await,
        OutboundPayload::Document {
            file: FileRef::new("dc"),
            caption: String::new()
        }
    );
    assert_eq!(
        reconstructed(MessageContent::Audio(media("au", None))).await,
        OutboundPayload::Audio {
            file: FileRef::new("au"),
            caption: String::new()
        }
    );
    assert_eq!(
        reconstructed(MessageContent::Animation(media("gif", Some("lol")))).await,
        OutboundPayload::Animation {
            file: FileRef::new("gif"),
            caption: "lol".into()
        }
    );
}

#[tokio::test]
async fn voice_video_note_and_sticker_carry_no_caption() {
    assert_eq!(
        reconstructed(MessageContent::Voice(FileRef::new("vo"))).await,
        OutboundPayload::Voice {
            file: FileRef::new("vo")
        }
    );
    assert_eq!(
        reconstructed(MessageContent::VideoNote(FileRef::new("vn"))).await,
        OutboundPayload::VideoNote {
            file: FileRef::new("vn")
        }
    );
    assert_eq!(
        reconstructed(MessageContent::Sticker(FileRef::new("st"))).await,
        OutboundPayload::Sticker {
            file: FileRef::new("st")
        }
    );
}

#[tokio::test]
async fn location_sends_coordinates() {
    assert_eq!(
        reconstructed(MessageContent::Location {
            latitude: 52.52,
            longitude: 13.405,
        })
        .await,
        OutboundPayload::Location {
            latitude: 52.52,
            longitude: 13.405
        }
    );
}

#[tokio::test]
async fn contact_defaults_missing_last_name() {
    assert_eq!(
        reconstructed(MessageContent::ContactCard {
            phone_number: "+4915112345678".into(),
            first_name: "Carol".into(),
            last_name: None,
        })
        .await,
        OutboundPayload::Contact {
            phone_number: "+4915112345678".into(),
            first_name: "Carol".into(),
            last_name: String::new(),
        }
    );
    assert_eq!(
        reconstructed(MessageContent::ContactCard {
            phone_number: "+1555".into(),
            first_name: "Dan".into(),
            last_name: Some("Brown".into()),
        })
        .await,
        OutboundPayload::Contact {
            phone_number: "+1555".into(),
            first_name: "Dan".into(),
            last_name: "Brown".into(),
        }
    );
}
