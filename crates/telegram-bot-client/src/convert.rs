//! Conversion between Bot API wire types and kestrel's message model.

use crate::types::{Message, MessageEntity, PhotoSize};
use kestrel::{
    CaptionedMedia, FileRef, InboundEvent, InboundMessage, MessageContent, PeerId, TextEntity,
};

/// Convert an observed message into an inbound event.
///
/// Returns `None` for messages without a sender (channel posts).
pub fn inbound_event(message: Message, self_id: i64) -> Option<InboundEvent> {
    let sender = message.from.as_ref()?.id;
    let private = message.chat.is_private();
    let chat_id = PeerId(message.chat.id);
    let message_id = message.message_id;

    Some(InboundEvent {
        message: InboundMessage {
            message_id,
            chat_id,
            sender: PeerId(sender),
            content: classify(message),
        },
        private,
        from_self: sender == self_id,
    })
}

fn largest(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
    sizes
        .iter()
        .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
}

fn captioned(file_id: String, caption: Option<String>) -> CaptionedMedia {
    CaptionedMedia::new(FileRef::new(file_id), caption)
}

/// Pick the message's kind. Animations also carry a `document` field, so they
/// are checked first.
fn classify(message: Message) -> MessageContent {
    let caption = message.caption;

    if let Some(body) = message.text {
        let entities = message
            .entities
            .unwrap_or_default()
            .into_iter()
            .map(entity_from_wire)
            .collect();
        return MessageContent::Text { body, entities };
    }
    if let Some(animation) = message.animation {
        return MessageContent::Animation(captioned(animation.file_id, caption));
    }
    if let Some(photo) = message.photo.as_deref().and_then(largest) {
        return MessageContent::Photo(captioned(photo.file_id.clone(), caption));
    }
    if let Some(video) = message.video {
        return MessageContent::Video(captioned(video.file_id, caption));
    }
    if let Some(document) = message.document {
        return MessageContent::Document(captioned(document.file_id, caption));
    }
    if let Some(audio) = message.audio {
        return MessageContent::Audio(captioned(audio.file_id, caption));
    }
    if let Some(voice) = message.voice {
        return MessageContent::Voice(FileRef::new(voice.file_id));
    }
    if let Some(note) = message.video_note {
        return MessageContent::VideoNote(FileRef::new(note.file_id));
    }
    if let Some(sticker) = message.sticker {
        return MessageContent::Sticker(FileRef::new(sticker.file_id));
    }
    if let Some(location) = message.location {
        return MessageContent::Location {
            latitude: location.latitude,
            longitude: location.longitude,
        };
    }
    if let Some(contact) = message.contact {
        return MessageContent::ContactCard {
            phone_number: contact.phone_number,
            first_name: contact.first_name,
            last_name: contact.last_name,
        };
    }
    if let Some(poll) = message.poll {
        return MessageContent::Poll {
            question: poll.question,
        };
    }

    MessageContent::Unsupported {
        description: "unrecognized message content".to_string(),
    }
}

pub fn entity_from_wire(entity: MessageEntity) -> TextEntity {
    TextEntity {
        kind: entity.kind,
        offset: entity.offset,
        length: entity.length,
        url: entity.url,
        language: entity.language,
    }
}

pub fn entity_to_wire(entity: &TextEntity) -> MessageEntity {
    MessageEntity {
        kind: entity.kind.clone(),
        offset: entity.offset,
        length: entity.length,
        url: entity.url.clone(),
        language: entity.language.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel::MessageKind;

    const SELF_ID: i64 = 999;

    fn parse(json: &str) -> Message {
        serde_json::from_str(json).unwrap()
    }

    fn private_message(fields: &str) -> Message {
        parse(&format!(
            r#"{{"message_id":5,"from":{{"id":1001,"is_bot":false,"first_name":"Alice"}},
                "chat":{{"id":1001,"type":"private","first_name":"Alice"}},{fields}}}"#
        ))
    }

    #[test]
    fn test_text_with_entities() {
        let event = inbound_event(
            private_message(
                r#""text":"hello world","entities":[{"type":"bold","offset":0,"length":5}]"#,
            ),
            SELF_ID,
        )
        .unwrap();

        assert!(event.private);
        assert!(!event.from_self);
        assert_eq!(event.message.sender, PeerId(1001));
        match event.message.content {
            MessageContent::Text { body, entities } => {
                assert_eq!(body, "hello world");
                assert_eq!(entities.len(), 1);
                assert_eq!(entities[0].kind, "bold");
                assert_eq!(entities[0].length, 5);
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_photo_uses_largest_size() {
        let event = inbound_event(
            private_message(
                r#""caption":"sunset","photo":[
                    {"file_id":"small","width":90,"height":60},
                    {"file_id":"large","width":1280,"height":853},
                    {"file_id":"medium","width":320,"height":213}]"#,
            ),
            SELF_ID,
        )
        .unwrap();

        assert_eq!(
            event.message.content,
            MessageContent::Photo(CaptionedMedia::new(
                FileRef::new("large"),
                Some("sunset".into())
            ))
        );
    }

    #[test]
    fn test_animation_wins_over_document() {
        let event = inbound_event(
            private_message(
                r#""animation":{"file_id":"gif1"},"document":{"file_id":"gif1"}"#,
            ),
            SELF_ID,
        )
        .unwrap();
        assert_eq!(event.message.kind(), MessageKind::Animation);
    }

    #[test]
    fn test_caption_free_kinds_and_poll() {
        let voice = inbound_event(private_message(r#""voice":{"file_id":"v1"}"#), SELF_ID).unwrap();
        assert_eq!(voice.message.content, MessageContent::Voice(FileRef::new("v1")));

        let poll = inbound_event(
            private_message(r#""poll":{"id":"p","question":"Tea?","options":[]}"#),
            SELF_ID,
        )
        .unwrap();
        assert_eq!(poll.message.kind(), MessageKind::Poll);

        let dice = inbound_event(private_message(r#""dice":{"emoji":"🎲","value":3}"#), SELF_ID)
            .unwrap();
        assert_eq!(dice.message.kind(), MessageKind::Unsupported);
    }

    #[test]
    fn test_group_and_self_flags() {
        let group = parse(
            r#"{"message_id":9,"from":{"id":999,"is_bot":true,"first_name":"Relay"},
                "chat":{"id":-100,"type":"group","title":"Club"},"text":"hi"}"#,
        );
        let event = inbound_event(group, SELF_ID).unwrap();
        assert!(!event.private);
        assert!(event.from_self);
        assert_eq!(event.message.chat_id, PeerId(-100));
    }

    #[test]
    fn test_channel_post_without_sender_is_dropped() {
        let post = parse(r#"{"message_id":1,"chat":{"id":-200,"type":"channel"},"text":"news"}"#);
        assert!(inbound_event(post, SELF_ID).is_none());
    }
}
