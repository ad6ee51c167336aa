//! Bot API wire types.
//!
//! Only the fields the relay reads are modelled; serde ignores the rest.

use serde::{Deserialize, Serialize};

/// Response envelope shared by every Bot API method.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<i64>,
    pub description: Option<String>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Chat {
    pub fn is_private(&self) -> bool {
        self.kind == "private"
    }

    /// Human name: "First Last" for people, the title for groups, else the username.
    pub fn display_name(&self) -> String {
        let person = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !person.is_empty() {
            return person;
        }
        self.title
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: u32,
    pub length: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Any file-backed attachment; only the reusable `file_id` matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub file_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub phone_number: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Poll {
    pub question: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub entities: Option<Vec<MessageEntity>>,
    pub caption: Option<String>,
    pub photo: Option<Vec<PhotoSize>>,
    pub video: Option<FileObject>,
    pub document: Option<FileObject>,
    pub audio: Option<FileObject>,
    pub animation: Option<FileObject>,
    pub voice: Option<FileObject>,
    pub video_note: Option<FileObject>,
    pub sticker: Option<FileObject>,
    pub location: Option<Location>,
    pub contact: Option<Contact>,
    pub poll: Option<Poll>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope() {
        let body = r#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 5","parameters":{"retry_after":5}}"#;
        let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.error_code, Some(429));
        assert_eq!(envelope.parameters.and_then(|p| p.retry_after), Some(5));
    }

    #[test]
    fn test_chat_display_name() {
        let chat: Chat = serde_json::from_str(
            r#"{"id":7,"type":"private","first_name":"Alice","last_name":"Liddell","username":"alice"}"#,
        )
        .unwrap();
        assert!(chat.is_private());
        assert_eq!(chat.display_name(), "Alice Liddell");

        let group: Chat =
            serde_json::from_str(r#"{"id":-100,"type":"supergroup","title":"Tea Party"}"#).unwrap();
        assert!(!group.is_private());
        assert_eq!(group.display_name(), "Tea Party");
    }

    #[test]
    fn test_entity_serialization_skips_absent_fields() {
        let entity = MessageEntity {
            kind: "bold".into(),
            offset: 0,
            length: 4,
            url: None,
            language: None,
        };
        let json = serde_json::to_string(&entity).unwrap();
        assert_eq!(json, r#"{"type":"bold","offset":0,"length":4}"#);
    }
}
