//! Bot API HTTP client.
//!
//! Every method is a `POST {base}/bot{token}/{method}` with a JSON body. The
//! token is part of the URL, so URLs are stripped from transport errors and
//! never logged.

use crate::convert::entity_to_wire;
use crate::error::{BotApiError, BotApiResult};
use crate::types::{ApiEnvelope, Chat, Update, User};
use kestrel::OutboundPayload;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Headroom on top of the long-poll timeout before the HTTP request gives up.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// A chat addressed by numeric id or by public `@username`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatTarget {
    Id(i64),
    Username(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    chat_id: &'a ChatTarget,
}

#[derive(Debug, Serialize)]
struct MessageRefRequest {
    chat_id: i64,
    from_chat_id: i64,
    message_id: i64,
}

#[derive(Debug, Serialize)]
struct UpdatesRequest {
    offset: i64,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

/// Telegram Bot API client.
#[derive(Clone)]
pub struct BotApiClient {
    http_client: reqwest::Client,
    base_url: String,
    token: String,
}

impl BotApiClient {
    /// Create a client. `poll_timeout` is the longest long-poll this client
    /// will issue; the HTTP timeout is set just above it.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        poll_timeout: Duration,
    ) -> BotApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(poll_timeout + REQUEST_TIMEOUT_MARGIN)
            .build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Call a Bot API method and unwrap its response envelope.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> BotApiResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        debug!(method, "Calling Bot API");

        let response = self
            .http_client
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(|e| BotApiError::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| BotApiError::Http(e.without_url()))?;
        let envelope: ApiEnvelope<R> = serde_json::from_slice(&body)?;

        if envelope.ok {
            return envelope
                .result
                .ok_or_else(|| BotApiError::InvalidResponse(format!("{method} returned no result")));
        }

        let code = envelope
            .error_code
            .unwrap_or_else(|| i64::from(status.as_u16()));
        let description = envelope
            .description
            .unwrap_or_else(|| status.to_string());
        let retry_after = envelope.parameters.and_then(|p| p.retry_after);
        warn!(method, code, description = %description, retry_after, "Bot API call failed");

        Err(BotApiError::Api {
            code,
            description,
            retry_after,
        })
    }

    pub async fn get_me(&self) -> BotApiResult<User> {
        self.call("getMe", &json!({})).await
    }

    pub async fn get_chat(&self, target: &ChatTarget) -> BotApiResult<Chat> {
        self.call("getChat", &ChatRequest { chat_id: target }).await
    }

    /// Long-poll for message updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> BotApiResult<Vec<Update>> {
        let request = UpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &request).await
    }

    /// Forward with attribution.
    pub async fn forward_message(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
    ) -> BotApiResult<()> {
        let request = MessageRefRequest {
            chat_id,
            from_chat_id,
            message_id,
        };
        self.call::<_, IgnoredAny>("forwardMessage", &request)
            .await
            .map(|_| ())
    }

    /// Copy without attribution.
    pub async fn copy_message(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
    ) -> BotApiResult<()> {
        let request = MessageRefRequest {
            chat_id,
            from_chat_id,
            message_id,
        };
        self.call::<_, IgnoredAny>("copyMessage", &request)
            .await
            .map(|_| ())
    }

    /// Send a freshly built message using the method that matches its kind.
    pub async fn send(&self, chat_id: i64, payload: &OutboundPayload) -> BotApiResult<()> {
        let (method, params) = send_request(chat_id, payload);
        self.call::<_, IgnoredAny>(method, &params)
            .await
            .map(|_| ())
    }
}

/// Method name and JSON body for an outbound payload.
pub(crate) fn send_request(chat_id: i64, payload: &OutboundPayload) -> (&'static str, Value) {
    match payload {
        OutboundPayload::Text { body, entities } => {
            let mut params = json!({ "chat_id": chat_id, "text": body });
            if !entities.is_empty() {
                let wire: Vec<_> = entities.iter().map(entity_to_wire).collect();
                params["entities"] = json!(wire);
            }
            ("sendMessage", params)
        }
        OutboundPayload::Photo { file, caption } => (
            "sendPhoto",
            json!({ "chat_id": chat_id, "photo": file.as_str(), "caption": caption }),
        ),
        OutboundPayload::Video { file, caption } => (
            "sendVideo",
            json!({ "chat_id": chat_id, "video": file.as_str(), "caption": caption }),
        ),
        OutboundPayload::Document { file, caption } => (
            "sendDocument",
            json!({ "chat_id": chat_id, "document": file.as_str(), "caption": caption }),
        ),
        OutboundPayload::Audio { file, caption } => (
            "sendAudio",
            json!({ "chat_id": chat_id, "audio": file.as_str(), "caption": caption }),
        ),
        OutboundPayload::Animation { file, caption } => (
            "sendAnimation",
            json!({ "chat_id": chat_id, "animation": file.as_str(), "caption": caption }),
        ),
        OutboundPayload::Voice { file } => (
            "sendVoice",
            json!({ "chat_id": chat_id, "voice": file.as_str() }),
        ),
        OutboundPayload::VideoNote { file } => (
            "sendVideoNote",
            json!({ "chat_id": chat_id, "video_note": file.as_str() }),
        ),
        OutboundPayload::Sticker { file } => (
            "sendSticker",
            json!({ "chat_id": chat_id, "sticker": file.as_str() }),
        ),
        OutboundPayload::Location {
            latitude,
            longitude,
        } => (
            "sendLocation",
            json!({ "chat_id": chat_id, "latitude": latitude, "longitude": longitude }),
        ),
        OutboundPayload::Contact {
            phone_number,
            first_name,
            last_name,
        } => (
            "sendContact",
            json!({
                "chat_id": chat_id,
                "phone_number": phone_number,
                "first_name": first_name,
                "last_name": last_name,
            }),
        ),
    }
}
