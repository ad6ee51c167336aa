//! Telegram Bot API adapter for Kestrel.
//!
//! Implements [`kestrel::Platform`] with [`TelegramPlatform`] and
//! [`kestrel::EventSource`] with [`UpdatePoller`], both on top of one
//! [`BotApiClient`].
//!
//! The poller and the platform share a [`RecentChats`] memory: the Bot API
//! has no conversation list, so the chats seen through updates stand in for
//! one when warming a peer.

mod client;
mod convert;
mod error;
mod platform;
mod poller;
mod recent;
mod types;

#[cfg(test)]
mod tests;

pub use client::{BotApiClient, ChatTarget};
pub use error::{BotApiError, BotApiResult};
pub use platform::TelegramPlatform;
pub use poller::UpdatePoller;
pub use recent::{RecentChats, DEFAULT_CAPACITY};
pub use types::{Chat, User};

use std::time::Duration;
use tracing::info;

/// Connect to the Bot API: check the token with `getMe` and build the
/// platform and feed halves sharing one client.
pub async fn connect(
    base_url: &str,
    token: &str,
    poll_timeout: Duration,
) -> BotApiResult<(TelegramPlatform, UpdatePoller)> {
    let client = BotApiClient::new(base_url, token, poll_timeout)?;
    let me = client.get_me().await?;
    info!(
        bot_id = me.id,
        username = me.username.as_deref().unwrap_or(""),
        "Connected to Bot API"
    );

    let recent = RecentChats::default();
    let platform = TelegramPlatform::new(client.clone(), recent.clone());
    let poller = UpdatePoller::new(client, me.id, poll_timeout, recent);
    Ok((platform, poller))
}
