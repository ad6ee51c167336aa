//! `kestrel::Platform` over the Bot API.

use crate::client::{BotApiClient, ChatTarget};
use crate::error::BotApiError;
use crate::recent::RecentChats;
use async_trait::async_trait;
use kestrel::{
    InboundMessage, OutboundPayload, Participant, ParticipantRef, PeerId, Platform, PlatformResult,
};

/// Bot API implementation of the relay's outbound operations.
#[derive(Clone)]
pub struct TelegramPlatform {
    client: BotApiClient,
    recent: RecentChats,
}

impl TelegramPlatform {
    pub fn new(client: BotApiClient, recent: RecentChats) -> Self {
        Self { client, recent }
    }
}

fn target_for(reference: &ParticipantRef) -> ChatTarget {
    match reference {
        ParticipantRef::Id(id) => ChatTarget::Id(id.0),
        ParticipantRef::Handle(handle) => ChatTarget::Username(format!("@{handle}")),
    }
}

#[async_trait]
impl Platform for TelegramPlatform {
    async fn lookup_participant(&self, reference: &ParticipantRef) -> PlatformResult<Participant> {
        let chat = self
            .client
            .get_chat(&target_for(reference))
            .await
            .map_err(BotApiError::into_lookup_error)?;

        Ok(Participant {
            id: PeerId(chat.id),
            display_name: chat.display_name(),
            handle: chat.username,
        })
    }

    async fn resolve_route(&self, peer: PeerId) -> PlatformResult<()> {
        self.client
            .get_chat(&ChatTarget::Id(peer.0))
            .await
            .map(|_| ())
            .map_err(BotApiError::into_send_error)
    }

    async fn list_recent_conversations(&self, page_size: usize) -> PlatformResult<Vec<PeerId>> {
        Ok(self.recent.newest(page_size))
    }

    async fn relay(&self, message: &InboundMessage, destination: PeerId) -> PlatformResult<()> {
        self.client
            .forward_message(destination.0, message.chat_id.0, message.message_id)
            .await
            .map_err(BotApiError::into_send_error)
    }

    async fn send(&self, destination: PeerId, payload: &OutboundPayload) -> PlatformResult<()> {
        self.client
            .send(destination.0, payload)
            .await
            .map_err(BotApiError::into_send_error)
    }

    async fn duplicate(&self, message: &InboundMessage, destination: PeerId) -> PlatformResult<()> {
        self.client
            .copy_message(destination.0, message.chat_id.0, message.message_id)
            .await
            .map_err(BotApiError::into_send_error)
    }
}
