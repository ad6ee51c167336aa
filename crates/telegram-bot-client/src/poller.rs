//! Long-polling inbound feed.

use crate::client::BotApiClient;
use crate::convert::inbound_event;
use crate::error::BotApiError;
use crate::recent::RecentChats;
use crate::types::Update;
use async_trait::async_trait;
use kestrel::{EventSource, InboundEvent, PeerId, PlatformResult};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

/// `EventSource` over `getUpdates`.
///
/// Each poll acknowledges everything before `offset`, so a batch is buffered
/// and handed out one event at a time in arrival order.
pub struct UpdatePoller {
    client: BotApiClient,
    self_id: i64,
    offset: i64,
    timeout_secs: u64,
    pending: VecDeque<InboundEvent>,
    recent: RecentChats,
}

impl UpdatePoller {
    pub fn new(
        client: BotApiClient,
        self_id: i64,
        poll_timeout: Duration,
        recent: RecentChats,
    ) -> Self {
        Self {
            client,
            self_id,
            offset: 0,
            timeout_secs: poll_timeout.as_secs(),
            pending: VecDeque::new(),
            recent,
        }
    }

    /// Next update id that will be requested.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    fn absorb(&mut self, updates: Vec<Update>) {
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            if message.chat.is_private() {
                self.recent.observe(PeerId(message.chat.id));
            }
            match inbound_event(message, self.self_id) {
                Some(event) => self.pending.push_back(event),
                None => debug!(update_id = update.update_id, "Ignoring update without sender"),
            }
        }
    }
}

#[async_trait]
impl EventSource for UpdatePoller {
    async fn next_event(&mut self) -> PlatformResult<Option<InboundEvent>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }

            let updates = self
                .client
                .get_updates(self.offset, self.timeout_secs)
                .await
                .map_err(BotApiError::into_send_error)?;
            debug!(count = updates.len(), offset = self.offset, "Received updates");
            self.absorb(updates);
        }
    }
}
