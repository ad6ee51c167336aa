//! Memory of recently observed private chats.
//!
//! The Bot API offers no conversation list. The poller records every private
//! chat it sees here and the platform serves `list_recent_conversations` from
//! it.

use kestrel::PeerId;
use std::collections::VecDeque;
use parking_lot::Mutex;
use std::sync::Arc;

/// Default number of chats remembered.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Bounded, most-recent-first list of chat peers. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct RecentChats {
    inner: Arc<Mutex<VecDeque<PeerId>>>,
    capacity: usize,
}

impl Default for RecentChats {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RecentChats {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Move `peer` to the front, evicting the oldest entry when full.
    pub fn observe(&self, peer: PeerId) {
        let mut chats = self.inner.lock();
        chats.retain(|p| *p != peer);
        chats.push_front(peer);
        chats.truncate(self.capacity);
    }

    /// Up to `limit` peers, newest first.
    pub fn newest(&self, limit: usize) -> Vec<PeerId> {
        let chats = self.inner.lock();
        chats.iter().take(limit).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_without_duplicates() {
        let recent = RecentChats::default();
        recent.observe(PeerId(1));
        recent.observe(PeerId(2));
        recent.observe(PeerId(1));

        assert_eq!(recent.newest(10), vec![PeerId(1), PeerId(2)]);
        assert_eq!(recent.newest(1), vec![PeerId(1)]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let recent = RecentChats::with_capacity(2);
        recent.observe(PeerId(1));
        recent.observe(PeerId(2));
        recent.observe(PeerId(3));
        assert_eq!(recent.newest(10), vec![PeerId(3), PeerId(2)]);
    }

    #[test]
    fn test_clones_share_state() {
        let recent = RecentChats::default();
        let seen_by_poller = recent.clone();
        seen_by_poller.observe(PeerId(42));
        assert_eq!(recent.newest(5), vec![PeerId(42)]);
    }
}
