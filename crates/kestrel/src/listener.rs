//! Event listener loop.
//!
//! Pulls events from the feed one at a time, keeps the ones that are private
//! messages from the Source, and hands each to the delivery engine. The next
//! event is not read until the current delivery has reached its outcome, so
//! two backoffs can never interleave.

use crate::context::RelayContext;
use crate::delivery::{DeliveryEngine, DeliveryOutcome, DeliveryRoute};
use crate::error::PlatformError;
use crate::message::InboundEvent;
use crate::platform::EventSource;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pause after a failed read from the feed, unless the platform asked for longer.
const FEED_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Running counters for one listener session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub received: u64,
    pub dispatched: u64,
    pub discarded: u64,
    pub delivered_relay: u64,
    pub delivered_reconstruct: u64,
    pub skipped: u64,
    pub failed: u64,
    pub feed_errors: u64,
}

impl ListenerStats {
    fn record(&mut self, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered(DeliveryRoute::Relay) => self.delivered_relay += 1,
            DeliveryOutcome::Delivered(DeliveryRoute::Reconstruct) => {
                self.delivered_reconstruct += 1
            }
            DeliveryOutcome::Skipped(_) => self.skipped += 1,
            DeliveryOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Filters the inbound feed and dispatches Source messages for delivery.
pub struct EventListener {
    context: RelayContext,
    engine: DeliveryEngine,
    stats: ListenerStats,
}

impl EventListener {
    pub fn new(context: RelayContext, engine: DeliveryEngine) -> Self {
        Self {
            context,
            engine,
            stats: ListenerStats::default(),
        }
    }

    pub fn stats(&self) -> &ListenerStats {
        &self.stats
    }

    /// True if `event` is a private message from the Source, not sent by us.
    pub fn qualifies(&self, event: &InboundEvent) -> bool {
        event.private && !event.from_self && event.message.sender == self.context.source().id()
    }

    /// Deliver one event if it qualifies. Returns the outcome, or `None` if
    /// the event was discarded.
    pub async fn handle(&mut self, event: InboundEvent) -> Option<DeliveryOutcome> {
        self.stats.received += 1;

        if !self.qualifies(&event) {
            self.stats.discarded += 1;
            return None;
        }

        self.stats.dispatched += 1;
        info!(
            message_id = event.message.message_id,
            kind = %event.message.kind(),
            from = %self.context.source().display_name(),
            "Forwarding message from source"
        );

        let outcome = self
            .engine
            .deliver(&event.message, self.context.destination())
            .await;
        self.stats.record(&outcome);
        Some(outcome)
    }

    /// Run until `shutdown` resolves or the feed ends.
    ///
    /// Shutdown is only observed while waiting for the next event. A delivery
    /// in progress always runs to its outcome first.
    pub async fn run<S, F>(&mut self, source: &mut S, shutdown: F) -> ListenerStats
    where
        S: EventSource + ?Sized,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            source = %self.context.source(),
            destination = %self.context.destination(),
            "Listening for messages from source..."
        );

        loop {
            let next = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping listener");
                    break;
                }
                next = source.next_event() => next,
            };

            match next {
                Ok(Some(event)) => {
                    if self.handle(event).await.is_none() {
                        debug!("Event discarded");
                    }
                }
                Ok(None) => {
                    info!("Event feed ended");
                    break;
                }
                Err(e) => {
                    self.stats.feed_errors += 1;
                    let pause = match &e {
                        PlatformError::RateLimited { wait_secs } => {
                            Duration::from_secs(*wait_secs)
                        }
                        _ => FEED_RETRY_DELAY,
                    };
                    warn!(
                        error = %e,
                        pause_ms = pause.as_millis() as u64,
                        "Failed to read from event feed, retrying"
                    );
                    tokio::select! {
                        _ = &mut shutdown => {
                            info!("Shutdown requested, stopping listener");
                            break;
                        }
                        _ = tokio::time::sleep(pause) => {}
                    }
                }
            }
        }

        info!(
            received = self.stats.received,
            dispatched = self.stats.dispatched,
            delivered_relay = self.stats.delivered_relay,
            delivered_reconstruct = self.stats.delivered_reconstruct,
            skipped = self.stats.skipped,
            failed = self.stats.failed,
            "Listener stopped"
        );

        self.stats.clone()
    }
}
