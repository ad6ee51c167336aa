//! Listener filtering and ordering tests.

use super::harness::{
    destination_identity, private_event, rate_limited, source_identity, source_text_event, text,
    Call, MockEventSource, MockPlatform, SOURCE, STRANGER,
};
use crate::context::RelayContext;
use crate::delivery::DeliveryEngine;
use crate::listener::EventListener;
use crate::message::InboundEvent;
use std::sync::Arc;
use std::time::Duration;

fn listener(platform: &Arc<MockPlatform>) -> EventListener {
    let context = RelayContext::new(source_identity(), destination_identity());
    EventListener::new(context, DeliveryEngine::new(platform.clone()))
}

fn relayed_ids(platform: &MockPlatform) -> Vec<i64> {
    platform
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Relay { message_id, .. } => Some(message_id),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn dispatches_only_private_messages_from_source() {
    let platform = MockPlatform::with_contacts();
    let mut listener = listener(&platform);

    let from_stranger = private_event(1, STRANGER, text("spam"));
    let group = InboundEvent {
        private: false,
        ..source_text_event(2, "in a group")
    };
    let own = InboundEvent {
        from_self: true,
        ..source_text_event(3, "echo")
    };
    let wanted = source_text_event(4, "hello");

    let mut feed = MockEventSource::new(vec![from_stranger, group, own, wanted]);
    let stats = listener.run(&mut feed, std::future::pending()).await;

    assert_eq!(relayed_ids(&platform), vec![4]);
    assert_eq!(stats.received, 4);
    assert_eq!(stats.discarded, 3);
    assert_eq!(stats.dispatched, 1);
    assert_eq!(stats.delivered_relay, 1);
}

#[tokio::test]
async fn discarded_events_cause_no_platform_calls() {
    let platform = MockPlatform::with_contacts();
    let mut listener = listener(&platform);

    let outcome = listener.handle(private_event(1, STRANGER, text("nope"))).await;

    assert!(outcome.is_none());
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn delivers_in_arrival_order() {
    let platform = MockPlatform::with_contacts();
    let mut listener = listener(&platform);

    let events = (10..20).map(|id| source_text_event(id, "msg")).collect();
    let mut feed = MockEventSource::new(events);
    listener.run(&mut feed, std::future::pending()).await;

    assert_eq!(relayed_ids(&platform), (10..20).collect::<Vec<_>>());
}

/// M2's delivery does not begin until M1, including its backoff, has finished.
#[tokio::test(start_paused = true)]
async fn next_message_waits_for_current_outcome() {
    let platform = MockPlatform::with_contacts();
    platform.set_call_latency(Duration::from_millis(200));
    platform.script_relay(rate_limited(5));
    platform.script_relay(Ok(()));
    platform.script_relay(Ok(()));
    let mut listener = listener(&platform);

    let mut feed = MockEventSource::new(vec![
        source_text_event(1, "first"),
        source_text_event(2, "second"),
    ]);
    listener.run(&mut feed, std::future::pending()).await;

    let calls = platform.recorded_calls();
    assert_eq!(calls.len(), 3);
    let first_done = calls[1].finished_at;
    let second_started = calls[2].started_at;
    assert!(
        second_started >= first_done,
        "second message started before the first finished"
    );
    assert_eq!(platform.max_in_flight(), 1);
    assert_eq!(relayed_ids(&platform), vec![1, 1, 2]);
}

#[tokio::test]
async fn sender_filter_uses_resolved_id_not_chat() {
    let platform = MockPlatform::with_contacts();
    let listener = listener(&platform);

    let mut event = private_event(5, STRANGER, text("forwarded into our chat"));
    event.message.chat_id = SOURCE;
    assert!(!listener.qualifies(&event));

    event.message.sender = SOURCE;
    assert!(listener.qualifies(&event));
}
