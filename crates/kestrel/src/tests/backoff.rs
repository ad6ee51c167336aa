//! Rate-limit backoff tests.
//!
//! All tests run on a paused clock, so waits are virtual but still measured.

use super::harness::{
    addressing_failure, destination_identity, rate_limited, text_message, Call, MockPlatform,
};
use crate::delivery::{DeliveryEngine, DeliveryOutcome, DeliveryRoute};
use crate::error::{DeliveryError, PlatformError};
use std::time::Duration;
use tokio::time::Instant;

/// Relay rate limited once, then succeeds on the retry.
#[tokio::test(start_paused = true)]
async fn rate_limit_once_then_success() {
    let platform = MockPlatform::with_contacts();
    platform.script_relay(rate_limited(5));
    platform.script_relay(Ok(()));
    let engine = DeliveryEngine::new(platform.clone());

    let start = Instant::now();
    let outcome = engine
        .deliver(&text_message(1, "hi"), &destination_identity())
        .await;

    assert_eq!(outcome, DeliveryOutcome::Delivered(DeliveryRoute::Relay));
    assert!(start.elapsed() >= Duration::from_secs(5));
    assert_eq!(platform.relay_count(), 2);
}

/// Relay rate limited, and the retry is rate limited again: no second wait, no third call.
#[tokio::test(start_paused = true)]
async fn rate_limit_twice_fails() {
    let platform = MockPlatform::with_contacts();
    platform.script_relay(rate_limited(5));
    platform.script_relay(rate_limited(3));
    let engine = DeliveryEngine::new(platform.clone());

    let start = Instant::now();
    let outcome = engine
        .deliver(&text_message(2, "hi"), &destination_identity())
        .await;

    assert_eq!(outcome, DeliveryOutcome::Failed(DeliveryError::RateLimited(3)));
    assert_eq!(platform.relay_count(), 2, "no third attempt");
    assert_eq!(platform.send_calls().len(), 2, "no reconstruction either");
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(5));
    assert!(elapsed < Duration::from_secs(8), "must not wait a second time");
}

/// The retry after backoff repeats the call that was limited, not some other call.
#[tokio::test(start_paused = true)]
async fn reconstruct_rate_limit_retries_the_send() {
    let platform = MockPlatform::with_contacts();
    platform.script_relay(addressing_failure());
    platform.script_send(rate_limited(2));
    platform.script_send(Ok(()));
    let engine = DeliveryEngine::new(platform.clone());

    let start = Instant::now();
    let outcome = engine
        .deliver(&text_message(3, "hi"), &destination_identity())
        .await;

    assert_eq!(outcome, DeliveryOutcome::Delivered(DeliveryRoute::Reconstruct));
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert_eq!(platform.relay_count(), 1, "relay is not retried");
    let sends = platform
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::Send { .. }))
        .count();
    assert_eq!(sends, 2);
}

#[tokio::test(start_paused = true)]
async fn reconstruct_rate_limited_twice_fails() {
    let platform = MockPlatform::with_contacts();
    platform.script_relay(addressing_failure());
    platform.script_send(rate_limited(2));
    platform.script_send(rate_limited(9));
    let engine = DeliveryEngine::new(platform.clone());

    let outcome = engine
        .deliver(&text_message(4, "hi"), &destination_identity())
        .await;

    assert_eq!(outcome, DeliveryOutcome::Failed(DeliveryError::RateLimited(9)));
    assert_eq!(platform.send_calls().len(), 3);
}

/// Worst case: relay limited then rejected, reconstruct limited then succeeds.
/// Two logical sends, four physical calls, never more.
#[tokio::test(start_paused = true)]
async fn worst_case_stays_within_two_sends() {
    let platform = MockPlatform::with_contacts();
    platform.script_relay(rate_limited(1));
    platform.script_relay(addressing_failure());
    platform.script_send(rate_limited(1));
    platform.script_send(Ok(()));
    let engine = DeliveryEngine::new(platform.clone());

    let outcome = engine
        .deliver(&text_message(5, "hi"), &destination_identity())
        .await;

    assert_eq!(outcome, DeliveryOutcome::Delivered(DeliveryRoute::Reconstruct));
    let calls = platform.send_calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(platform.relay_count(), 2);
}

/// A retried relay that then reports an addressing failure still falls back.
#[tokio::test(start_paused = true)]
async fn retried_relay_addressing_failure_falls_back() {
    let platform = MockPlatform::with_contacts();
    platform.script_relay(rate_limited(4));
    platform.script_relay(Err(PlatformError::AddressingFailure("CHAT_ID_INVALID".into())));
    let engine = DeliveryEngine::new(platform.clone());

    let outcome = engine
        .deliver(&text_message(6, "hi"), &destination_identity())
        .await;

    assert_eq!(outcome, DeliveryOutcome::Delivered(DeliveryRoute::Reconstruct));
}

#[tokio::test(start_paused = true)]
async fn duplicate_rate_limited_twice_reports_rate_limit() {
    let platform = MockPlatform::with_contacts();
    platform.script_relay(addressing_failure());
    platform.script_duplicate(rate_limited(1));
    platform.script_duplicate(rate_limited(1));
    let engine = DeliveryEngine::new(platform.clone());

    let msg = super::harness::message(
        7,
        super::harness::SOURCE,
        crate::message::MessageContent::Unsupported {
            description: "story".into(),
        },
    );
    let outcome = engine.deliver(&msg, &destination_identity()).await;

    assert_eq!(outcome, DeliveryOutcome::Failed(DeliveryError::RateLimited(1)));
}
