//! Integration tests for the Kestrel relay.
//!
//! - `harness.rs`    - MockPlatform, MockEventSource and builders
//! - `resolution.rs` - identity resolution and startup
//! - `warming.rs`    - peer cache warming and contact introduction
//! - `delivery.rs`   - relay, fallback and terminal outcomes
//! - `kinds.rs`      - per-kind reconstruction fields
//! - `backoff.rs`    - rate-limit wait and single retry
//! - `ordering.rs`   - filtering and strictly sequential dispatch
//! - `isolation.rs`  - one failure never affects the next message

mod backoff;
mod kinds;
mod ordering;
