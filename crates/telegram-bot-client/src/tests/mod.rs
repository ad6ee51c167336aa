//! HTTP round-trip tests against a local stub of the Bot API.
//!
//! - `stub`: one-shot HTTP server returning canned envelopes
//! - `http`: client, platform and poller behaviour over real requests
