//! Wire types and clients shared by the deckcast crates.
//!
//! [`objects`] holds the serde representations of everything that crosses
//! the network: queued requests, playlist snapshots, streaming envelopes,
//! Mastodon accounts and statuses, and Slack alert payloads.
//!
//! [`client`] (behind the `client` feature) holds the HTTP and WebSocket
//! clients that speak those formats.

#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
