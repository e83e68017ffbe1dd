//! Runtime configuration re-exports.
//!
//! The actual config types are defined in `deckcast-core::config`.
//! This module re-exports them for convenience.

pub use deckcast_core::config::{ConnectionTiming, RuntimeConfig};
pub use deckcast_core::events::DeckId;
