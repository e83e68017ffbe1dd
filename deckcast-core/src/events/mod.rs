//! Event system for the deck pipeline.
//!
//! # Event Flow
//!
//! 1. `DeckSupervisor` (one per deck) decodes streaming frames and emits
//!    `DeckFrame` -> `EventDispatcher`
//! 2. `EventDispatcher` applies `add`/`end` to the `RequestStore` and turns
//!    `play` into a `PlayRequest` -> `PlayAnnouncer`
//! 3. Anything that fails in a way an operator should see is raised as an
//!    `Alert` -> `AlertForwarder`
//!
//! Frames from one deck are dispatched in arrival order. There is no
//! ordering between decks.

pub mod channels;
pub mod types;

pub use channels::{
    AlertHandle, AlertReceiver, DEFAULT_CHANNEL_BUFFER, DeckFrameReceiver, DeckFrameSender,
    alert_channel, deck_frame_channel,
};

pub use types::{Alert, DeckEvent, DeckFrame, DeckId, PlayRequest};
