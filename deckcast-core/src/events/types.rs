//! Event type definitions for the event-driven pipeline.
//!
//! Streaming frames are decoded into [`DeckEvent`]s, tagged with the deck
//! they arrived on and handed to the dispatcher as [`DeckFrame`]s. Errors
//! worth a human's attention travel separately as [`Alert`]s.

use compact_str::CompactString;
use deckcast_sdk::objects::RequestEntity;
use serde::{Deserialize, Serialize};

/// Identifier of a deck (a playlist channel with its own stream and queue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(pub u16);

impl DeckId {
    pub fn get(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for DeckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for DeckId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// A decoded streaming event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckEvent {
    /// A request was queued.
    Add(RequestEntity),
    /// A request finished (played out or skipped) and left the queue.
    End { id: CompactString },
    /// A queued request started playing.
    Play { id: CompactString },
}

impl DeckEvent {
    /// The request id this event refers to.
    pub fn request_id(&self) -> &str {
        match self {
            DeckEvent::Add(entity) => &entity.id,
            DeckEvent::End { id } | DeckEvent::Play { id } => id,
        }
    }
}

/// An event together with the deck it was received on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckFrame {
    pub deck: DeckId,
    pub event: DeckEvent,
}

impl DeckFrame {
    pub fn new(deck: DeckId, event: DeckEvent) -> Self {
        Self { deck, event }
    }
}

/// A request about to be announced, captured at the moment its `play`
/// event was dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRequest {
    pub deck: DeckId,
    pub entity: RequestEntity,
}

/// A message for the operator's alert channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    /// Longer context such as an error chain or a panic location.
    pub detail: Option<String>,
}

impl Alert {
    pub fn new(message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            message: message.into(),
            detail,
        }
    }
}
