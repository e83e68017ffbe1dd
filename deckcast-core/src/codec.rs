//! Decoding of playlist streaming frames.
//!
//! [`parse`] turns the raw text of a frame into a [`DeckEvent`]. It has no
//! side effects: a frame that fails to decode is simply reported back to
//! the caller, which drops it.

use deckcast_sdk::objects::{RequestEntity, RequestRef, StreamEnvelope, StreamEventName};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::events::DeckEvent;

/// Why a frame could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame is not a `{event, payload}` JSON object.
    #[error("malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    /// The envelope carries an event tag this codec does not know.
    #[error("unknown event tag: {0}")]
    UnknownEvent(String),

    /// The payload does not match the shape required by its event tag.
    #[error("malformed {event} payload: {source}")]
    Payload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode one streaming frame.
pub fn parse(raw: &str) -> Result<DeckEvent, DecodeError> {
    let envelope: StreamEnvelope = serde_json::from_str(raw).map_err(DecodeError::Envelope)?;

    match envelope.event.as_str() {
        StreamEventName::ADD => {
            let entity: RequestEntity = decode_payload(StreamEventName::ADD, envelope.payload)?;
            Ok(DeckEvent::Add(entity))
        }
        StreamEventName::END => {
            let RequestRef { id } = decode_payload(StreamEventName::END, envelope.payload)?;
            Ok(DeckEvent::End { id })
        }
        StreamEventName::PLAY => {
            let RequestRef { id } = decode_payload(StreamEventName::PLAY, envelope.payload)?;
            Ok(DeckEvent::Play { id })
        }
        _ => Err(DecodeError::UnknownEvent(envelope.event)),
    }
}

/// The payload is normally a JSON document embedded as a string; an inline
/// object is decoded directly.
fn decode_payload<T: DeserializeOwned>(
    event: &'static str,
    payload: serde_json::Value,
) -> Result<T, DecodeError> {
    let decoded = match payload {
        serde_json::Value::String(encoded) => serde_json::from_str(&encoded),
        inline => serde_json::from_value(inline),
    };
    decoded.map_err(|source| DecodeError::Payload { event, source })
}
