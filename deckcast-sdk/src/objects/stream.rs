//! Frames pushed by the playlist streaming endpoint.
//!
//! The streaming endpoint (`/api/v1/streaming/?stream=playlist&deck={n}`)
//! pushes text frames shaped like a Mastodon streaming event:
//!
//! ```json
//! {"event":"add","payload":"{\"id\":\"42\",\"account_id\":1, ...}"}
//! {"event":"play","payload":"{\"id\":\"42\"}"}
//! {"event":"end","payload":"{\"id\":\"42\"}"}
//! ```
//!
//! The payload is itself a JSON document encoded as a string. Decoding it
//! against the shape selected by `event` is the job of the core codec.

use serde::{Deserialize, Serialize};

/// The outer envelope of a streaming frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEnvelope {
    /// Event tag: `add`, `end` or `play`.
    pub event: String,
    /// Usually a JSON-encoded string; an inline object is tolerated.
    pub payload: serde_json::Value,
}

/// Known event tags.
pub struct StreamEventName;

impl StreamEventName {
    pub const ADD: &'static str = "add";
    pub const END: &'static str = "end";
    pub const PLAY: &'static str = "play";
}
