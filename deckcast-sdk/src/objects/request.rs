//! Queued track requests.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Where a requested track is hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    Youtube,
    PawooMusic,
}

/// A track request sitting in a deck's queue.
///
/// Delivered in full by the `add` streaming event and by the playlist
/// snapshot; `end` and `play` only carry the [`id`](Self::id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEntity {
    pub id: CompactString,
    pub account_id: i64,
    /// Track length in seconds.
    pub duration: u64,
    /// Track title.
    pub info: String,
    pub link: String,
    #[serde(default)]
    pub music_url: Option<String>,
    pub source_id: String,
    pub source_type: SourceType,
    /// The upstream API spells this field `thunbnail_url`.
    #[serde(default, alias = "thunbnail_url")]
    pub thumbnail_url: Option<String>,
    pub video_url: String,
}

/// Payload of the `end` and `play` streaming events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRef {
    pub id: CompactString,
}
