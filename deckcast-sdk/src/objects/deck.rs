//! Playlist snapshot returned by `GET /api/v1/playlists/{deck}`.

use serde::{Deserialize, Deserializer, Serialize};

use super::request::RequestEntity;

/// Response envelope of the playlist endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckInfo {
    pub deck: DeckSnapshot,
}

/// The state of one deck at the time of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSnapshot {
    /// Requests currently waiting in the queue, in play order.
    #[serde(default)]
    pub queues: Vec<RequestEntity>,
    pub max_add_count: u32,
    pub max_queue_size: u32,
    pub max_skip_count: u32,
    /// Deck number. Some deployments send it as a string, some as an integer.
    #[serde(deserialize_with = "string_or_number")]
    pub number: String,
    pub time_offset: i64,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_with_string_number() {
        let json = r#"{"deck": {
            "queues": [],
            "max_add_count": 3,
            "max_queue_size": 10,
            "max_skip_count": 5,
            "number": "2",
            "time_offset": 12
        }}"#;
        let info: DeckInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.deck.number, "2");
        assert_eq!(info.deck.max_queue_size, 10);
        assert!(info.deck.queues.is_empty());
    }

    #[test]
    fn test_snapshot_with_integer_number_and_queue() {
        let json = r#"{"deck": {
            "queues": [{
                "id": "r1", "account_id": 1, "duration": 60, "info": "Song A",
                "link": "http://x", "music_url": null, "source_id": "s1",
                "source_type": "youtube", "thunbnail_url": null, "video_url": "v"
            }],
            "max_add_count": 3,
            "max_queue_size": 10,
            "max_skip_count": 5,
            "number": 1,
            "time_offset": 0
        }}"#;
        let info: DeckInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.deck.number, "1");
        assert_eq!(info.deck.queues.len(), 1);
        assert_eq!(info.deck.queues[0].info, "Song A");
    }
}
