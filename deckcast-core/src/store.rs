//! In-memory store of queued requests.
//!
//! `RequestStore` is the only state shared between decks. It wraps
//! `Arc<RwLock<HashMap>>` so that clones are cheap handles onto the same
//! map; each operation takes the lock once and never awaits while holding
//! it.

use std::collections::HashMap;
use std::sync::Arc;

use compact_str::CompactString;
use deckcast_sdk::objects::RequestEntity;
use tokio::sync::RwLock;

/// Shared mapping from request id to the queued request.
///
/// An id is present iff an `add` (or a startup snapshot) delivered it and
/// no `end` has been seen since. Growth is bounded upstream by the deck's
/// `max_queue_size`, not here.
#[derive(Clone, Default)]
pub struct RequestStore {
    inner: Arc<RwLock<HashMap<CompactString, RequestEntity>>>,
}

impl RequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a request.
    pub async fn put(&self, entity: RequestEntity) {
        let mut map = self.inner.write().await;
        map.insert(entity.id.clone(), entity);
    }

    /// Remove a request, returning it if it was present.
    ///
    /// Removing an unknown id is a no-op.
    pub async fn remove(&self, id: &str) -> Option<RequestEntity> {
        self.inner.write().await.remove(id)
    }

    /// Clone out a request.
    pub async fn get(&self, id: &str) -> Option<RequestEntity> {
        self.inner.read().await.get(id).cloned()
    }

    /// Bulk insert requests from a snapshot.
    ///
    /// Returns how many entries were inserted.
    pub async fn seed(&self, entities: impl IntoIterator<Item = RequestEntity>) -> usize {
        let mut map = self.inner.write().await;
        let mut count = 0;
        for entity in entities {
            map.insert(entity.id.clone(), entity);
            count += 1;
        }
        count
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.inner.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// All ids currently queued, in no particular order.
    pub async fn ids(&self) -> Vec<CompactString> {
        self.inner.read().await.keys().cloned().collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use deckcast_sdk::objects::SourceType;

    pub(crate) fn entity(id: &str, info: &str, link: &str) -> RequestEntity {
        RequestEntity {
            id: id.into(),
            account_id: 1,
            duration: 180,
            info: info.to_string(),
            link: link.to_string(),
            music_url: None,
            source_id: format!("src-{id}"),
            source_type: SourceType::Youtube,
            thumbnail_url: None,
            video_url: format!("https://video.example/{id}"),
        }
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = RequestStore::new();
        store.put(entity("r1", "Song A", "http://x")).await;

        assert_eq!(store.get("r1").await.unwrap().info, "Song A");
        assert!(store.contains("r1").await);

        let removed = store.remove("r1").await;
        assert_eq!(removed.map(|e| e.id), Some("r1".into()));
        assert!(store.get("r1").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let store = RequestStore::new();
        store.put(entity("r1", "Song A", "http://x")).await;

        assert!(store.remove("missing").await.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_replaces_same_id() {
        let store = RequestStore::new();
        store.put(entity("r1", "Old", "http://x")).await;
        store.put(entity("r1", "New", "http://x")).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("r1").await.unwrap().info, "New");
    }

    #[tokio::test]
    async fn test_seed_contains_exactly_snapshot() {
        let store = RequestStore::new();
        let inserted = store
            .seed(vec![
                entity("r1", "A", "l1"),
                entity("r2", "B", "l2"),
                entity("r3", "C", "l3"),
            ])
            .await;
        assert_eq!(inserted, 3);

        let mut ids = store.ids().await;
        ids.sort();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = RequestStore::new();
        let other = store.clone();
        other.put(entity("r1", "A", "l1")).await;
        assert!(store.contains("r1").await);
    }
}
