//! Startup seeding of the request store.
//!
//! Before any deck stream is opened, the current queue of every deck is
//! fetched and loaded into the [`RequestStore`], so that `play` events for
//! requests queued before startup can still be announced.

use futures_util::future::join_all;
use tracing::{info, warn};

use crate::events::{AlertHandle, DeckId};
use crate::services::SnapshotLoader;
use crate::store::RequestStore;

/// Outcome of seeding every deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Decks that were loaded, with the number of requests each contributed.
    pub loaded: Vec<(DeckId, usize)>,
    /// Decks whose snapshot could not be fetched; they start empty.
    pub failed: Vec<DeckId>,
    /// Requests in the store once seeding finished.
    pub total: usize,
}

/// Fetch every deck's queue concurrently and seed the store.
///
/// A deck whose snapshot fails is alerted and skipped; it is still
/// followed, and its requests reach the store through later `add` events.
pub async fn seed_from_snapshots(
    loader: &dyn SnapshotLoader,
    store: &RequestStore,
    decks: &[DeckId],
    alerts: &AlertHandle,
) -> SeedReport {
    let fetches = decks.iter().map(|&deck| async move { (deck, loader.fetch(deck).await) });
    let results = join_all(fetches).await;

    let mut report = SeedReport::default();
    for (deck, result) in results {
        match result {
            Ok(info) => {
                let count = store.seed(info.deck.queues).await;
                info!(%deck, count, "Deck snapshot loaded");
                report.loaded.push((deck, count));
            }
            Err(e) => {
                warn!(%deck, error = %e, "Failed to load deck snapshot, starting empty");
                alerts.notify(
                    format!("Deck {deck}: failed to load the current queue"),
                    Some(e.to_string()),
                );
                report.failed.push(deck);
            }
        }
    }

    report.total = store.len().await;
    info!(total = report.total, "{} requests in queue", report.total);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::alert_channel;
    use crate::services::ServiceError;
    use crate::store::tests::entity;
    use async_trait::async_trait;
    use deckcast_sdk::objects::{DeckInfo, DeckSnapshot, RequestEntity};
    use std::collections::HashMap;

    struct FixedSnapshots(HashMap<u16, Vec<RequestEntity>>);

    #[async_trait]
    impl SnapshotLoader for FixedSnapshots {
        async fn fetch(&self, deck: DeckId) -> Result<DeckInfo, ServiceError> {
            let queues = self
                .0
                .get(&deck.get())
                .cloned()
                .ok_or_else(|| ServiceError::Unavailable("502".to_string()))?;
            Ok(DeckInfo {
                deck: DeckSnapshot {
                    queues,
                    max_add_count: 10,
                    max_queue_size: 30,
                    max_skip_count: 3,
                    number: deck.to_string(),
                    time_offset: 0,
                },
            })
        }
    }

    #[tokio::test]
    async fn test_seed_contains_exactly_snapshot_ids() {
        let loader = FixedSnapshots(HashMap::from([
            (1, vec![entity("r1", "A", "l1"), entity("r2", "B", "l2")]),
            (2, vec![entity("r3", "C", "l3")]),
            (3, vec![]),
        ]));
        let store = RequestStore::new();
        let (alerts, mut alert_rx) = alert_channel();

        let report = seed_from_snapshots(
            &loader,
            &store,
            &[DeckId(1), DeckId(2), DeckId(3)],
            &alerts,
        )
        .await;

        let mut ids = store.ids().await;
        ids.sort();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
        assert_eq!(report.total, 3);
        assert_eq!(
            report.loaded,
            vec![(DeckId(1), 2), (DeckId(2), 1), (DeckId(3), 0)]
        );
        assert!(report.failed.is_empty());
        assert!(alert_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_deck_is_alerted_and_skipped() {
        let loader = FixedSnapshots(HashMap::from([(1, vec![entity("r1", "A", "l1")])]));
        let store = RequestStore::new();
        let (alerts, mut alert_rx) = alert_channel();

        let report = seed_from_snapshots(&loader, &store, &[DeckId(1), DeckId(4)], &alerts).await;

        assert_eq!(report.failed, vec![DeckId(4)]);
        assert_eq!(report.total, 1);
        assert!(store.contains("r1").await);
        let alert = alert_rx.try_recv().unwrap();
        assert!(alert.message.contains("Deck 4"));
    }
}
