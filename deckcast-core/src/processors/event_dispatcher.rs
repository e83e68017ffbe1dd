//! EventDispatcher processor.
//!
//! The EventDispatcher is responsible for:
//! - Receiving `DeckFrame` from every deck supervisor
//! - Applying `add` and `end` to the `RequestStore`
//! - Turning `play` of a queued request into a `PlayRequest` and spawning
//!   its announcement, so a slow post never holds up the next frame
//!
//! Frames are dispatched one at a time in arrival order, which keeps the
//! store mutations of each deck in stream order.

use std::sync::Arc;

use kanau::processor::Processor;
use std::convert::Infallible;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::play_announcer::PlayAnnouncer;
use super::shutdown_requested;
use crate::events::{DeckEvent, DeckFrame, DeckFrameReceiver, PlayRequest};
use crate::store::RequestStore;

/// What dispatching one frame did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// `add`: the request is now queued.
    Stored,
    /// `end`: the request was removed.
    Removed,
    /// `end` for a request that was not queued.
    AlreadyGone,
    /// `play` for a request that was not queued; nothing to announce.
    NotQueued,
    /// `play` for a queued request; the caller should announce it.
    Announce(PlayRequest),
}

/// Routes decoded frames to the store and the announcer.
pub struct EventDispatcher {
    store: RequestStore,
    announcer: Arc<PlayAnnouncer>,
}

impl EventDispatcher {
    /// Create a new EventDispatcher.
    ///
    /// # Arguments
    ///
    /// * `store` - The shared request store
    /// * `announcer` - Announces plays; shared with every spawned announcement
    pub fn new(store: RequestStore, announcer: Arc<PlayAnnouncer>) -> Self {
        Self { store, announcer }
    }

    /// Run until shutdown is signaled or every frame sender is dropped.
    ///
    /// Announcements still in flight are awaited before returning.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>, mut frame_rx: DeckFrameReceiver) {
        info!("EventDispatcher started");

        let mut announcements = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                _ = shutdown_requested(&mut shutdown_rx) => {
                    info!("EventDispatcher received shutdown signal");
                    break;
                }

                Some(joined) = announcements.join_next(), if !announcements.is_empty() => {
                    self.reap(joined);
                }

                frame = frame_rx.recv() => {
                    let Some(frame) = frame else {
                        info!("DeckFrame channel closed");
                        break;
                    };
                    if let Dispatched::Announce(request) = self.dispatch(frame).await {
                        let announcer = self.announcer.clone();
                        announcements.spawn(async move {
                            // Failures are alerted by the announcer itself.
                            let _ = announcer.announce(request).await;
                        });
                    }
                }
            }
        }

        while let Some(joined) = announcements.join_next().await {
            self.reap(joined);
        }

        info!("EventDispatcher shutdown complete");
    }

    /// Apply one frame to the store.
    ///
    /// `play` reads the store but never changes it; the request stays queued
    /// until its `end` arrives.
    pub async fn dispatch(&self, frame: DeckFrame) -> Dispatched {
        let DeckFrame { deck, event } = frame;
        match event {
            DeckEvent::Add(entity) => {
                debug!(%deck, request_id = %entity.id, "Request added");
                self.store.put(entity).await;
                Dispatched::Stored
            }
            DeckEvent::End { id } => match self.store.remove(&id).await {
                Some(_) => {
                    debug!(%deck, request_id = %id, "Request ended");
                    Dispatched::Removed
                }
                None => {
                    debug!(%deck, request_id = %id, "End for unknown request");
                    Dispatched::AlreadyGone
                }
            },
            DeckEvent::Play { id } => match self.store.get(&id).await {
                Some(entity) => Dispatched::Announce(PlayRequest { deck, entity }),
                None => {
                    debug!(%deck, request_id = %id, "Play for unknown request, skipping");
                    Dispatched::NotQueued
                }
            },
        }
    }

    /// The panic hook has already raised the alert; only log here.
    fn reap(&self, joined: Result<(), tokio::task::JoinError>) {
        if let Err(e) = joined
            && e.is_panic()
        {
            error!(error = %e, "Announcement task panicked");
        }
    }
}

impl Processor<DeckFrame> for EventDispatcher {
    type Output = Dispatched;
    type Error = Infallible;

    async fn process(&self, frame: DeckFrame) -> Result<Dispatched, Infallible> {
        Ok(self.dispatch(frame).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AlertReceiver, DeckId, alert_channel, deck_frame_channel};
    use crate::processors::play_announcer::tests::{
        FixedAccounts, RecordingAnnouncer, account,
    };
    use crate::store::tests::entity;
    use deckcast_sdk::objects::StatusVisibility;

    struct Setup {
        dispatcher: EventDispatcher,
        store: RequestStore,
        recorder: Arc<RecordingAnnouncer>,
        _alert_rx: AlertReceiver,
    }

    fn setup() -> Setup {
        let store = RequestStore::new();
        let recorder = Arc::new(RecordingAnnouncer::default());
        let (alerts, alert_rx) = alert_channel();
        let announcer = Arc::new(PlayAnnouncer::new(
            recorder.clone(),
            Arc::new(FixedAccounts(Some(account(Some("Alice"), "alice")))),
            alerts,
            StatusVisibility::Unlisted,
        ));
        Setup {
            dispatcher: EventDispatcher::new(store.clone(), announcer),
            store,
            recorder,
            _alert_rx: alert_rx,
        }
    }

    fn add(id: &str, info: &str, link: &str) -> DeckFrame {
        DeckFrame::new(DeckId(1), DeckEvent::Add(entity(id, info, link)))
    }

    fn end(id: &str) -> DeckFrame {
        DeckFrame::new(DeckId(1), DeckEvent::End { id: id.into() })
    }

    fn play(id: &str) -> DeckFrame {
        DeckFrame::new(DeckId(1), DeckEvent::Play { id: id.into() })
    }

    #[tokio::test]
    async fn test_add_then_end_removes() {
        let s = setup();
        assert_eq!(s.dispatcher.dispatch(add("r1", "A", "l")).await, Dispatched::Stored);
        assert!(s.store.contains("r1").await);

        assert_eq!(s.dispatcher.dispatch(end("r1")).await, Dispatched::Removed);
        assert!(!s.store.contains("r1").await);
    }

    #[tokio::test]
    async fn test_end_is_idempotent() {
        let s = setup();
        s.dispatcher.dispatch(add("r1", "A", "l")).await;
        s.dispatcher.dispatch(add("r2", "B", "l")).await;

        s.dispatcher.dispatch(end("r1")).await;
        let first = s.store.ids().await;
        assert_eq!(s.dispatcher.dispatch(end("r1")).await, Dispatched::AlreadyGone);
        assert_eq!(s.store.ids().await, first);
    }

    #[tokio::test]
    async fn test_play_does_not_mutate_store() {
        let s = setup();
        s.dispatcher.dispatch(add("r1", "Song A", "http://x")).await;

        let dispatched = s.dispatcher.dispatch(play("r1")).await;
        let Dispatched::Announce(request) = dispatched else {
            panic!("expected an announcement, got {dispatched:?}");
        };
        assert_eq!(request.deck, DeckId(1));
        assert_eq!(request.entity.info, "Song A");
        assert_eq!(s.store.len().await, 1);
        assert!(s.store.contains("r1").await);
    }

    #[tokio::test]
    async fn test_play_unknown_is_skipped() {
        let s = setup();
        assert_eq!(s.dispatcher.dispatch(play("ghost")).await, Dispatched::NotQueued);
        assert!(s.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_process_delegates_to_dispatch() {
        let s = setup();
        let out = s.dispatcher.process(add("r1", "A", "l")).await.unwrap();
        assert_eq!(out, Dispatched::Stored);
    }

    #[tokio::test]
    async fn test_run_announces_each_queued_play_once() {
        let s = setup();
        let (frame_tx, frame_rx) = deck_frame_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        for frame in [
            add("r1", "Song A", "http://x"),
            play("r1"),
            end("r1"),
            play("r1"),
        ] {
            frame_tx.send(frame).await.unwrap();
        }
        drop(frame_tx);

        // Returns once the channel is drained and announcements are done.
        s.dispatcher.run(shutdown_rx, frame_rx).await;

        let posts = s.recorder.posts();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].contains("Song A"));
        assert!(posts[0].contains("http://x"));
        assert!(s.store.is_empty().await);
    }

    struct PanickingAnnouncer;

    #[async_trait::async_trait]
    impl crate::services::Announcer for PanickingAnnouncer {
        async fn post(
            &self,
            _text: &str,
            _visibility: StatusVisibility,
        ) -> Result<(), crate::services::ServiceError> {
            panic!("post blew up");
        }
    }

    #[tokio::test]
    async fn test_panicking_announcement_is_reaped_without_extra_alert() {
        let store = RequestStore::new();
        let (alerts, mut alert_rx) = alert_channel();
        let announcer = Arc::new(PlayAnnouncer::new(
            Arc::new(PanickingAnnouncer),
            Arc::new(FixedAccounts(Some(account(None, "dave")))),
            alerts,
            StatusVisibility::Unlisted,
        ));
        let dispatcher = EventDispatcher::new(store.clone(), announcer);
        let (frame_tx, frame_rx) = deck_frame_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        frame_tx.send(add("r1", "Song A", "http://x")).await.unwrap();
        frame_tx.send(play("r1")).await.unwrap();
        frame_tx.send(end("r1")).await.unwrap();
        drop(frame_tx);

        dispatcher.run(shutdown_rx, frame_rx).await;

        assert!(store.is_empty().await);
        assert!(alert_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let s = setup();
        let (_frame_tx, frame_rx) = deck_frame_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(s.dispatcher.run(shutdown_rx, frame_rx));
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
