//! Processors of the deck pipeline.
//!
//! - `DeckSupervisor`: one per deck; owns the connection, emits `DeckFrame`
//! - `EventDispatcher`: receives `DeckFrame`, mutates the `RequestStore`,
//!   spawns `PlayAnnouncer` work for `play` events
//! - `PlayAnnouncer`: composes and posts the announcement for a `PlayRequest`
//! - `AlertForwarder`: receives `Alert`, delivers it to the `AlertSink`

pub mod alert_forwarder;
pub mod deck_supervisor;
pub mod event_dispatcher;
pub mod play_announcer;

pub use alert_forwarder::AlertForwarder;
pub use deck_supervisor::{DeckState, DeckStatus, DeckSupervisor, ReplaceReason};
pub use event_dispatcher::{Dispatched, EventDispatcher};
pub use play_announcer::{AnnounceError, PlayAnnouncer, compose_announcement};

use tokio::sync::watch;

/// Resolve once shutdown is requested or the shutdown sender is gone.
pub(crate) async fn shutdown_requested(shutdown_rx: &mut watch::Receiver<bool>) {
    let _ = shutdown_rx.wait_for(|stop| *stop).await;
}
