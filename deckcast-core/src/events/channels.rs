//! Event channel factories and handles.
//!
//! Provides factory functions for the channels that connect the deck
//! supervisors, the dispatcher and the alert forwarder.

use super::types::{Alert, DeckFrame};
use tokio::sync::mpsc;
use tracing::warn;

/// Default buffer size for the frame channel.
///
/// Dispatching a frame never awaits I/O, so this only has to absorb bursts.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for decoded frames. Cloned once per deck supervisor.
pub type DeckFrameSender = mpsc::Sender<DeckFrame>;
/// Receiver handle for decoded frames, owned by the dispatcher.
pub type DeckFrameReceiver = mpsc::Receiver<DeckFrame>;

/// Receiver side of the alert channel, owned by the alert forwarder.
pub type AlertReceiver = mpsc::UnboundedReceiver<Alert>;

/// Create a new DeckFrame channel.
///
/// Returns a (sender, receiver) pair. Every deck supervisor gets a clone of
/// the sender; the single dispatcher owns the receiver.
pub fn deck_frame_channel() -> (DeckFrameSender, DeckFrameReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new alert channel.
///
/// The channel is unbounded so that raising an alert never waits, even from
/// a panic hook.
pub fn alert_channel() -> (AlertHandle, AlertReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (AlertHandle { tx }, rx)
}

/// Cheap, cloneable, non-blocking entry point to the alert channel.
#[derive(Clone, Debug)]
pub struct AlertHandle {
    tx: mpsc::UnboundedSender<Alert>,
}

impl AlertHandle {
    /// Queue an alert. Never blocks; if the forwarder is gone the alert is
    /// only logged.
    pub fn notify(&self, message: impl Into<String>, detail: Option<String>) {
        let alert = Alert::new(message, detail);
        if let Err(e) = self.tx.send(alert) {
            warn!(message = %e.0.message, "Alert channel closed, dropping alert");
        }
    }
}
