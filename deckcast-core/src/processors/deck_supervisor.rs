//! DeckSupervisor processor.
//!
//! The DeckSupervisor is responsible for:
//! - Dialing the streaming subscription of one deck
//! - Decoding inbound frames and emitting `DeckFrame` events
//! - Probing liveness with a ping every heartbeat interval and replacing
//!   the connection when the pong does not arrive in time
//! - Replacing the connection unconditionally once it reaches the rotation
//!   age, and whenever the transport reports a close or an error
//! - Backing off between failed dials
//!
//! Every timer of a connection is a local of [`DeckSupervisor::listen`] and
//! every replacement trigger is a branch of the same `select!`, so one
//! connection yields exactly one replacement and nothing outlives it.

use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use super::shutdown_requested;
use crate::codec;
use crate::config::ConnectionTiming;
use crate::events::{DeckFrame, DeckFrameSender, DeckId};
use crate::services::{DeckConnector, DeckTransport, Inbound, TransportError};

/// Lifecycle state of a deck connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckState {
    /// A dial is in flight or waiting out its backoff.
    Connecting,
    /// Listening for frames.
    Open,
    /// Tearing the current connection down.
    Replacing,
    /// Shutdown was requested; the supervisor has exited.
    Stopped,
}

/// Why a connection was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceReason {
    /// The connection reached its maximum age.
    Rotation,
    /// No pong within the liveness timeout.
    LivenessTimeout,
    /// The peer closed the connection.
    Closed,
    /// Read or ping failed.
    Transport(String),
    /// The dial itself failed.
    DialFailed(String),
}

impl std::fmt::Display for ReplaceReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplaceReason::Rotation => write!(f, "rotation"),
            ReplaceReason::LivenessTimeout => write!(f, "liveness timeout"),
            ReplaceReason::Closed => write!(f, "closed by peer"),
            ReplaceReason::Transport(e) => write!(f, "transport error: {e}"),
            ReplaceReason::DialFailed(e) => write!(f, "dial failed: {e}"),
        }
    }
}

/// Snapshot of a supervisor, published on a `watch` channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckStatus {
    pub deck: DeckId,
    pub state: DeckState,
    /// Number of connections opened so far; identifies the current one.
    pub connection: u64,
    /// Number of open connections that have been replaced.
    pub replacements: u64,
    /// Consecutive failed dials since the last successful one.
    pub dial_failures: u32,
    pub last_reason: Option<ReplaceReason>,
}

impl DeckStatus {
    fn new(deck: DeckId) -> Self {
        Self {
            deck,
            state: DeckState::Connecting,
            connection: 0,
            replacements: 0,
            dial_failures: 0,
            last_reason: None,
        }
    }
}

/// How a listen loop ended.
enum ListenOutcome {
    Replace(ReplaceReason),
    Shutdown,
}

/// Keeps one deck connected for the lifetime of the process.
pub struct DeckSupervisor<C: DeckConnector> {
    deck: DeckId,
    connector: C,
    timing: ConnectionTiming,
    frame_tx: DeckFrameSender,
    status_tx: watch::Sender<DeckStatus>,
}

impl<C> DeckSupervisor<C>
where
    C: DeckConnector + 'static,
{
    /// Create a new DeckSupervisor.
    ///
    /// # Arguments
    ///
    /// * `deck` - The deck to follow
    /// * `connector` - Dials the deck's stream
    /// * `timing` - Heartbeat, rotation and backoff timing
    /// * `frame_tx` - Sender for decoded frames
    pub fn new(
        deck: DeckId,
        connector: C,
        timing: ConnectionTiming,
        frame_tx: DeckFrameSender,
    ) -> Self {
        let (status_tx, _) = watch::channel(DeckStatus::new(deck));
        Self {
            deck,
            connector,
            timing,
            frame_tx,
            status_tx,
        }
    }

    /// Subscribe to status updates.
    pub fn subscribe(&self) -> watch::Receiver<DeckStatus> {
        self.status_tx.subscribe()
    }

    /// Run until shutdown is signaled.
    ///
    /// Cycles `Connecting → Open → Replacing → Connecting` forever. A failed
    /// dial is retried after a capped exponential backoff; a replaced
    /// connection is redialed immediately.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let deck = self.deck;
        info!(%deck, "DeckSupervisor started");

        loop {
            self.status_tx.send_modify(|s| s.state = DeckState::Connecting);

            let dialed = tokio::select! {
                biased;

                _ = shutdown_requested(&mut shutdown_rx) => break,

                dialed = tokio::time::timeout(self.timing.dial_timeout, self.connector.connect(deck)) => {
                    dialed.unwrap_or_else(|_| Err(TransportError::Dial(format!(
                        "timed out after {}s",
                        self.timing.dial_timeout.as_secs()
                    ))))
                }
            };

            let mut transport = match dialed {
                Ok(transport) => transport,
                Err(e) => {
                    let reason = ReplaceReason::DialFailed(e.to_string());
                    let mut failures = 0;
                    self.status_tx.send_modify(|s| {
                        s.state = DeckState::Replacing;
                        s.dial_failures += 1;
                        s.last_reason = Some(reason);
                        failures = s.dial_failures;
                    });
                    let delay = with_jitter(self.timing.reconnect_delay(failures));
                    warn!(
                        %deck,
                        error = %e,
                        failures,
                        delay_ms = delay.as_millis() as u64,
                        "Failed to connect to deck, retrying"
                    );

                    tokio::select! {
                        biased;
                        _ = shutdown_requested(&mut shutdown_rx) => break,
                        _ = tokio::time::sleep(delay) => continue,
                    }
                }
            };

            let mut connection = 0;
            self.status_tx.send_modify(|s| {
                s.state = DeckState::Open;
                s.connection += 1;
                s.dial_failures = 0;
                connection = s.connection;
            });
            info!(%deck, connection, "Connected to deck");

            let outcome = self.listen(&mut transport, &mut shutdown_rx).await;

            match outcome {
                ListenOutcome::Shutdown => {
                    self.discard(transport).await;
                    break;
                }
                ListenOutcome::Replace(reason) => {
                    info!(%deck, connection, %reason, "Replacing deck connection");
                    self.status_tx.send_modify(|s| {
                        s.state = DeckState::Replacing;
                        s.replacements += 1;
                        s.last_reason = Some(reason);
                    });
                    self.discard(transport).await;
                }
            }
        }

        self.status_tx.send_modify(|s| s.state = DeckState::Stopped);
        info!(%deck, "DeckSupervisor shutdown complete");
    }

    // -- Private helpers ----------------------------------------------------

    /// Listen on one connection until it has to be replaced.
    ///
    /// The rotation timer, the heartbeat interval and the outstanding ping
    /// deadline all live here and are dropped on return. A pong only counts
    /// while a ping is outstanding, and the first of {pong, deadline} to be
    /// selected settles the ping.
    async fn listen(
        &self,
        transport: &mut C::Transport,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> ListenOutcome {
        let deck = self.deck;
        let opened_at = Instant::now();

        let rotation = tokio::time::sleep_until(opened_at + self.timing.rotation_interval);
        tokio::pin!(rotation);

        let mut heartbeat = tokio::time::interval_at(
            opened_at + self.timing.heartbeat_interval,
            self.timing.heartbeat_interval,
        );
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut pong_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;

                // Shutdown has highest priority.
                _ = shutdown_requested(shutdown_rx) => {
                    info!(%deck, "DeckSupervisor received shutdown signal");
                    return ListenOutcome::Shutdown;
                }

                // Forced rotation, regardless of health.
                _ = &mut rotation => {
                    return ListenOutcome::Replace(ReplaceReason::Rotation);
                }

                // Outstanding ping ran out of time.
                _ = sleep_until_deadline(pong_deadline), if pong_deadline.is_some() => {
                    warn!(%deck, "No pong within liveness timeout");
                    return ListenOutcome::Replace(ReplaceReason::LivenessTimeout);
                }

                // Heartbeat: send a ping unless one is already outstanding.
                _ = heartbeat.tick(), if pong_deadline.is_none() => {
                    if let Err(e) = transport.ping().await {
                        return ListenOutcome::Replace(ReplaceReason::Transport(e.to_string()));
                    }
                    pong_deadline = Some(Instant::now() + self.timing.liveness_timeout);
                    trace!(%deck, "Heartbeat ping sent");
                }

                inbound = transport.recv() => {
                    match inbound {
                        Some(Ok(Inbound::Text(text))) => self.forward(&text).await,
                        Some(Ok(Inbound::Pong)) => {
                            if pong_deadline.take().is_some() {
                                trace!(%deck, "Heartbeat ping answered");
                            } else {
                                trace!(%deck, "Ignoring unsolicited pong");
                            }
                        }
                        Some(Ok(Inbound::Other)) => {}
                        Some(Ok(Inbound::Closed)) | None => {
                            return ListenOutcome::Replace(ReplaceReason::Closed);
                        }
                        Some(Err(e)) => {
                            return ListenOutcome::Replace(ReplaceReason::Transport(e.to_string()));
                        }
                    }
                }
            }
        }
    }

    /// Decode a text frame and hand it to the dispatcher. Undecodable frames
    /// are dropped.
    async fn forward(&self, text: &str) {
        let deck = self.deck;
        match codec::parse(text) {
            Ok(event) => {
                debug!(%deck, request_id = %event.request_id(), "Received deck event");
                if let Err(e) = self.frame_tx.send(DeckFrame::new(deck, event)).await {
                    warn!(%deck, error = %e, "Failed to send DeckFrame, receiver dropped");
                }
            }
            Err(e) => {
                warn!(%deck, error = %e, "Dropping undecodable frame");
            }
        }
    }

    /// Close a connection that is being let go. Bounded by the liveness
    /// timeout so a dead peer cannot stall the redial.
    async fn discard(&self, mut transport: C::Transport) {
        if tokio::time::timeout(self.timing.liveness_timeout, transport.close())
            .await
            .is_err()
        {
            debug!(deck = %self.deck, "Timed out closing connection");
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Add up to 10% random jitter so decks that failed together do not redial
/// in lockstep.
fn with_jitter(delay: Duration) -> Duration {
    let max_jitter_ms = (delay.as_millis() / 10) as u64;
    if max_jitter_ms == 0 {
        return delay;
    }
    delay + Duration::from_millis(rand::rng().random_range(0..=max_jitter_ms))
}
