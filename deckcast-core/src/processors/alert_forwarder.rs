//! AlertForwarder processor.
//!
//! Drains the alert channel and hands every alert to the configured
//! [`AlertSink`]. Alerts are always logged, so running without a sink
//! still leaves a trace of every failure.

use std::convert::Infallible;
use std::sync::Arc;

use kanau::processor::Processor;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::shutdown_requested;
use crate::events::{Alert, AlertReceiver};
use crate::services::AlertSink;

pub struct AlertForwarder {
    sink: Option<Arc<dyn AlertSink>>,
}

impl AlertForwarder {
    /// `sink` is `None` when no alert destination is configured.
    pub fn new(sink: Option<Arc<dyn AlertSink>>) -> Self {
        Self { sink }
    }

    /// Run until shutdown is signaled or every alert handle is dropped.
    ///
    /// Alerts already queued when shutdown arrives are still delivered.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>, mut alert_rx: AlertReceiver) {
        info!(sink = self.sink.is_some(), "AlertForwarder started");

        loop {
            tokio::select! {
                biased;

                alert = alert_rx.recv() => {
                    let Some(alert) = alert else {
                        info!("Alert channel closed");
                        break;
                    };
                    self.forward(&alert).await;
                }

                _ = shutdown_requested(&mut shutdown_rx) => {
                    info!("AlertForwarder received shutdown signal");
                    break;
                }
            }
        }

        alert_rx.close();
        while let Ok(alert) = alert_rx.try_recv() {
            self.forward(&alert).await;
        }

        info!("AlertForwarder shutdown complete");
    }

    async fn forward(&self, alert: &Alert) {
        error!(alert = %alert.message, detail = ?alert.detail, "Alert raised");

        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(e) = sink.notify(alert).await {
            warn!(error = %e, alert = %alert.message, "Failed to deliver alert");
        }
    }
}

impl Processor<Alert> for AlertForwarder {
    type Output = ();
    type Error = Infallible;

    async fn process(&self, alert: Alert) -> Result<(), Infallible> {
        self.forward(&alert).await;
        Ok(())
    }
}
