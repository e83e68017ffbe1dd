//! Deckcast daemon
//!
//! Follows the request queues of the music decks and announces every track
//! that starts playing.

mod config;
mod fault;
mod shutdown;

use clap::Parser;
use config::runtime::{ConnectionTiming, DeckId};
use config::{ConfigLoader, Overrides};
use deckcast_core::events::{AlertHandle, DeckFrameSender, alert_channel, deck_frame_channel};
use deckcast_core::processors::{
    AlertForwarder, DeckStatus, DeckSupervisor, EventDispatcher, PlayAnnouncer,
};
use deckcast_core::seeding::seed_from_snapshots;
use deckcast_core::services::{
    AlertSink, DeckConnector, WebSocketConnector, build_mastodon_client,
};
use deckcast_core::store::RequestStore;
use deckcast_sdk::client::{SlackWebhook, StreamingClient};
use futures_util::FutureExt;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Deckcast - music deck play announcer
#[derive(Parser, Debug)]
#[command(name = "deckcast")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./deckcast.toml")]
    config: PathBuf,

    /// Follow only these decks (repeatable); overrides `[decks].ids`
    #[arg(short, long = "deck")]
    decks: Vec<u16>,

    /// Emit logs as JSON
    #[arg(long, default_value = "false")]
    json_logs: bool,

    /// OAuth token of the announcing account
    #[arg(long, env = "MASTODON_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Slack incoming webhook for alerts; overrides `[alerts].slack_webhook_url`
    #[arg(long, env = "SLACK_INCOMING_URL", hide_env_values = true)]
    slack_incoming_url: Option<Url>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.json_logs);

    tracing::info!("Starting deckcast v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(
        &args.config,
        Overrides {
            decks: args.decks,
            access_token: args.access_token,
            slack_webhook_url: args.slack_incoming_url,
        },
    );
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!(
        decks = ?config.decks,
        alerts = config.slack_webhook_url.is_some(),
        "Configuration loaded from {:?}",
        args.config
    );

    // Channels
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (alerts_stop_tx, alerts_stop_rx) = watch::channel(false);
    let (alerts, alert_rx) = alert_channel();
    let (frame_tx, frame_rx) = deck_frame_channel();

    fault::install_panic_alert(alerts.clone());
    shutdown::spawn_shutdown_handler(shutdown_tx);

    // Alert forwarder runs until everything else has stopped
    let sink: Option<Arc<dyn AlertSink>> = config
        .slack_webhook_url
        .clone()
        .map(|url| Arc::new(SlackWebhook::new(url)) as Arc<dyn AlertSink>);
    let forwarder = tokio::spawn(AlertForwarder::new(sink).run(alerts_stop_rx, alert_rx));

    // Seed the store before any stream is opened
    let mastodon = Arc::new(build_mastodon_client(&config));
    let store = RequestStore::new();
    seed_from_snapshots(mastodon.as_ref(), &store, &config.decks, &alerts).await;

    // Dispatcher
    let announcer = Arc::new(PlayAnnouncer::new(
        mastodon.clone(),
        mastodon,
        alerts.clone(),
        config.visibility,
    ));
    let dispatcher = tokio::spawn(
        EventDispatcher::new(store, announcer).run(shutdown_rx.clone(), frame_rx),
    );

    // One supervisor per deck, restarted if it ever dies
    let connector = WebSocketConnector::new(StreamingClient::new(
        config.streaming_url.clone(),
        config.access_token.clone(),
    ));
    let statuses = supervise_decks(
        &config.decks,
        connector,
        config.timing,
        frame_tx,
        &alerts,
        shutdown_rx,
    )
    .await;
    for (deck, status) in &statuses {
        let status = status.borrow();
        tracing::info!(
            %deck,
            connections = status.connection,
            replacements = status.replacements,
            "Deck stopped"
        );
    }

    // In-flight announcements finish before alerts stop
    if let Err(e) = dispatcher.await {
        tracing::error!(error = %e, "EventDispatcher task failed");
    }
    let _ = alerts_stop_tx.send(true);
    if let Err(e) = forwarder.await {
        tracing::error!(error = %e, "AlertForwarder task failed");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Run a supervisor per deck until shutdown.
///
/// A supervisor that panics is alerted and started again with a fresh
/// connection. Returns the last status receiver of every deck.
async fn supervise_decks<C>(
    decks: &[DeckId],
    connector: C,
    timing: ConnectionTiming,
    frame_tx: DeckFrameSender,
    alerts: &AlertHandle,
    shutdown_rx: watch::Receiver<bool>,
) -> BTreeMap<DeckId, watch::Receiver<DeckStatus>>
where
    C: DeckConnector + Clone + 'static,
{
    let spawn = |set: &mut JoinSet<(DeckId, bool)>, deck: DeckId| {
        let supervisor = DeckSupervisor::new(deck, connector.clone(), timing, frame_tx.clone());
        let status = supervisor.subscribe();
        let run = AssertUnwindSafe(supervisor.run(shutdown_rx.clone())).catch_unwind();
        set.spawn(async move { (deck, run.await.is_err()) });
        status
    };

    let mut set = JoinSet::new();
    let mut statuses = BTreeMap::new();
    for &deck in decks {
        statuses.insert(deck, spawn(&mut set, deck));
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((deck, panicked)) => {
                if panicked && !*shutdown_rx.borrow() {
                    tracing::error!(%deck, "DeckSupervisor panicked, restarting");
                    alerts.notify(format!("Deck {deck}: supervisor crashed and was restarted"), None);
                    statuses.insert(deck, spawn(&mut set, deck));
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "DeckSupervisor task failed");
            }
        }
    }

    statuses
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tungstenite=warn,tokio_tungstenite=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
