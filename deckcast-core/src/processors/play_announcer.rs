//! PlayAnnouncer processor.
//!
//! Turns a [`PlayRequest`] into a public status:
//! - Looks up the requesting account (best effort)
//! - Composes the announcement text
//! - Posts it through the [`Announcer`]
//!
//! A failed lookup only drops the requester line. A failed post is alerted
//! and the announcement is lost; there is no retry.

use std::sync::Arc;

use deckcast_sdk::objects::{Account, RequestEntity, StatusVisibility};
use kanau::processor::Processor;
use thiserror::Error;
use tracing::{info, warn};

use crate::events::{AlertHandle, DeckId, PlayRequest};
use crate::services::{AccountLookup, Announcer, ServiceError};

/// Errors that can occur while announcing a play.
#[derive(Debug, Error)]
pub enum AnnounceError {
    /// The status could not be posted.
    #[error("failed to post announcement: {0}")]
    Post(#[source] ServiceError),
}

/// Compose the announcement text for a request that started playing.
///
/// The requester line is appended only when the account could be resolved.
pub fn compose_announcement(
    deck: DeckId,
    entity: &RequestEntity,
    requester: Option<&Account>,
) -> String {
    let mut text = format!(
        "🔊 Deck{deck} 🔊\n{info} (via {link} )\n #deck{deck} #d{deck}\n",
        info = entity.info,
        link = entity.link,
    );
    if let Some(account) = requester {
        text.push_str("----\nリクエスト: ");
        text.push_str(&requester_name(account));
    }
    text
}

fn requester_name(account: &Account) -> String {
    match account.display_name.as_deref() {
        Some(display_name) if !display_name.is_empty() => {
            format!("{display_name}さん ({})", account.username)
        }
        _ => format!("{}さん", account.username),
    }
}

/// Posts play announcements.
pub struct PlayAnnouncer {
    announcer: Arc<dyn Announcer>,
    accounts: Arc<dyn AccountLookup>,
    alerts: AlertHandle,
    visibility: StatusVisibility,
}

impl PlayAnnouncer {
    pub fn new(
        announcer: Arc<dyn Announcer>,
        accounts: Arc<dyn AccountLookup>,
        alerts: AlertHandle,
        visibility: StatusVisibility,
    ) -> Self {
        Self {
            announcer,
            accounts,
            alerts,
            visibility,
        }
    }

    /// Announce one play. Exactly one post is attempted.
    pub async fn announce(&self, request: PlayRequest) -> Result<(), AnnounceError> {
        let PlayRequest { deck, entity } = request;

        let requester = match self.accounts.get(entity.account_id).await {
            Ok(account) => Some(account),
            Err(e) => {
                warn!(
                    %deck,
                    account_id = entity.account_id,
                    error = %e,
                    "Failed to look up requester, announcing without it"
                );
                self.alerts.notify(
                    format!(
                        "Deck {deck}: failed to look up account {}",
                        entity.account_id
                    ),
                    Some(e.to_string()),
                );
                None
            }
        };

        let text = compose_announcement(deck, &entity, requester.as_ref());

        if let Err(e) = self.announcer.post(&text, self.visibility).await {
            self.alerts.notify(
                format!("Deck {deck}: failed to announce request {}", entity.id),
                Some(e.to_string()),
            );
            return Err(AnnounceError::Post(e));
        }

        info!(%deck, request_id = %entity.id, "Play announced");
        Ok(())
    }
}

impl Processor<PlayRequest> for PlayAnnouncer {
    type Output = ();
    type Error = AnnounceError;

    async fn process(&self, request: PlayRequest) -> Result<(), AnnounceError> {
        self.announce(request).await
    }
}
