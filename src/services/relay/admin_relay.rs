use std::sync::Arc;

use serenity::all::MessageId;
use tracing::{info, warn};

use crate::config::RelayConfirmation;
use crate::constants::messages;
use crate::db::store::{ConfigStore, StoreError};
use crate::services::broadcast::BroadcastScheduler;
use crate::services::transport::{DeliveryError, OutgoingMessage};

/// Per-guild outcomes of one relay fan-out
#[derive(Debug, Default)]
pub struct RelayReport {
    pub results: Vec<(u64, Result<MessageId, DeliveryError>)>,
    /// Guilds without a notify channel
    pub skipped: Vec<u64>,
}

impl RelayReport {
    pub fn delivered(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_err()).count()
    }
}

/// Fans an admin's direct message out to every guild's notify channel
pub struct AdminRelay {
    store: Arc<dyn ConfigStore>,
    scheduler: Arc<BroadcastScheduler>,
    confirmation: RelayConfirmation,
}

impl AdminRelay {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        scheduler: Arc<BroadcastScheduler>,
        confirmation: RelayConfirmation,
    ) -> Self {
        Self {
            store,
            scheduler,
            confirmation,
        }
    }

    /// Post `body` to every configured notify channel. One guild failing
    /// does not stop the others.
    pub async fn relay(&self, body: &str) -> Result<RelayReport, StoreError> {
        let configs = self.store.list_all().await?;
        let message = OutgoingMessage::text(messages::wrap_relay_body(body));
        let mut report = RelayReport::default();

        for config in configs {
            let guild_id = config.guild_id as u64;

            let Some(notify) = config.notify_channel() else {
                report.skipped.push(guild_id);
                continue;
            };

            let result = self
                .scheduler
                .publish(notify, &message, None)
                .await
                .map(|published| published.message_id);

            if let Err(e) = &result {
                warn!(
                    "Relay to guild {} channel {} failed: {}",
                    guild_id, notify, e
                );
            }
            report.results.push((guild_id, result));
        }

        info!(
            "Relay finished: {} delivered, {} failed, {} unconfigured",
            report.delivered(),
            report.failed(),
            report.skipped.len()
        );

        Ok(report)
    }

    /// The one reply sent back to the admin
    pub fn confirmation(&self, report: &RelayReport) -> String {
        match self.confirmation {
            RelayConfirmation::Always => messages::RELAY_DONE.to_string(),
            RelayConfirmation::Summary => messages::relay_summary(
                report.delivered(),
                report.failed(),
                report.skipped.len(),
            ),
        }
    }
}
