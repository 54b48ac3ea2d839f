//! Brings a guild's button channel back to a clean state: sweep recent
//! history, then post a fresh panel bound to the current notify channel.

use std::sync::Arc;
use std::time::Duration;

use serenity::all::{ChannelId, MessageId};
use tracing::{info, warn};

use crate::components::notify_buttons;
use crate::db::models::ChannelRole;
use crate::db::store::{ConfigStore, StoreError};
use crate::services::broadcast::BroadcastScheduler;
use crate::services::lifecycle::purge::{purge_recent, removed_count};
use crate::services::transport::{ChatTransport, DeleteOutcome, DeliveryError};

/// What happened to one button channel
#[derive(Debug)]
pub struct ReconcileReport {
    pub guild_id: u64,
    pub channel_id: ChannelId,
    pub purged: Vec<(MessageId, DeleteOutcome)>,
    pub panel: PanelOutcome,
}

#[derive(Debug)]
pub enum PanelOutcome {
    Posted(MessageId),
    /// No notify channel to bind the buttons to
    NotConfigured,
    Failed(DeliveryError),
}

/// Per-guild result of the startup pass
#[derive(Debug)]
pub enum StartupOutcome {
    Reconciled(ReconcileReport),
    Skipped {
        guild_id: u64,
        missing: Vec<ChannelRole>,
    },
}

pub struct Reconciler {
    store: Arc<dyn ConfigStore>,
    scheduler: Arc<BroadcastScheduler>,
    transport: Arc<dyn ChatTransport>,
    purge_limit: u8,
    purge_pacing: Duration,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        scheduler: Arc<BroadcastScheduler>,
        transport: Arc<dyn ChatTransport>,
        purge_limit: u8,
        purge_pacing: Duration,
    ) -> Self {
        Self {
            store,
            scheduler,
            transport,
            purge_limit,
            purge_pacing,
        }
    }

    /// Reconcile every guild whose button and notify channels are both set
    pub async fn reconcile_startup(&self) -> Result<Vec<StartupOutcome>, StoreError> {
        let configs = self.store.list_all().await?;
        let mut outcomes = Vec::with_capacity(configs.len());

        for config in configs {
            let guild_id = config.guild_id as u64;

            let (Some(button), Some(notify)) = (config.button_channel(), config.notify_channel())
            else {
                let missing = config.missing_for_panel();
                info!(
                    "Skipping guild {} on startup, missing channels: {:?}",
                    guild_id, missing
                );
                outcomes.push(StartupOutcome::Skipped { guild_id, missing });
                continue;
            };

            let report = self.rebuild(guild_id, button, Some(notify)).await;
            outcomes.push(StartupOutcome::Reconciled(report));
        }

        Ok(outcomes)
    }

    /// Reconcile `channel_id` as the guild's button channel, using the
    /// notify channel currently stored for the guild
    pub async fn reconcile_channel(
        &self,
        guild_id: u64,
        channel_id: ChannelId,
    ) -> Result<ReconcileReport, StoreError> {
        let notify = self
            .store
            .get(guild_id)
            .await?
            .and_then(|config| config.notify_channel());

        Ok(self.rebuild(guild_id, channel_id, notify).await)
    }

    async fn rebuild(
        &self,
        guild_id: u64,
        channel_id: ChannelId,
        notify: Option<ChannelId>,
    ) -> ReconcileReport {
        let purged = purge_recent(
            self.transport.as_ref(),
            channel_id,
            self.purge_limit,
            self.purge_pacing,
        )
        .await;

        let panel = match notify {
            Some(notify) => {
                let surface = notify_buttons::control_surface(notify);
                match self.scheduler.publish(channel_id, &surface, None).await {
                    Ok(published) => PanelOutcome::Posted(published.message_id),
                    Err(e) => {
                        warn!(
                            "Failed to post button panel in channel {} (guild {}): {}",
                            channel_id, guild_id, e
                        );
                        PanelOutcome::Failed(e)
                    }
                }
            }
            None => PanelOutcome::NotConfigured,
        };

        info!(
            "Reconciled guild {} channel {}: purged {}/{}, panel {:?}",
            guild_id,
            channel_id,
            removed_count(&purged),
            purged.len(),
            panel
        );

        ReconcileReport {
            guild_id,
            channel_id,
            purged,
            panel,
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::db::memory::MemoryConfigStore;
    use crate::testing::RecordingTransport;

    struct Fixture {
        transport: Arc<RecordingTransport>,
        store: Arc<MemoryConfigStore>,
        scheduler: Arc<BroadcastScheduler>,
        reconciler: Reconciler,
    }

    fn fixture() -> Fixture {
        let transport = Arc::new(RecordingTransport::new());
        let store = Arc::new(MemoryConfigStore::new());
        let scheduler = Arc::new(BroadcastScheduler::new(transport.clone()));
        let reconciler = Reconciler::new(
            store.clone(),
            scheduler.clone(),
            transport.clone(),
            20,
            Duration::from_secs(1),
        );
        Fixture {
            transport,
            store,
            scheduler,
            reconciler,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_rebuilds_complete_guilds() {
        let f = fixture();
        let button = f.transport.add_channel_with_history(10, 25);
        let notify = f.transport.add_channel(20);
        assert_ok!(f.store.set_button_channel(1, button.get()).await);
        assert_ok!(f.store.set_notify_channel(1, notify.get()).await);

        let outcomes = assert_ok!(f.reconciler.reconcile_startup().await);
        assert_eq!(outcomes.len(), 1);

        let StartupOutcome::Reconciled(report) = &outcomes[0] else {
            panic!("expected reconciliation, got {:?}", outcomes[0]);
        };
        assert_eq!(report.purged.len(), 20);
        assert!(matches!(report.panel, PanelOutcome::Posted(_)));

        // 5 old messages survive the bounded sweep, plus the new panel
        assert_eq!(f.transport.live_messages(button).len(), 6);

        let panel = f.transport.sent_to(button);
        assert_eq!(panel.len(), 1);
        assert_eq!(panel[0].message.controls, notify_buttons::render(notify));
        assert_eq!(f.scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_skips_incomplete_guilds() {
        let f = fixture();
        let button = f.transport.add_channel_with_history(10, 5);
        assert_ok!(f.store.set_button_channel(1, button.get()).await);
        assert_ok!(f.store.set_sub_channel(1, 30).await);

        let outcomes = assert_ok!(f.reconciler.reconcile_startup().await);
        assert!(matches!(
            &outcomes[0],
            StartupOutcome::Skipped { guild_id: 1, missing } if missing == &vec![ChannelRole::Notify]
        ));
        assert!(f.transport.deletes().is_empty());
        assert!(f.transport.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_with_no_guilds() {
        let f = fixture();
        assert!(assert_ok!(f.reconciler.reconcile_startup().await).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_store_down() {
        let f = fixture();
        f.store.set_offline(true);
        assert_err!(f.reconciler.reconcile_startup().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconcile_channel_without_notify() {
        let f = fixture();
        let channel = f.transport.add_channel_with_history(10, 3);
        assert_ok!(f.store.set_button_channel(1, channel.get()).await);

        let report = assert_ok!(f.reconciler.reconcile_channel(1, channel).await);
        assert_eq!(report.purged.len(), 3);
        assert!(matches!(report.panel, PanelOutcome::NotConfigured));
        assert!(f.transport.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconcile_channel_binds_current_notify() {
        let f = fixture();
        let channel = f.transport.add_channel(10);
        let notify = f.transport.add_channel(20);
        assert_ok!(f.store.set_notify_channel(1, notify.get()).await);

        let report = assert_ok!(f.reconciler.reconcile_channel(1, channel).await);
        assert!(matches!(report.panel, PanelOutcome::Posted(_)));
        assert_eq!(
            f.transport.sent_to(channel)[0].message.controls[0].custom_id,
            "chamuru_now_20"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_broken_channel_reports_failed_panel() {
        let f = fixture();
        let channel = f.transport.add_channel_with_history(10, 2);
        let notify = f.transport.add_channel(20);
        assert_ok!(f.store.set_notify_channel(1, notify.get()).await);
        f.transport.break_channel(channel);

        let report = assert_ok!(f.reconciler.reconcile_channel(1, channel).await);
        assert!(report.purged.is_empty());
        assert!(matches!(report.panel, PanelOutcome::Failed(DeliveryError::Transport(_))));
    }
}
