use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serenity::all::{ChannelId, MessageId};
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::services::transport::{ChatTransport, DeleteOutcome, DeliveryError, OutgoingMessage};

/// Opaque reference to a scheduled deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeletionHandle(u64);

/// A deletion waiting for its retention window to elapse
#[derive(Debug, Clone)]
pub struct PendingDeletion {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub fire_at: Instant,
}

struct PendingEntry {
    deletion: PendingDeletion,
    abort: AbortHandle,
}

/// A message that made it to the channel
#[derive(Debug, Clone)]
pub struct Published {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub deletion: Option<DeletionHandle>,
}

/// Posts broadcasts and removes them again once their retention window is over
pub struct BroadcastScheduler {
    transport: Arc<dyn ChatTransport>,
    pending: Arc<DashMap<DeletionHandle, PendingEntry>>,
    next_handle: AtomicU64,
}

impl BroadcastScheduler {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            pending: Arc::new(DashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Send `message` to `channel_id`, deleting it `retention` after the send
    /// completed. `None` keeps the message forever.
    pub async fn publish(
        &self,
        channel_id: ChannelId,
        message: &OutgoingMessage,
        retention: Option<Duration>,
    ) -> Result<Published, DeliveryError> {
        self.transport.resolve_channel(channel_id).await?;
        let message_id = self.transport.send_message(channel_id, message).await?;

        let deletion = retention.map(|retention| {
            let fire_at = Instant::now() + retention;
            self.schedule_deletion(channel_id, message_id, fire_at)
        });

        debug!(
            "Published message {} in channel {} (retention: {:?})",
            message_id, channel_id, retention
        );

        Ok(Published {
            channel_id,
            message_id,
            deletion,
        })
    }

    fn schedule_deletion(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        fire_at: Instant,
    ) -> DeletionHandle {
        let handle = DeletionHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let transport = self.transport.clone();
        let pending = self.pending.clone();

        // The task holds off until its entry is registered, so its own
        // removal can never run ahead of the insert
        let (armed_tx, armed_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            if armed_rx.await.is_err() {
                return;
            }
            sleep_until(fire_at).await;

            let outcome =
                DeleteOutcome::from_result(transport.delete_message(channel_id, message_id).await);
            log_deletion(channel_id, message_id, &outcome);

            pending.remove(&handle);
        });

        self.pending.insert(
            handle,
            PendingEntry {
                deletion: PendingDeletion {
                    channel_id,
                    message_id,
                    fire_at,
                },
                abort: task.abort_handle(),
            },
        );
        let _ = armed_tx.send(());

        handle
    }

    /// Cancel a scheduled deletion. Returns false if it already ran.
    pub fn cancel(&self, handle: DeletionHandle) -> bool {
        match self.pending.remove(&handle) {
            Some((_, entry)) => {
                entry.abort.abort();
                debug!(
                    "Cancelled deletion of message {} in channel {}",
                    entry.deletion.message_id, entry.deletion.channel_id
                );
                true
            }
            None => false,
        }
    }

    pub fn pending(&self, handle: DeletionHandle) -> Option<PendingDeletion> {
        self.pending.get(&handle).map(|entry| entry.deletion.clone())
    }

    /// Number of deletions still waiting to fire
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

fn log_deletion(channel_id: ChannelId, message_id: MessageId, outcome: &DeleteOutcome) {
    match outcome {
        DeleteOutcome::Deleted => {
            info!("Deleted expired broadcast {} in channel {}", message_id, channel_id);
        }
        DeleteOutcome::AlreadyGone => {
            debug!("Broadcast {} in channel {} was already gone", message_id, channel_id);
        }
        DeleteOutcome::Forbidden => {
            warn!(
                "No permission to delete broadcast {} in channel {}",
                message_id, channel_id
            );
        }
        DeleteOutcome::Failed(e) => {
            warn!(
                "Failed to delete broadcast {} in channel {}: {}",
                message_id, channel_id, e
            );
        }
    }
}
