use std::time::Duration;

use serenity::all::{ChannelId, MessageId};
use tracing::{debug, warn};

use crate::services::transport::{ChatTransport, DeleteOutcome};

/// Delete the newest `limit` messages of a channel one at a time.
///
/// Each delete is followed by `pacing` before the next one. A failed delete
/// never stops the sweep; every message gets its own outcome.
pub async fn purge_recent(
    transport: &dyn ChatTransport,
    channel_id: ChannelId,
    limit: u8,
    pacing: Duration,
) -> Vec<(MessageId, DeleteOutcome)> {
    let message_ids = match transport.recent_messages(channel_id, limit).await {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Could not read history of channel {}: {}", channel_id, e);
            return Vec::new();
        }
    };

    let mut outcomes = Vec::with_capacity(message_ids.len());

    for (i, message_id) in message_ids.into_iter().enumerate() {
        if i > 0 && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }

        let outcome = DeleteOutcome::from_result(transport.delete_message(channel_id, message_id).await);
        match &outcome {
            DeleteOutcome::Deleted | DeleteOutcome::AlreadyGone | DeleteOutcome::Forbidden => {
                debug!("Purge {} in channel {}: {:?}", message_id, channel_id, outcome);
            }
            DeleteOutcome::Failed(e) => {
                warn!("Purge of {} in channel {} failed: {}", message_id, channel_id, e);
            }
        }
        outcomes.push((message_id, outcome));
    }

    outcomes
}

/// How many messages a sweep actually removed
pub fn removed_count(outcomes: &[(MessageId, DeleteOutcome)]) -> usize {
    outcomes
        .iter()
        .filter(|(_, outcome)| *outcome == DeleteOutcome::Deleted)
        .count()
}
