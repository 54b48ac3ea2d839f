use std::time::Duration;

use poise::CreateReply;
use serenity::all::{ChannelId, MessageId};
use tracing::info;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::timeouts::MAX_HISTORY_PAGE;
use crate::constants::{embeds, messages};
use crate::services::lifecycle::purge::{purge_recent, removed_count};
use crate::services::transport::{ChatTransport, DeleteOutcome};

/// Delete recent messages in this channel
#[poise::command(slash_command, required_permissions = "MANAGE_MESSAGES", guild_only)]
pub async fn clear(
    ctx: Context<'_>,
    #[description = "削除するメッセージの数"] count: i64,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let channel_id = ctx.channel_id();
    let outcomes = match clear_channel(ctx.data().transport.as_ref(), channel_id, count).await {
        Ok(outcomes) => outcomes,
        Err(e) => {
            let embed = embeds::error_embed().description(e.user_message());
            ctx.send(CreateReply::default().embed(embed).ephemeral(true))
                .await?;
            return Ok(());
        }
    };
    let removed = removed_count(&outcomes);

    info!(
        "{} cleared {} of {} requested messages in channel {}",
        ctx.author().id,
        removed,
        count,
        channel_id
    );

    let embed = embeds::success_embed().description(format!("{}件のメッセージを削除しました。", removed));
    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Validate a requested count; anything below 1 is refused
pub fn clear_limit(count: i64) -> Result<u8, Error> {
    if count <= 0 {
        return Err(Error::InvalidArgument(messages::CLEAR_INVALID_COUNT.to_string()));
    }
    Ok(count.min(MAX_HISTORY_PAGE as i64) as u8)
}

/// Validate `count`, then delete that many recent messages from the channel
async fn clear_channel(
    transport: &dyn ChatTransport,
    channel_id: ChannelId,
    count: i64,
) -> Result<Vec<(MessageId, DeleteOutcome)>, Error> {
    let limit = clear_limit(count)?;
    // The HTTP client already waits out rate limits
    Ok(purge_recent(transport, channel_id, limit, Duration::ZERO).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::testing::RecordingTransport;

    #[test]
    fn test_non_positive_counts_rejected_alike() {
        let zero = assert_err!(clear_limit(0));
        let negative = assert_err!(clear_limit(-5));
        assert_eq!(zero.user_message(), messages::CLEAR_INVALID_COUNT);
        assert_eq!(zero.user_message(), negative.user_message());
    }

    #[test]
    fn test_count_is_capped() {
        assert_eq!(clear_limit(1).unwrap(), 1);
        assert_eq!(clear_limit(100).unwrap(), 100);
        assert_eq!(clear_limit(5000).unwrap(), 100);
    }

    #[tokio::test]
    async fn test_clear_removes_requested_messages() {
        let transport = Arc::new(RecordingTransport::new());
        let channel = transport.add_channel_with_history(10, 8);

        let outcomes = assert_ok!(clear_channel(&*transport, channel, 5).await);
        assert_eq!(removed_count(&outcomes), 5);
        assert_eq!(transport.live_messages(channel).len(), 3);
    }

    #[tokio::test]
    async fn test_rejected_count_deletes_nothing() {
        let transport = Arc::new(RecordingTransport::new());
        let channel = transport.add_channel_with_history(10, 8);

        for count in [0, -5] {
            let err = assert_err!(clear_channel(&*transport, channel, count).await);
            assert_eq!(err.user_message(), messages::CLEAR_INVALID_COUNT);
        }
        assert!(transport.deletes().is_empty());
        assert_eq!(transport.live_messages(channel).len(), 8);
    }
}
