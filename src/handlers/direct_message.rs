use std::sync::Arc;

use serenity::all::{Context, Message};
use tracing::{debug, error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;

/// Relay a direct message from the configured admin to every guild
pub async fn handle_message(ctx: &Context, data: &Arc<Data>, message: &Message) -> Result<(), Error> {
    if !is_direct(message) {
        return Ok(());
    }

    if !data.settings.is_admin(message.author.id.get()) {
        debug!("Ignoring direct message from {}", message.author.id);
        return Ok(());
    }

    if message.content.trim().is_empty() {
        return Ok(());
    }

    info!("Relaying admin message from {}", message.author.id);

    let reply = match data.relay.relay(&message.content).await {
        Ok(report) => data.relay.confirmation(&report),
        Err(e) => {
            error!("Relay aborted, could not list guilds: {}", e);
            Error::Store(e).user_message()
        }
    };

    message.channel_id.say(ctx, reply).await?;

    Ok(())
}

/// Whether this message is a candidate for the admin relay
pub fn is_direct(message: &Message) -> bool {
    message.guild_id.is_none() && !message.author.bot
}
