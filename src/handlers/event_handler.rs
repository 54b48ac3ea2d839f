use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, FullEvent};
use tracing::{debug, error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::handlers::{direct_message, interaction};

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Arc<Data>, Error>,
    data: &Arc<Data>,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            info!("Bot ready as {}", data_about_bot.user.name);
        }

        FullEvent::Message { new_message } => {
            if direct_message::is_direct(new_message) {
                if let Err(e) = direct_message::handle_message(ctx, data, new_message).await {
                    error!("Direct message handler error: {:?}", e);
                }
            }
        }

        FullEvent::InteractionCreate { interaction } => {
            // Poise handles ApplicationCommand (slash commands) automatically
            if let serenity::Interaction::Component(_) = interaction {
                if let Err(e) = interaction::handle_interaction(ctx, data, interaction).await {
                    error!("Component interaction handler error: {:?}", e);
                }
            }
        }

        FullEvent::GuildDelete { incomplete, .. } => {
            // Stored config is kept; the guild may come back
            debug!("Guild {} removed", incomplete.id);
        }

        _ => {}
    }

    Ok(())
}
