use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, GatewayIntents, GuildId};
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::commands;
use crate::config::Settings;
use crate::constants::messages;
use crate::db::store::PgConfigStore;
use crate::handlers::event_handler::event_handler;
use crate::services::lifecycle::StartupOutcome;
use crate::services::transport::SerenityTransport;

pub async fn run(settings: Settings, pool: PgPool) -> Result<(), Error> {
    let token = settings.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::setup::set_button_channel(),
                commands::setup::set_notify_channel(),
                commands::setup::set_sub_channel(),
                commands::clear::clear(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: None, // Disable prefix commands - only use slash commands
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Command error: {:?}", error);
                            let _ = ctx.send(ephemeral_notice(error.user_message())).await;
                        }
                        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
                            let _ = ctx
                                .send(ephemeral_notice(format!("Invalid argument: {}", error)))
                                .await;
                        }
                        poise::FrameworkError::MissingUserPermissions { ctx, .. } => {
                            let _ = ctx
                                .send(ephemeral_notice(messages::MISSING_USER_PERMISSION))
                                .await;
                        }
                        poise::FrameworkError::UnknownCommand { .. } => {
                            // Prefix commands are disabled; pings land here
                        }
                        err => {
                            error!("Framework error: {:?}", err);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as {}", ready.user.name);

                let store = Arc::new(PgConfigStore::new(pool));
                let transport = Arc::new(SerenityTransport::new(ctx.http.clone()));
                let data = Arc::new(Data::new(settings, store, transport));

                if data.settings.admin_user_id.is_none() {
                    warn!("ADMIN_USER_ID not set, direct message relay is disabled");
                }

                // Rebuild every button panel without holding up the gateway
                let reconciler = data.reconciler.clone();
                tokio::spawn(async move {
                    match reconciler.reconcile_startup().await {
                        Ok(outcomes) => {
                            let reconciled = outcomes
                                .iter()
                                .filter(|o| matches!(o, StartupOutcome::Reconciled(_)))
                                .count();
                            info!(
                                "Startup reconciliation done: {} reconciled, {} skipped",
                                reconciled,
                                outcomes.len() - reconciled
                            );
                        }
                        Err(e) => {
                            warn!("Startup reconciliation failed: {}", e);
                        }
                    }
                });

                register_commands(ctx, framework, data.settings.guild_id).await?;

                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .map_err(Error::Serenity)?;

    info!("Starting Discord client...");
    client.start().await.map_err(Error::Serenity)
}

/// Register commands in one guild when `GUILD_ID` is set, otherwise globally
async fn register_commands(
    ctx: &serenity::Context,
    framework: &poise::Framework<Arc<Data>, Error>,
    guild_id: Option<u64>,
) -> Result<(), Error> {
    let commands = &framework.options().commands;

    match guild_id {
        Some(guild_id) => {
            let guild_id = GuildId::new(guild_id);
            info!("Registering {} commands in guild {}", commands.len(), guild_id);

            if let Err(e) = poise::builtins::register_in_guild(ctx, commands, guild_id).await {
                error!("[FAIL] Failed to register guild commands: {:?}", e);
                error!("Ensure the bot was invited with the 'applications.commands' scope");
                return Err(Error::Serenity(e));
            }
            info!("[OK] Registered guild commands for {}", guild_id);
        }
        None => {
            info!("Registering {} commands globally", commands.len());

            if let Err(e) = poise::builtins::register_globally(ctx, commands).await {
                error!("Failed to register commands globally: {:?}", e);
                return Err(Error::Serenity(e));
            }
            info!("Note: Global commands can take up to 1 hour to appear in all servers");
        }
    }

    Ok(())
}

/// Replies to failed commands are only shown to the invoking user
fn ephemeral_notice(content: impl Into<String>) -> poise::CreateReply {
    poise::CreateReply::default()
        .content(content.into())
        .ephemeral(true)
}
