use poise::CreateReply;
use tracing::{info, warn};

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::{embeds, messages};
use crate::db::models::ChannelRole;
use crate::utils::formatting::mention_channel;

/// Use this channel as the button channel and post a fresh button panel here
#[poise::command(
    slash_command,
    rename = "set-button-channel",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn set_button_channel(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let channel_id = ctx.channel_id();
    let data = ctx.data();

    let config = data
        .store
        .set_button_channel(guild_id.get(), channel_id.get())
        .await?;

    info!("Guild {} button channel set to {}", guild_id, channel_id);

    let embed = if config.notify_channel().is_some() {
        embeds::success_embed()
            .title("ボタンチャンネル設定")
            .description(format!(
                "ボタンチャンネルを {} に設定しました！ボタンを設置するよっ！",
                mention_channel(channel_id.get())
            ))
    } else {
        embeds::warning_embed()
            .title("ボタンチャンネル設定")
            .description(format!(
                "ボタンチャンネルを {} に設定しました。\n{}",
                mention_channel(channel_id.get()),
                messages::not_configured(ChannelRole::Notify)
            ))
    };

    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    // Sweeping history is paced, so it runs off the command's path
    let reconciler = data.reconciler.clone();
    let guild = guild_id.get();
    tokio::spawn(async move {
        if let Err(e) = reconciler.reconcile_channel(guild, channel_id).await {
            warn!("Failed to reconcile button channel {}: {}", channel_id, e);
        }
    });

    Ok(())
}

/// Use this channel as the primary announcement channel
#[poise::command(
    slash_command,
    rename = "set-notify-channel",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn set_notify_channel(ctx: Context<'_>) -> Result<(), Error> {
    set_role_here(ctx, ChannelRole::Notify).await
}

/// Use this channel as the secondary announcement channel
#[poise::command(
    slash_command,
    rename = "set-sub-channel",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn set_sub_channel(ctx: Context<'_>) -> Result<(), Error> {
    set_role_here(ctx, ChannelRole::Sub).await
}

async fn set_role_here(ctx: Context<'_>, role: ChannelRole) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let channel_id = ctx.channel_id();

    let config = ctx
        .data()
        .store
        .set_channel(guild_id.get(), role, channel_id.get())
        .await?;

    info!("Guild {} {} channel set to {}", guild_id, role, channel_id);

    let mut description = format!(
        "{}チャンネルを {} に設定しました！",
        role.display_name(),
        mention_channel(channel_id.get())
    );

    // Existing panels keep the notify channel they were rendered with
    if role == ChannelRole::Notify && config.button_channel().is_some() {
        description.push_str(&format!(
            "\nボタンに反映するにはボタンチャンネルで `/{}` を実行してください。",
            ChannelRole::Button.setup_command()
        ));
    }

    let embed = embeds::success_embed()
        .title(format!("{}チャンネル設定", role.display_name()))
        .description(description);

    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
