//! The button panel posted in each guild's button channel.
//!
//! Every button is described by a static [`ControlSpec`]. The notify channel
//! known when the panel is rendered is baked into each button's custom id,
//! so `Notify` buttons keep posting there even if the setting changes later.
//! `Sub` buttons look the sub channel up again on every press.

use std::num::NonZeroU64;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serenity::all::{
    ButtonStyle, ChannelId, ComponentInteraction, Context, EditInteractionResponse,
};
use tracing::{debug, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::messages;
use crate::constants::timeouts::{
    format_duration, NIGHT_BROADCAST_RETENTION, NOW_BROADCAST_RETENTION, OCCUPY_ALERT_RETENTION,
};
use crate::db::models::{ChannelRole, ServerConfig};
use crate::db::store::ConfigStore;
use crate::handlers::interaction::send_component_error;
use crate::services::broadcast::{BroadcastScheduler, Published};
use crate::services::transport::{OutgoingMessage, RenderedControl};

pub const CUSTOM_ID_PREFIX: &str = "chamuru_";

/// What one button on the panel does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSpec {
    /// Stable key used in the custom id; must not contain '_'
    pub key: &'static str,
    pub label: &'static str,
    pub style: ButtonStyle,
    pub target: ChannelRole,
    /// `{user}` is replaced with the presser's display name
    pub template: &'static str,
    pub retention: Duration,
}

pub static CONTROLS: [ControlSpec; 3] = [
    ControlSpec {
        key: "now",
        label: "🚀 ちゃむる！",
        style: ButtonStyle::Success,
        target: ChannelRole::Notify,
        template: "@everyone\n🌟 わーい！掘るちゃむよ～！🌟\n {user} が教えてくれたよっ！🎉",
        retention: NOW_BROADCAST_RETENTION,
    },
    ControlSpec {
        key: "night",
        label: "🌙 夜ちゃむ",
        style: ButtonStyle::Primary,
        target: ChannelRole::Sub,
        template: "@everyone\n🌙 今夜もちゃむるよ～！🌙\n {user} からのお誘いだよっ！",
        retention: NIGHT_BROADCAST_RETENTION,
    },
    ControlSpec {
        key: "occupy",
        label: "⛏️ 占有中",
        style: ButtonStyle::Danger,
        target: ChannelRole::Notify,
        template: "⚠️ いま {user} が占有中だよっ！終わるまでちょっと待っててね！",
        retention: OCCUPY_ALERT_RETENTION,
    },
];

pub fn find(key: &str) -> Option<&'static ControlSpec> {
    CONTROLS.iter().find(|spec| spec.key == key)
}

pub fn custom_id(spec: &ControlSpec, notify_channel: ChannelId) -> String {
    format!("{}{}_{}", CUSTOM_ID_PREFIX, spec.key, notify_channel)
}

/// Parse `chamuru_{key}_{notify_channel_id}` back into its parts
pub fn parse_custom_id(custom_id: &str) -> Option<(&'static ControlSpec, ChannelId)> {
    let rest = custom_id.strip_prefix(CUSTOM_ID_PREFIX)?;
    let (key, channel) = rest.split_once('_')?;
    let spec = find(key)?;
    let channel = NonZeroU64::new(channel.parse().ok()?)?;
    Some((spec, ChannelId::from(channel)))
}

/// Buttons bound to the notify channel known right now
pub fn render(notify_channel: ChannelId) -> Vec<RenderedControl> {
    CONTROLS
        .iter()
        .map(|spec| RenderedControl {
            custom_id: custom_id(spec, notify_channel),
            label: spec.label.to_string(),
            style: spec.style,
        })
        .collect()
}

/// The full panel message posted into a button channel
pub fn control_surface(notify_channel: ChannelId) -> OutgoingMessage {
    OutgoingMessage::text(messages::CONTROL_SURFACE_HEADER).with_controls(render(notify_channel))
}

pub fn render_template(spec: &ControlSpec, display_name: &str) -> String {
    spec.template.replace("{user}", display_name)
}

/// Where a press should post: the captured channel for `Notify`, the live
/// setting for `Sub`
pub fn resolve_target(
    spec: &ControlSpec,
    captured_notify: ChannelId,
    live: Option<&ServerConfig>,
) -> Result<ChannelId, Error> {
    match spec.target {
        ChannelRole::Notify => Ok(captured_notify),
        ChannelRole::Sub => live
            .and_then(ServerConfig::sub_channel)
            .ok_or(Error::NotConfigured(ChannelRole::Sub)),
        ChannelRole::Button => Err(Error::InvalidArgument(format!(
            "control '{}' cannot post to the button channel",
            spec.key
        ))),
    }
}

/// Everything known about a single button press
#[derive(Debug, Clone)]
pub struct Activation {
    pub spec: &'static ControlSpec,
    pub guild_id: u64,
    pub captured_notify: ChannelId,
    pub display_name: String,
}

/// Post the broadcast for a press
pub async fn activate(
    store: &dyn ConfigStore,
    scheduler: &BroadcastScheduler,
    activation: &Activation,
) -> Result<Published, Error> {
    let spec = activation.spec;

    let live = match spec.target {
        ChannelRole::Sub => store.get(activation.guild_id).await?,
        _ => None,
    };
    let target = resolve_target(spec, activation.captured_notify, live.as_ref())?;

    let body = OutgoingMessage::text(render_template(spec, &activation.display_name));
    scheduler
        .publish(target, &body, Some(spec.retention))
        .await
        .map_err(|e| Error::delivery(target.get(), e))
}

/// How a press gets answered: acknowledged at once, then completed with the
/// outcome. Discord drops interactions that stay unanswered for 3 seconds.
#[async_trait]
pub trait PressResponder: Send + Sync {
    async fn acknowledge(&self) -> Result<(), Error>;

    async fn finish(&self, content: String) -> Result<(), Error>;
}

struct InteractionResponder<'a> {
    ctx: &'a Context,
    component: &'a ComponentInteraction,
}

#[async_trait]
impl PressResponder for InteractionResponder<'_> {
    async fn acknowledge(&self) -> Result<(), Error> {
        self.component.defer_ephemeral(self.ctx).await?;
        Ok(())
    }

    async fn finish(&self, content: String) -> Result<(), Error> {
        self.component
            .edit_response(self.ctx, EditInteractionResponse::new().content(content))
            .await?;
        Ok(())
    }
}

/// Acknowledge the press, post its broadcast, then report exactly one outcome
pub async fn respond_to_press(
    responder: &dyn PressResponder,
    store: &dyn ConfigStore,
    scheduler: &BroadcastScheduler,
    activation: &Activation,
) -> Result<(), Error> {
    responder.acknowledge().await?;

    let spec = activation.spec;
    let reply = match activate(store, scheduler, activation).await {
        Ok(published) => {
            debug!(
                "Control '{}' in guild {} posted {}",
                spec.key, activation.guild_id, published.message_id
            );
            format!(
                "{}\n（{}後に自動で消えるよ）",
                messages::BROADCAST_SENT,
                format_duration(spec.retention)
            )
        }
        Err(e) => {
            warn!(
                "Control '{}' failed in guild {}: {}",
                spec.key, activation.guild_id, e
            );
            e.user_message()
        }
    };

    responder.finish(reply).await
}

/// Handle a click on one of the panel buttons
pub async fn handle_press(
    ctx: &Context,
    data: &Arc<Data>,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    let custom_id = &component.data.custom_id;

    let Some((spec, captured_notify)) = parse_custom_id(custom_id) else {
        send_component_error(ctx, component, "このボタンは使えなくなりました。").await?;
        return Ok(());
    };

    let Some(guild_id) = component.guild_id else {
        send_component_error(ctx, component, "このボタンはサーバー内でのみ使えます。").await?;
        return Ok(());
    };

    let display_name = component
        .member
        .as_ref()
        .map(|m| m.display_name().to_string())
        .unwrap_or_else(|| component.user.display_name().to_string());

    debug!("Control '{}' pressed by {}", spec.key, component.user.id);

    let activation = Activation {
        spec,
        guild_id: guild_id.get(),
        captured_notify,
        display_name,
    };

    let responder = InteractionResponder { ctx, component };
    respond_to_press(&responder, data.store.as_ref(), &data.scheduler, &activation).await
}
