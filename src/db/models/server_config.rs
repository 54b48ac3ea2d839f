use std::fmt;
use std::num::NonZeroU64;

use chrono::{DateTime, Utc};
use serenity::all::ChannelId;

/// The three channel roles a guild can assign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    /// Where the button panel lives
    Button,
    /// Primary announcement channel
    Notify,
    /// Secondary announcement channel
    Sub,
}

impl ChannelRole {
    /// Column in `server_config` owned by this role
    pub fn column(self) -> &'static str {
        match self {
            ChannelRole::Button => "button_channel_id",
            ChannelRole::Notify => "notify_channel_id",
            ChannelRole::Sub => "sub_channel_id",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ChannelRole::Button => "ボタン",
            ChannelRole::Notify => "お知らせ",
            ChannelRole::Sub => "サブお知らせ",
        }
    }

    /// Slash command that assigns this role
    pub fn setup_command(self) -> &'static str {
        match self {
            ChannelRole::Button => "set-button-channel",
            ChannelRole::Notify => "set-notify-channel",
            ChannelRole::Sub => "set-sub-channel",
        }
    }
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelRole::Button => "button",
            ChannelRole::Notify => "notify",
            ChannelRole::Sub => "sub",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ServerConfig {
    pub guild_id: i64,
    pub button_channel_id: Option<i64>,
    pub notify_channel_id: Option<i64>,
    pub sub_channel_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServerConfig {
    /// Raw stored id for a role
    pub fn channel_id(&self, role: ChannelRole) -> Option<i64> {
        match role {
            ChannelRole::Button => self.button_channel_id,
            ChannelRole::Notify => self.notify_channel_id,
            ChannelRole::Sub => self.sub_channel_id,
        }
    }

    /// Channel for a role; a stored zero is treated as unset
    pub fn channel(&self, role: ChannelRole) -> Option<ChannelId> {
        self.channel_id(role)
            .and_then(|id| NonZeroU64::new(id as u64))
            .map(ChannelId::from)
    }

    pub fn button_channel(&self) -> Option<ChannelId> {
        self.channel(ChannelRole::Button)
    }

    pub fn notify_channel(&self) -> Option<ChannelId> {
        self.channel(ChannelRole::Notify)
    }

    pub fn sub_channel(&self) -> Option<ChannelId> {
        self.channel(ChannelRole::Sub)
    }

    /// Roles a button panel needs that are still missing
    pub fn missing_for_panel(&self) -> Vec<ChannelRole> {
        [ChannelRole::Button, ChannelRole::Notify]
            .into_iter()
            .filter(|role| self.channel(*role).is_none())
            .collect()
    }

    /// Both the button and the notify channel are set
    pub fn is_complete(&self) -> bool {
        self.missing_for_panel().is_empty()
    }
}
