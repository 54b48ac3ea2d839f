//! The narrow slice of the Discord API the notification core depends on.
//!
//! Everything that sends, deletes or reads messages goes through
//! [`ChatTransport`], handed to each component at construction. The serenity
//! implementation lives here too; tests swap in a recording double.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ButtonStyle, ChannelId, CreateActionRow, CreateButton, CreateMessage, GetMessages, Http,
    MessageId,
};
use thiserror::Error;

/// How a single platform call failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The channel or message no longer exists
    #[error("not found")]
    NotFound,

    /// The bot lacks permission for this action
    #[error("forbidden")]
    Forbidden,

    /// Network, timeout, rate limit or any other platform failure
    #[error("transport failure: {0}")]
    Transport(String),
}

/// One interactive button as it should appear on a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedControl {
    pub custom_id: String,
    pub label: String,
    pub style: ButtonStyle,
}

/// Platform-neutral description of a message to send
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutgoingMessage {
    pub content: String,
    pub controls: Vec<RenderedControl>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            controls: Vec::new(),
        }
    }

    pub fn with_controls(mut self, controls: Vec<RenderedControl>) -> Self {
        self.controls = controls;
        self
    }
}

/// Result of deleting one message. Background callers log it and move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyGone,
    Forbidden,
    Failed(String),
}

impl DeleteOutcome {
    pub fn from_result(result: Result<(), DeliveryError>) -> Self {
        match result {
            Ok(()) => DeleteOutcome::Deleted,
            Err(DeliveryError::NotFound) => DeleteOutcome::AlreadyGone,
            Err(DeliveryError::Forbidden) => DeleteOutcome::Forbidden,
            Err(DeliveryError::Transport(msg)) => DeleteOutcome::Failed(msg),
        }
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Check that a channel id still resolves to a channel the bot can see
    async fn resolve_channel(&self, channel_id: ChannelId) -> Result<(), DeliveryError>;

    async fn send_message(
        &self,
        channel_id: ChannelId,
        message: &OutgoingMessage,
    ) -> Result<MessageId, DeliveryError>;

    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DeliveryError>;

    /// Ids of the newest `limit` messages in a channel, newest first
    async fn recent_messages(
        &self,
        channel_id: ChannelId,
        limit: u8,
    ) -> Result<Vec<MessageId>, DeliveryError>;
}

/// Map a serenity error onto the delivery taxonomy by HTTP status
pub fn classify(err: &serenity::Error) -> DeliveryError {
    if let serenity::Error::Http(http_err) = err {
        match http_err.status_code().map(|status| status.as_u16()) {
            Some(404) => return DeliveryError::NotFound,
            Some(403) => return DeliveryError::Forbidden,
            _ => {}
        }
    }
    DeliveryError::Transport(err.to_string())
}

/// `ChatTransport` over serenity's REST client
#[derive(Clone)]
pub struct SerenityTransport {
    http: Arc<Http>,
}

impl SerenityTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    fn build(message: &OutgoingMessage) -> CreateMessage {
        let mut builder = CreateMessage::new().content(message.content.clone());

        if !message.controls.is_empty() {
            let buttons = message
                .controls
                .iter()
                .map(|control| {
                    CreateButton::new(control.custom_id.clone())
                        .label(control.label.clone())
                        .style(control.style)
                })
                .collect();
            builder = builder.components(vec![CreateActionRow::Buttons(buttons)]);
        }

        builder
    }
}

#[async_trait]
impl ChatTransport for SerenityTransport {
    async fn resolve_channel(&self, channel_id: ChannelId) -> Result<(), DeliveryError> {
        self.http
            .get_channel(channel_id)
            .await
            .map(|_| ())
            .map_err(|e| classify(&e))
    }

    async fn send_message(
        &self,
        channel_id: ChannelId,
        message: &OutgoingMessage,
    ) -> Result<MessageId, DeliveryError> {
        channel_id
            .send_message(&*self.http, Self::build(message))
            .await
            .map(|sent| sent.id)
            .map_err(|e| classify(&e))
    }

    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DeliveryError> {
        channel_id
            .delete_message(&self.http, message_id)
            .await
            .map_err(|e| classify(&e))
    }

    async fn recent_messages(
        &self,
        channel_id: ChannelId,
        limit: u8,
    ) -> Result<Vec<MessageId>, DeliveryError> {
        channel_id
            .messages(&*self.http, GetMessages::new().limit(limit))
            .await
            .map(|messages| messages.into_iter().map(|m| m.id).collect())
            .map_err(|e| classify(&e))
    }
}
