//! Test doubles shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serenity::all::{ChannelId, MessageId};
use tokio::time::Instant;

use crate::services::transport::{ChatTransport, DeliveryError, OutgoingMessage};

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub message: OutgoingMessage,
}

#[derive(Debug, Clone)]
pub struct DeleteCall {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub at: Instant,
}

#[derive(Default)]
struct State {
    next_id: u64,
    /// channel -> live message ids, oldest first
    channels: HashMap<ChannelId, Vec<MessageId>>,
    forbidden: HashSet<ChannelId>,
    broken: HashSet<ChannelId>,
    sent: Vec<SentMessage>,
    deletes: Vec<DeleteCall>,
}

/// In-memory Discord stand-in that records every call
#[derive(Default)]
pub struct RecordingTransport {
    state: Mutex<State>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register an existing channel
    pub fn add_channel(&self, channel_id: u64) -> ChannelId {
        let id = ChannelId::new(channel_id);
        self.lock().channels.entry(id).or_default();
        id
    }

    /// Register a channel that already holds `count` messages
    pub fn add_channel_with_history(&self, channel_id: u64, count: usize) -> ChannelId {
        let id = self.add_channel(channel_id);
        let mut state = self.lock();
        for _ in 0..count {
            state.next_id += 1;
            let message_id = MessageId::new(state.next_id);
            state.channels.entry(id).or_default().push(message_id);
        }
        id
    }

    /// Every send/delete in this channel is rejected with 403
    pub fn forbid(&self, channel_id: ChannelId) {
        self.lock().forbidden.insert(channel_id);
    }

    /// Every send/delete in this channel fails at the transport level
    pub fn break_channel(&self, channel_id: ChannelId) {
        self.lock().broken.insert(channel_id);
    }

    /// Remove a message out-of-band, like a user deleting it by hand
    pub fn remove_message(&self, channel_id: ChannelId, message_id: MessageId) {
        if let Some(messages) = self.lock().channels.get_mut(&channel_id) {
            messages.retain(|id| *id != message_id);
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    pub fn sent_to(&self, channel_id: ChannelId) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.channel_id == channel_id)
            .collect()
    }

    pub fn deletes(&self) -> Vec<DeleteCall> {
        self.lock().deletes.clone()
    }

    pub fn live_messages(&self, channel_id: ChannelId) -> Vec<MessageId> {
        self.lock()
            .channels
            .get(&channel_id)
            .cloned()
            .unwrap_or_default()
    }

    fn check_access(state: &State, channel_id: ChannelId) -> Result<(), DeliveryError> {
        if !state.channels.contains_key(&channel_id) {
            return Err(DeliveryError::NotFound);
        }
        if state.forbidden.contains(&channel_id) {
            return Err(DeliveryError::Forbidden);
        }
        if state.broken.contains(&channel_id) {
            return Err(DeliveryError::Transport("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn resolve_channel(&self, channel_id: ChannelId) -> Result<(), DeliveryError> {
        if self.lock().channels.contains_key(&channel_id) {
            Ok(())
        } else {
            Err(DeliveryError::NotFound)
        }
    }

    async fn send_message(
        &self,
        channel_id: ChannelId,
        message: &OutgoingMessage,
    ) -> Result<MessageId, DeliveryError> {
        let mut state = self.lock();
        Self::check_access(&state, channel_id)?;

        state.next_id += 1;
        let message_id = MessageId::new(state.next_id);
        state.channels.entry(channel_id).or_default().push(message_id);
        state.sent.push(SentMessage {
            channel_id,
            message_id,
            message: message.clone(),
        });
        Ok(message_id)
    }

    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DeliveryError> {
        let mut state = self.lock();
        state.deletes.push(DeleteCall {
            channel_id,
            message_id,
            at: Instant::now(),
        });
        Self::check_access(&state, channel_id)?;

        let messages = state.channels.entry(channel_id).or_default();
        let before = messages.len();
        messages.retain(|id| *id != message_id);
        if messages.len() == before {
            return Err(DeliveryError::NotFound);
        }
        Ok(())
    }

    async fn recent_messages(
        &self,
        channel_id: ChannelId,
        limit: u8,
    ) -> Result<Vec<MessageId>, DeliveryError> {
        let state = self.lock();
        if !state.channels.contains_key(&channel_id) {
            return Err(DeliveryError::NotFound);
        }
        if state.broken.contains(&channel_id) {
            return Err(DeliveryError::Transport("connection reset".into()));
        }
        Ok(state.channels[&channel_id]
            .iter()
            .rev()
            .take(limit as usize)
            .copied()
            .collect())
    }
}

/// Let spawned tasks run after the clock moved
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
