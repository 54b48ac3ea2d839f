use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::db::models::{ChannelRole, ServerConfig};
use crate::db::store::{ConfigStore, StoreError};

/// In-memory `ConfigStore` with the same upsert contract as the Postgres one
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    rows: Mutex<BTreeMap<u64, ServerConfig>>,
    offline: AtomicBool,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `StoreError::Offline` until switched back
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Offline("memory store switched offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn set_channel(
        &self,
        guild_id: u64,
        role: ChannelRole,
        channel_id: u64,
    ) -> Result<ServerConfig, StoreError> {
        self.check_online()?;
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();

        let row = rows.entry(guild_id).or_insert_with(|| ServerConfig {
            guild_id: guild_id as i64,
            button_channel_id: None,
            notify_channel_id: None,
            sub_channel_id: None,
            created_at: now,
            updated_at: now,
        });

        let value = Some(channel_id as i64);
        match role {
            ChannelRole::Button => row.button_channel_id = value,
            ChannelRole::Notify => row.notify_channel_id = value,
            ChannelRole::Sub => row.sub_channel_id = value,
        }

        // Keep updated_at strictly increasing even within one clock tick
        row.updated_at = if now > row.updated_at {
            now
        } else {
            row.updated_at + Duration::microseconds(1)
        };

        Ok(row.clone())
    }

    async fn get(&self, guild_id: u64) -> Result<Option<ServerConfig>, StoreError> {
        self.check_online()?;
        let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        Ok(rows.get(&guild_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<ServerConfig>, StoreError> {
        self.check_online()?;
        let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        Ok(rows.values().cloned().collect())
    }
}
