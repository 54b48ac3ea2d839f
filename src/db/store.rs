//! Config Store: the durable guild -> channel roles mapping.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::db::models::{ChannelRole, ServerConfig};
use crate::db::queries::server_config;

/// The persistence layer could not be reached. "No row" is never an error.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Offline(String),
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Atomic upsert of a single role. Other roles on the row are untouched.
    async fn set_channel(
        &self,
        guild_id: u64,
        role: ChannelRole,
        channel_id: u64,
    ) -> Result<ServerConfig, StoreError>;

    async fn get(&self, guild_id: u64) -> Result<Option<ServerConfig>, StoreError>;

    /// Every stored guild, possibly none
    async fn list_all(&self) -> Result<Vec<ServerConfig>, StoreError>;

    async fn set_button_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<ServerConfig, StoreError> {
        self.set_channel(guild_id, ChannelRole::Button, channel_id).await
    }

    async fn set_notify_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<ServerConfig, StoreError> {
        self.set_channel(guild_id, ChannelRole::Notify, channel_id).await
    }

    async fn set_sub_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<ServerConfig, StoreError> {
        self.set_channel(guild_id, ChannelRole::Sub, channel_id).await
    }
}

/// Postgres-backed store. Concurrency control is the `ON CONFLICT` upsert.
#[derive(Debug, Clone)]
pub struct PgConfigStore {
    pool: PgPool,
}

impl PgConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigStore for PgConfigStore {
    async fn set_channel(
        &self,
        guild_id: u64,
        role: ChannelRole,
        channel_id: u64,
    ) -> Result<ServerConfig, StoreError> {
        debug!("Upserting {} = {} for guild {}", role.column(), channel_id, guild_id);
        let config =
            server_config::upsert_channel(&self.pool, guild_id as i64, role, channel_id as i64)
                .await?;
        Ok(config)
    }

    async fn get(&self, guild_id: u64) -> Result<Option<ServerConfig>, StoreError> {
        Ok(server_config::get(&self.pool, guild_id as i64).await?)
    }

    async fn list_all(&self) -> Result<Vec<ServerConfig>, StoreError> {
        Ok(server_config::list_all(&self.pool).await?)
    }
}
