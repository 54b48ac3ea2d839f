use sqlx::PgPool;

use crate::db::models::{ChannelRole, ServerConfig};

pub async fn get(pool: &PgPool, guild_id: i64) -> Result<Option<ServerConfig>, sqlx::Error> {
    sqlx::query_as::<_, ServerConfig>(
        "SELECT * FROM server_config WHERE guild_id = $1"
    )
    .bind(guild_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<ServerConfig>, sqlx::Error> {
    sqlx::query_as::<_, ServerConfig>(
        "SELECT * FROM server_config ORDER BY guild_id"
    )
    .fetch_all(pool)
    .await
}

/// Insert a row with only `role` populated, or update just that column
pub async fn upsert_channel(
    pool: &PgPool,
    guild_id: i64,
    role: ChannelRole,
    channel_id: i64,
) -> Result<ServerConfig, sqlx::Error> {
    let query = match role {
        ChannelRole::Button => {
            r#"
            INSERT INTO server_config (guild_id, button_channel_id)
            VALUES ($1, $2)
            ON CONFLICT (guild_id) DO UPDATE
            SET button_channel_id = EXCLUDED.button_channel_id, updated_at = NOW()
            RETURNING *
            "#
        }
        ChannelRole::Notify => {
            r#"
            INSERT INTO server_config (guild_id, notify_channel_id)
            VALUES ($1, $2)
            ON CONFLICT (guild_id) DO UPDATE
            SET notify_channel_id = EXCLUDED.notify_channel_id, updated_at = NOW()
            RETURNING *
            "#
        }
        ChannelRole::Sub => {
            r#"
            INSERT INTO server_config (guild_id, sub_channel_id)
            VALUES ($1, $2)
            ON CONFLICT (guild_id) DO UPDATE
            SET sub_channel_id = EXCLUDED.sub_channel_id, updated_at = NOW()
            RETURNING *
            "#
        }
    };

    sqlx::query_as::<_, ServerConfig>(query)
        .bind(guild_id)
        .bind(channel_id)
        .fetch_one(pool)
        .await
}
