use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    info!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    info!("Database connection established");

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    let migrations = [
        include_str!("../../migrations/001_server_config.sql"),
        include_str!("../../migrations/002_server_config_timestamptz.sql"),
    ];

    for (i, migration) in migrations.iter().enumerate() {
        info!("Running migration {}", i + 1);
        for statement in split_statements(migration) {
            if let Err(e) = sqlx::query(statement).execute(pool).await {
                // Migrations are replayed on every start
                let err_str = e.to_string();
                if !err_str.contains("already exists") && !err_str.contains("duplicate key") {
                    return Err(e);
                }
            }
        }
    }

    info!("Migrations completed successfully");
    Ok(())
}

/// Split a migration file into executable statements, dropping comment-only chunks.
/// Semicolons inside `$$ ... $$` bodies do not end a statement.
fn split_statements(migration: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut in_dollar_body = false;
    let mut start = 0;
    let mut i = 0;
    let bytes = migration.as_bytes();

    while i < bytes.len() {
        if bytes[i..].starts_with(b"$$") {
            in_dollar_body = !in_dollar_body;
            i += 2;
            continue;
        }
        if bytes[i] == b';' && !in_dollar_body {
            statements.push(&migration[start..i]);
            start = i + 1;
        }
        i += 1;
    }
    statements.push(&migration[start..]);

    statements
        .into_iter()
        .map(str::trim)
        .filter(|statement| {
            statement
                .lines()
                .any(|line| !line.trim().is_empty() && !line.trim_start().starts_with("--"))
        })
        .collect()
}
