use crate::history::tier::StorageTier;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(8))
        .connect(database_url)
        .await
        .context("failed to connect to the history database")
}

/// Creates the per-tier tables and their time index when missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for tier in StorageTier::ALL {
        let table = tier.bucket();
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                measurement text NOT NULL,
                device_wwn text NOT NULL,
                device_protocol text NOT NULL,
                ts timestamptz NOT NULL,
                fields jsonb NOT NULL DEFAULT '{{}}'::jsonb,
                PRIMARY KEY (measurement, device_wwn, ts)
            )
            "#
        ))
        .execute(pool)
        .await
        .with_context(|| format!("failed to create table {table}"))?;
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {table}_measurement_ts_idx ON {table} (measurement, ts DESC)"
        ))
        .execute(pool)
        .await
        .with_context(|| format!("failed to create index on {table}"))?;
    }
    Ok(())
}
