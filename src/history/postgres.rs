use super::plan::SubQuery;
use super::point::{FieldValue, Measurement, Point};
use super::store::TierStore;
use super::tier::StorageTier;
use crate::error::StoreError;
use crate::smart::protocol::Protocol;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;
use sqlx::types::Json as SqlJson;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::collections::BTreeMap;

/// Five binds per row keeps a batch well under the 65535 bind limit.
const WRITE_CHUNK: usize = 1000;

/// Tier store backed by one Postgres table per tier, with the point fields
/// in a `jsonb` column.
#[derive(Debug, Clone)]
pub struct PgTierStore {
    pool: PgPool,
}

impl PgTierStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Renders a sub-query as a newest-first `SELECT` against its tier's table.
pub fn render_query(query: &SubQuery) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT measurement, device_wwn, device_protocol, ts, fields FROM {} WHERE measurement = ",
        query.tier.bucket()
    ));
    builder.push_bind(query.measurement.as_str());
    builder.push(" AND ts >= ").push_bind(query.range.start);
    builder.push(" AND ts < ").push_bind(query.range.stop);
    if let Some(wwn) = query.device_wwn.as_deref() {
        builder.push(" AND device_wwn = ").push_bind(wwn);
    }
    builder.push(" ORDER BY ts DESC, device_wwn");
    if let Some(page) = query.page {
        builder
            .push(" LIMIT ")
            .push_bind(i64::try_from(page.limit).unwrap_or(i64::MAX));
        builder
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.offset).unwrap_or(i64::MAX));
    }
    builder
}

fn decode_row(row: &PgRow) -> Result<Point, StoreError> {
    let measurement: String = row.try_get("measurement")?;
    let measurement = Measurement::parse(&measurement)
        .ok_or_else(|| StoreError::Decode(format!("unknown measurement {measurement:?}")))?;
    let protocol: String = row.try_get("device_protocol")?;
    let device_protocol = protocol
        .parse::<Protocol>()
        .map_err(|err| StoreError::Decode(err.to_string()))?;
    let SqlJson(fields) = row.try_get::<SqlJson<BTreeMap<String, FieldValue>>, _>("fields")?;
    Ok(Point {
        measurement,
        timestamp: row.try_get("ts")?,
        device_wwn: row.try_get("device_wwn")?,
        device_protocol,
        fields,
    })
}

#[async_trait]
impl TierStore for PgTierStore {
    async fn write_points(&self, tier: StorageTier, points: &[Point]) -> Result<usize, StoreError> {
        // One row per key; the last point for a key wins, as a re-write would.
        let mut unique: BTreeMap<(Measurement, &str, DateTime<Utc>), &Point> = BTreeMap::new();
        for point in points {
            unique.insert(
                (point.measurement, point.device_wwn.as_str(), point.timestamp),
                point,
            );
        }
        let rows = unique
            .into_values()
            .map(|point| {
                serde_json::to_value(&point.fields)
                    .map(|fields| (point, fields))
                    .map_err(|err| StoreError::Encode(err.to_string()))
            })
            .collect::<Result<Vec<(&Point, JsonValue)>, _>>()?;

        let mut written = 0usize;
        for chunk in rows.chunks(WRITE_CHUNK) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {} (measurement, device_wwn, device_protocol, ts, fields) ",
                tier.bucket()
            ));
            builder.push_values(chunk.iter(), |mut b, (point, fields)| {
                b.push_bind(point.measurement.as_str())
                    .push_bind(point.device_wwn.as_str())
                    .push_bind(point.device_protocol.as_str())
                    .push_bind(point.timestamp)
                    .push_bind(SqlJson(fields));
            });
            builder.push(
                " ON CONFLICT (measurement, device_wwn, ts) DO UPDATE \
                 SET device_protocol = EXCLUDED.device_protocol, fields = EXCLUDED.fields",
            );
            let result = builder.build().execute(&self.pool).await?;
            written += result.rows_affected() as usize;
        }
        tracing::debug!(tier = %tier, points = points.len(), written, "wrote tier points");
        Ok(written)
    }

    async fn query(&self, query: &SubQuery) -> Result<Vec<Point>, StoreError> {
        let mut builder = render_query(query);
        let rows = builder.build().fetch_all(&self.pool).await?;
        tracing::debug!(
            tier = %query.tier,
            measurement = %query.measurement,
            rows = rows.len(),
            "tier sub-query"
        );
        rows.iter()
            .map(|row| decode_row(row).map(|point| query.fields.project(point)))
            .collect()
    }

    async fn expire_before(
        &self,
        tier: StorageTier,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE ts < $1", tier.bucket()))
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
