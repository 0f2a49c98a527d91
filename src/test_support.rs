use crate::error::StoreError;
use crate::history::plan::SubQuery;
use crate::history::point::{Measurement, Point};
use crate::history::store::TierStore;
use crate::history::tier::StorageTier;
use crate::smart::protocol::Protocol;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

type PointKey = (Measurement, String, DateTime<Utc>);

/// In-memory [`TierStore`] with the same upsert and paging semantics as the
/// Postgres store. Records every sub-query it serves.
#[derive(Default)]
pub struct MemoryTierStore {
    tiers: Mutex<HashMap<StorageTier, BTreeMap<PointKey, Point>>>,
    queries: Mutex<Vec<SubQuery>>,
    failing: Mutex<HashSet<StorageTier>>,
}

impl MemoryTierStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, tier: StorageTier, points: impl IntoIterator<Item = Point>) {
        let mut tiers = self.tiers.lock().expect("tiers lock");
        let rows = tiers.entry(tier).or_default();
        for point in points {
            rows.insert(key(&point), point);
        }
    }

    /// Every point in `tier`, oldest first.
    pub fn points(&self, tier: StorageTier) -> Vec<Point> {
        let tiers = self.tiers.lock().expect("tiers lock");
        let mut points: Vec<Point> = tiers
            .get(&tier)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default();
        points.sort_by_key(|point| point.timestamp);
        points
    }

    pub fn issued_queries(&self) -> Vec<SubQuery> {
        self.queries.lock().expect("queries lock").clone()
    }

    /// Makes every call touching `tier` fail as if the store were down.
    pub fn fail_tier(&self, tier: StorageTier) {
        self.failing.lock().expect("failing lock").insert(tier);
    }

    fn check(&self, tier: StorageTier) -> Result<(), StoreError> {
        if self.failing.lock().expect("failing lock").contains(&tier) {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn key(point: &Point) -> PointKey {
    (point.measurement, point.device_wwn.clone(), point.timestamp)
}

#[async_trait]
impl TierStore for MemoryTierStore {
    async fn write_points(&self, tier: StorageTier, points: &[Point]) -> Result<usize, StoreError> {
        self.check(tier)?;
        self.seed(tier, points.iter().cloned());
        Ok(points.len())
    }

    async fn query(&self, query: &SubQuery) -> Result<Vec<Point>, StoreError> {
        self.queries.lock().expect("queries lock").push(query.clone());
        self.check(query.tier)?;

        let mut points: Vec<Point> = self
            .points(query.tier)
            .into_iter()
            .filter(|point| point.measurement == query.measurement)
            .filter(|point| query.range.contains(point.timestamp))
            .filter(|point| {
                query
                    .device_wwn
                    .as_deref()
                    .map_or(true, |wwn| point.device_wwn == wwn)
            })
            .collect();
        points.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(page) = query.page {
            points = page.apply(points);
        }
        Ok(points
            .into_iter()
            .map(|point| query.fields.project(point))
            .collect())
    }

    async fn expire_before(
        &self,
        tier: StorageTier,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        self.check(tier)?;
        let mut tiers = self.tiers.lock().expect("tiers lock");
        let Some(rows) = tiers.get_mut(&tier) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|_, point| point.timestamp >= cutoff);
        Ok((before - rows.len()) as u64)
    }
}

/// A `smart` point carrying only the scalar fields.
pub fn smart_point(wwn: &str, timestamp: DateTime<Utc>, temp: i64) -> Point {
    Point::new(Measurement::Smart, timestamp, wwn, Protocol::Nvme)
        .with_field("temp", temp)
        .with_field("power_on_hours", 100_i64)
        .with_field("power_cycle_count", 3_i64)
}

pub fn temp_point(wwn: &str, timestamp: DateTime<Utc>, temp: i64) -> Point {
    Point::new(Measurement::Temp, timestamp, wwn, Protocol::Ata).with_field("temp", temp)
}
