use super::plan::{attribute_history_plan, temperature_history_plan, QueryPlan};
use super::point::Point;
use super::store::TierStore;
use super::tier::DurationKey;
use crate::error::{HistoryError, StoreError};
use crate::smart::snapshot::SmartRecord;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemperaturePoint {
    pub timestamp: DateTime<Utc>,
    pub temp: i64,
}

/// Runs every sub-query concurrently, unions the results newest first and
/// applies the plan's global page. Any failed sub-query fails the whole
/// read.
pub async fn execute(store: &dyn TierStore, plan: &QueryPlan) -> Result<Vec<Point>, StoreError> {
    let results = try_join_all(plan.sub_queries.iter().map(|sub| store.query(sub))).await?;
    let mut points: Vec<Point> = results.into_iter().flatten().collect();
    points.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(match plan.finish {
        Some(page) => page.apply(points),
        None => points,
    })
}

#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn TierStore>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn TierStore>) -> Self {
        Self { store }
    }

    /// Newest-first snapshots for one device. `n == 0` returns every point
    /// in range; an empty `attribute_ids` keeps every attribute.
    pub async fn attribute_history(
        &self,
        wwn: &str,
        key: DurationKey,
        n: usize,
        offset: usize,
        attribute_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<SmartRecord>, HistoryError> {
        let plan = attribute_history_plan(wwn, key, n, offset, attribute_ids, now);
        tracing::debug!(
            wwn = %wwn,
            duration = %key,
            sub_queries = plan.sub_queries.len(),
            n,
            offset,
            "querying attribute history"
        );
        let points = execute(self.store.as_ref(), &plan).await?;
        points
            .iter()
            .map(|point| SmartRecord::from_point(point).map_err(HistoryError::from))
            .collect()
    }

    /// Hourly mean temperature per device, oldest first.
    pub async fn temperature_history(
        &self,
        key: DurationKey,
        now: DateTime<Utc>,
    ) -> Result<BTreeMap<String, Vec<TemperaturePoint>>, HistoryError> {
        let plan = temperature_history_plan(key, now);
        let results = try_join_all(
            plan.sub_queries
                .iter()
                .map(|sub| self.store.query(sub)),
        )
        .await?;

        let mut series: BTreeMap<String, Vec<TemperaturePoint>> = BTreeMap::new();
        // Hourly means are computed per tier before the union.
        for points in results {
            for (wwn, samples) in hourly_means(&points) {
                series.entry(wwn).or_default().extend(samples);
            }
        }
        for samples in series.values_mut() {
            samples.sort_by_key(|sample| sample.timestamp);
        }
        Ok(series)
    }
}

fn hourly_means(points: &[Point]) -> BTreeMap<String, Vec<TemperaturePoint>> {
    let mut windows: BTreeMap<(String, DateTime<Utc>), (f64, u32)> = BTreeMap::new();
    for point in points {
        let Some(temp) = point.field("temp").and_then(|value| value.as_f64()) else {
            continue;
        };
        let hour = point
            .timestamp
            .duration_trunc(TimeDelta::hours(1))
            .unwrap_or(point.timestamp);
        let entry = windows
            .entry((point.device_wwn.clone(), hour))
            .or_insert((0.0, 0));
        entry.0 += temp;
        entry.1 += 1;
    }

    let mut series: BTreeMap<String, Vec<TemperaturePoint>> = BTreeMap::new();
    for ((wwn, timestamp), (sum, count)) in windows {
        series.entry(wwn).or_default().push(TemperaturePoint {
            timestamp,
            temp: (sum / f64::from(count)).round() as i64,
        });
    }
    series
}
