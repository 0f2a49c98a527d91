//! Rolls finer tiers into coarser ones on fixed schedules, and expires
//! points past each tier's retention.
//!
//! A run reads the previous rotation period `[now - 2P, now - P)` from the
//! source tier, keeps the last value of every scalar (the rounded mean for
//! `temp`) and the last reported sub-fields of every attribute per device,
//! and stamps the aggregate at the window end. Re-running
//! over the same window upserts the same rows.

use super::plan::{FieldSelection, SubQuery};
use super::point::{FieldValue, Measurement, Point};
use super::store::TierStore;
use super::tier::{StorageTier, TimeRange};
use crate::error::StoreError;
use crate::smart::protocol::Protocol;
use crate::smart::snapshot::attribute_field_id;
use chrono::{DateTime, Days, Months, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const MEAN_FIELD: &str = "temp";
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierTransition {
    Weekly,
    Monthly,
    Yearly,
}

impl TierTransition {
    pub const ALL: [TierTransition; 3] = [
        TierTransition::Weekly,
        TierTransition::Monthly,
        TierTransition::Yearly,
    ];

    pub const fn source(self) -> StorageTier {
        match self {
            Self::Weekly => StorageTier::Primary,
            Self::Monthly => StorageTier::Weekly,
            Self::Yearly => StorageTier::Monthly,
        }
    }

    pub const fn destination(self) -> StorageTier {
        match self {
            Self::Weekly => StorageTier::Weekly,
            Self::Monthly => StorageTier::Monthly,
            Self::Yearly => StorageTier::Yearly,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// `now` moved back by `periods` rotation periods.
    fn periods_back(self, now: DateTime<Utc>, periods: u32) -> DateTime<Utc> {
        match self {
            Self::Weekly => now.checked_sub_days(Days::new(7 * u64::from(periods))),
            Self::Monthly => now.checked_sub_months(Months::new(periods)),
            Self::Yearly => now.checked_sub_months(Months::new(12 * periods)),
        }
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// The previous rotation period, `[now - 2P, now - P)`.
    pub fn window(self, now: DateTime<Utc>) -> TimeRange {
        TimeRange {
            start: self.periods_back(now, 2),
            stop: self.periods_back(now, 1),
        }
    }

    pub fn next_run(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Weekly => now.checked_add_days(Days::new(7)),
            Self::Monthly => now.checked_add_months(Months::new(1)),
            Self::Yearly => now.checked_add_months(Months::new(12)),
        }
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl fmt::Display for TierTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierTransition {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(format!(
                "unknown tier transition {other:?}; expected weekly, monthly or yearly"
            )),
        }
    }
}

/// Aggregates `points` per `(measurement, device, protocol)` into one point
/// stamped at `window_end`. Scalars keep their last value and each
/// attribute keeps the sub-fields of the last point that reported it.
pub fn downsample_points(points: &[Point], window_end: DateTime<Utc>) -> Vec<Point> {
    let mut groups: BTreeMap<(Measurement, &str, Protocol), Vec<&Point>> = BTreeMap::new();
    for point in points {
        groups
            .entry((point.measurement, point.device_wwn.as_str(), point.device_protocol))
            .or_default()
            .push(point);
    }

    groups
        .into_iter()
        .map(|((measurement, wwn, protocol), mut members)| {
            members.sort_by_key(|point| point.timestamp);
            let mut aggregate = Point::new(measurement, window_end, wwn, protocol);
            let (mut sum, mut count) = (0.0_f64, 0_u32);
            // Newest point carrying an attribute supplies all of its sub-fields.
            let mut attributes: BTreeMap<&str, Vec<(&String, &FieldValue)>> = BTreeMap::new();
            for point in members {
                let mut seen: BTreeMap<&str, Vec<(&String, &FieldValue)>> = BTreeMap::new();
                for (name, value) in &point.fields {
                    if name == MEAN_FIELD {
                        if let Some(value) = value.as_f64() {
                            sum += value;
                            count += 1;
                        }
                    } else if let Some(id) = attribute_field_id(name) {
                        seen.entry(id).or_default().push((name, value));
                    } else {
                        aggregate.fields.insert(name.clone(), value.clone());
                    }
                }
                attributes.extend(seen);
            }
            for (name, value) in attributes.into_values().flatten() {
                aggregate.fields.insert(name.clone(), value.clone());
            }
            if count > 0 {
                let mean = (sum / f64::from(count)).round() as i64;
                aggregate
                    .fields
                    .insert(MEAN_FIELD.to_string(), FieldValue::Int(mean));
            }
            aggregate
        })
        .collect()
}

/// Runs one transition for the window ending a period before `now`.
/// An empty window writes nothing.
pub async fn run_downsample(
    store: &dyn TierStore,
    transition: TierTransition,
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let window = transition.window(now);
    let queries: Vec<SubQuery> = Measurement::ALL
        .iter()
        .map(|&measurement| SubQuery {
            tier: transition.source(),
            measurement,
            range: window,
            device_wwn: None,
            page: None,
            fields: FieldSelection::All,
        })
        .collect();
    let results = try_join_all(queries.iter().map(|query| store.query(query))).await?;
    let source: Vec<Point> = results.into_iter().flatten().collect();

    if source.is_empty() {
        tracing::debug!(
            transition = %transition,
            start = %window.start,
            stop = %window.stop,
            "downsample window is empty"
        );
        return Ok(0);
    }

    let aggregates = downsample_points(&source, window.stop);
    let written = store
        .write_points(transition.destination(), &aggregates)
        .await?;
    tracing::info!(
        transition = %transition,
        source_points = source.len(),
        written,
        "downsampled window"
    );
    Ok(written)
}

/// Deletes points past each tier's retention. Yearly keeps everything.
pub async fn sweep_retention(
    store: &dyn TierStore,
    now: DateTime<Utc>,
) -> Result<u64, StoreError> {
    let mut removed = 0;
    for tier in StorageTier::ALL {
        let Some(retention) = tier.retention() else {
            continue;
        };
        let expired = store.expire_before(tier, retention.cutoff(now)).await?;
        if expired > 0 {
            tracing::debug!(tier = %tier, expired, "expired points");
        }
        removed += expired;
    }
    Ok(removed)
}

#[derive(Clone)]
pub struct DownsampleService {
    store: Arc<dyn TierStore>,
    run_on_start: bool,
    sweep_interval: Duration,
}

impl DownsampleService {
    pub fn new(store: Arc<dyn TierStore>, run_on_start: bool, sweep_interval: Duration) -> Self {
        Self {
            store,
            run_on_start,
            sweep_interval: sweep_interval.max(MIN_SWEEP_INTERVAL),
        }
    }

    /// Spawns the three downsample schedules and the retention sweep. Each
    /// loop stops when `cancel` fires; failed runs are logged and retried
    /// at the next scheduled time only.
    pub fn start(self, cancel: CancellationToken) {
        for transition in TierTransition::ALL {
            let store = self.store.clone();
            let cancel = cancel.clone();
            let run_on_start = self.run_on_start;
            tokio::spawn(async move {
                if run_on_start {
                    run_logged(store.as_ref(), transition).await;
                }
                loop {
                    let now = Utc::now();
                    let delay = (transition.next_run(now) - now)
                        .to_std()
                        .unwrap_or(Duration::from_secs(60));
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {
                            run_logged(store.as_ref(), transition).await;
                        }
                    }
                }
            });
        }

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.sweep_interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        if let Err(err) = sweep_retention(self.store.as_ref(), Utc::now()).await {
                            tracing::warn!(error = %err, "retention sweep failed");
                        }
                    }
                }
            }
        });
    }
}

async fn run_logged(store: &dyn TierStore, transition: TierTransition) {
    if let Err(err) = run_downsample(store, transition, Utc::now()).await {
        tracing::warn!(transition = %transition, error = %err, "downsample run failed");
    }
}
