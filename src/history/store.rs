use super::plan::SubQuery;
use super::point::Point;
use super::tier::StorageTier;
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Tiered time-series storage.
///
/// Implementations never retry; a failed call is reported to the caller as
/// is.
#[async_trait]
pub trait TierStore: Send + Sync {
    /// Upserts points keyed by `(measurement, device_wwn, timestamp)`.
    /// Returns the number of rows written.
    async fn write_points(&self, tier: StorageTier, points: &[Point]) -> Result<usize, StoreError>;

    /// Points matching `query`, newest first, with its page and field
    /// selection already applied.
    async fn query(&self, query: &SubQuery) -> Result<Vec<Point>, StoreError>;

    /// Deletes points strictly older than `cutoff`. Returns the number of
    /// rows removed.
    async fn expire_before(
        &self,
        tier: StorageTier,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError>;
}
