use super::point::{Measurement, Point};
use super::store::TierStore;
use super::tier::StorageTier;
use crate::error::StoreError;
use crate::smart::snapshot::Snapshot;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Points persisted for one snapshot: the flattened `smart` point, then one
/// `temp` point per distinct timestamp. The snapshot's own reading wins over
/// a back-filled sample at the same instant.
pub fn snapshot_points(snapshot: &Snapshot) -> Vec<Point> {
    let record = &snapshot.record;
    let mut temps = BTreeMap::new();
    for sample in &snapshot.temperature_history {
        temps.insert(sample.timestamp, sample.temp);
    }
    temps.insert(record.timestamp, record.temperature);

    let mut points = Vec::with_capacity(temps.len() + 1);
    points.push(record.to_point());
    points.extend(temps.into_iter().map(|(timestamp, temp)| {
        Point::new(
            Measurement::Temp,
            timestamp,
            record.device_wwn.clone(),
            record.device_protocol,
        )
        .with_field("temp", temp)
    }));
    points
}

#[derive(Clone)]
pub struct SnapshotWriter {
    store: Arc<dyn TierStore>,
}

impl SnapshotWriter {
    pub fn new(store: Arc<dyn TierStore>) -> Self {
        Self { store }
    }

    /// Appends the snapshot to the primary tier.
    pub async fn write(&self, snapshot: &Snapshot) -> Result<usize, StoreError> {
        let points = snapshot_points(snapshot);
        let written = self.store.write_points(StorageTier::Primary, &points).await?;
        tracing::debug!(
            wwn = %snapshot.record.device_wwn,
            attributes = snapshot.record.attributes.len(),
            written,
            "stored snapshot"
        );
        Ok(written)
    }
}
