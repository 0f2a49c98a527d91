//! Tiered time-series history: storage tiers, the query planner and
//! synthesizer, the snapshot writer and the downsampler.

pub mod downsample;
pub mod plan;
pub mod point;
pub mod postgres;
pub mod query;
pub mod store;
pub mod tier;
pub mod writer;

pub use downsample::{run_downsample, DownsampleService, TierTransition};
pub use point::{FieldValue, Measurement, Point};
pub use postgres::PgTierStore;
pub use query::{HistoryService, TemperaturePoint};
pub use store::TierStore;
pub use tier::{DurationKey, StorageTier};
pub use writer::SnapshotWriter;
