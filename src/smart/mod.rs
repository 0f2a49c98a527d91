//! SMART attribute evaluation: static metadata, the attribute sum type,
//! per-variant evaluators, administrator overrides and snapshot rollup.

pub mod attribute;
pub mod evaluate;
pub mod metadata;
pub mod overrides;
pub mod protocol;
pub mod raw;
pub mod snapshot;
pub mod status;

pub use attribute::{AtaAttribute, AttributeReading, Evaluation, KeyedAttribute};
pub use overrides::AttributeOverride;
pub use protocol::Protocol;
pub use raw::RawSmartReport;
pub use snapshot::{aggregate, evaluate_snapshot, SmartRecord, Snapshot};
pub use status::{AttributeStatus, DeviceStatus};
