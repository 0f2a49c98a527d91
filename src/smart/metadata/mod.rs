//! Static attribute metadata, one table per attribute shape.
//!
//! Tables are plain immutable arrays sorted by id so lookups can binary
//! search. ATA tables additionally carry observed annual-failure-rate buckets
//! derived from fleet failure statistics.

mod ata;
mod devstat;
mod nvme;
mod scsi;

pub use ata::ATA_METADATA;
pub use devstat::DEVICE_STATISTIC_METADATA;
pub use nvme::NVME_METADATA;
pub use scsi::SCSI_METADATA;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ideal {
    Low,
    High,
}

/// Which value of an ATA attribute is meaningful to compare and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayType {
    Normalized,
    Raw,
    Transformed,
}

/// `(normalized, raw, raw_string) -> display value`
pub type Transform = fn(i64, i64, &str) -> i64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedThreshold {
    pub low: i64,
    pub high: i64,
    pub annual_failure_rate: f64,
}

impl ObservedThreshold {
    /// `low == high` is an exact-match bucket, otherwise `low < value <= high`.
    pub fn contains(&self, value: i64) -> bool {
        if self.low == self.high {
            value == self.low
        } else {
            self.low < value && value <= self.high
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AtaAttributeMetadata {
    pub id: u16,
    pub display_name: &'static str,
    pub ideal: Option<Ideal>,
    pub critical: bool,
    pub description: &'static str,
    pub display_type: DisplayType,
    pub transform: Option<Transform>,
    pub transform_unit: Option<&'static str>,
    pub observed_thresholds: &'static [ObservedThreshold],
}

impl AtaAttributeMetadata {
    /// First bucket containing `value`, in table order.
    pub fn observed_bucket(&self, value: i64) -> Option<&ObservedThreshold> {
        self.observed_thresholds
            .iter()
            .find(|bucket| bucket.contains(value))
    }
}

/// Metadata for attributes identified by a string key (NVMe, SCSI and ATA
/// device statistics).
#[derive(Debug, Clone, Copy)]
pub struct KeyedAttributeMetadata {
    pub id: &'static str,
    pub display_name: &'static str,
    pub ideal: Option<Ideal>,
    pub critical: bool,
    pub description: &'static str,
    /// Threshold applied when the device payload does not carry one; `-1`
    /// disables the threshold comparison.
    pub default_threshold: i64,
}

pub fn ata(id: u16) -> Option<&'static AtaAttributeMetadata> {
    ATA_METADATA
        .binary_search_by_key(&id, |meta| meta.id)
        .ok()
        .map(|index| &ATA_METADATA[index])
}

pub fn nvme(id: &str) -> Option<&'static KeyedAttributeMetadata> {
    keyed(NVME_METADATA, id)
}

pub fn scsi(id: &str) -> Option<&'static KeyedAttributeMetadata> {
    keyed(SCSI_METADATA, id)
}

pub fn device_statistic(id: &str) -> Option<&'static KeyedAttributeMetadata> {
    keyed(DEVICE_STATISTIC_METADATA, id)
}

fn keyed(
    table: &'static [KeyedAttributeMetadata],
    id: &str,
) -> Option<&'static KeyedAttributeMetadata> {
    table
        .binary_search_by(|meta| meta.id.cmp(id))
        .ok()
        .map(|index| &table[index])
}

/// Leading integer of a smartctl raw string such as `"38 (Min/Max 20/45)"` or
/// `"12034h+05m+10.320s"`.
fn leading_integer(raw_string: &str) -> Option<i64> {
    let digits: String = raw_string
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

pub(crate) fn temperature_from_raw(_normalized: i64, raw: i64, raw_string: &str) -> i64 {
    leading_integer(raw_string).unwrap_or(raw & 0xFF)
}

pub(crate) fn hours_from_raw(_normalized: i64, raw: i64, raw_string: &str) -> i64 {
    leading_integer(raw_string).unwrap_or(raw & 0xFFFF_FFFF)
}
