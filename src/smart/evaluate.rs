//! Metadata-driven attribute evaluation.
//!
//! Each attribute shape has its own pure function taking the reading and its
//! (optional) metadata. [`evaluate`] dispatches on the reading's variant,
//! looks metadata up in the static tables and then folds the administrator
//! overrides over the result.

use super::attribute::{AtaAttribute, AttributeReading, Evaluation, KeyedAttribute};
use super::metadata::{self, AtaAttributeMetadata, DisplayType, Ideal, KeyedAttributeMetadata};
use super::overrides::{apply_overrides, AttributeOverride};
use super::status::AttributeStatus;

/// Device-statistic counters above this are firmware corruption, not wear.
pub const IMPLAUSIBLE_VALUE_CEILING: i64 = 1_000_000;

pub const CRITICAL_FAILURE_RATE: f64 = 0.10;
pub const NON_CRITICAL_FAILURE_RATE: f64 = 0.20;
pub const NON_CRITICAL_WARNING_RATE: f64 = 0.10;

pub const REASON_FAILING_MANUFACTURER: &str = "Attribute is failing manufacturer threshold";
pub const REASON_FAILED_MANUFACTURER_PAST: &str =
    "Attribute has previously failed manufacturer threshold";
pub const REASON_FAILING_RECOMMENDED: &str = "Attribute is failing recommended threshold";
pub const REASON_UNKNOWN_FAILURE_RATE: &str =
    "Could not determine observed failure rate for critical attribute";
pub const REASON_OBSERVED_FAILURE: &str = "Observed failure rate exceeds failure limit";
pub const REASON_OBSERVED_WARNING: &str = "Observed failure rate exceeds warning limit";
pub const REASON_IMPLAUSIBLE: &str = "Attribute value exceeds reasonable maximum";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WhenFailed {
    Never,
    Now,
    Past,
}

fn when_failed(marker: &str) -> WhenFailed {
    match marker.trim().to_ascii_lowercase().as_str() {
        "now" | "failing_now" => WhenFailed::Now,
        "past" | "in_the_past" => WhenFailed::Past,
        _ => WhenFailed::Never,
    }
}

pub fn evaluate_ata(attr: &AtaAttribute, meta: Option<&AtaAttributeMetadata>) -> Evaluation {
    let mut evaluation = Evaluation::passed();

    match when_failed(&attr.when_failed) {
        WhenFailed::Now => evaluation.flag(AttributeStatus::FAILED_SMART, REASON_FAILING_MANUFACTURER),
        WhenFailed::Past => {
            evaluation.flag(AttributeStatus::WARNING_SCRUTINY, REASON_FAILED_MANUFACTURER_PAST)
        }
        WhenFailed::Never => {}
    }

    let Some(meta) = meta else {
        return evaluation;
    };

    evaluation.transformed_value = meta
        .transform
        .map(|transform| transform(attr.value, attr.raw_value, &attr.raw_string));

    let display_value = match meta.display_type {
        DisplayType::Normalized => attr.value,
        DisplayType::Raw => attr.raw_value,
        DisplayType::Transformed => evaluation.transformed_value.unwrap_or(attr.raw_value),
    };

    match meta.observed_bucket(display_value) {
        Some(bucket) => {
            let rate = bucket.annual_failure_rate;
            evaluation.failure_rate = rate;
            if meta.critical {
                if rate >= CRITICAL_FAILURE_RATE {
                    evaluation.flag(AttributeStatus::FAILED_SCRUTINY, REASON_OBSERVED_FAILURE);
                }
            } else if rate >= NON_CRITICAL_FAILURE_RATE {
                evaluation.flag(AttributeStatus::FAILED_SCRUTINY, REASON_OBSERVED_FAILURE);
            } else if rate >= NON_CRITICAL_WARNING_RATE {
                evaluation.flag(AttributeStatus::WARNING_SCRUTINY, REASON_OBSERVED_WARNING);
            }
        }
        None if meta.critical => {
            evaluation.flag(AttributeStatus::WARNING_SCRUTINY, REASON_UNKNOWN_FAILURE_RATE)
        }
        None => {}
    }

    evaluation
}

/// Directional threshold comparison shared by NVMe, SCSI and device
/// statistics. A threshold of `-1` disables the comparison.
fn compare_threshold(value: i64, threshold: i64, ideal: Option<Ideal>) -> bool {
    if threshold == -1 {
        return false;
    }
    match ideal {
        Some(Ideal::Low) => value > threshold,
        Some(Ideal::High) => value < threshold,
        None => false,
    }
}

pub fn evaluate_keyed(attr: &KeyedAttribute, meta: Option<&KeyedAttributeMetadata>) -> Evaluation {
    let mut evaluation = Evaluation::passed();
    let ideal = meta.and_then(|meta| meta.ideal);
    if compare_threshold(attr.value, attr.thresh, ideal) {
        evaluation.flag(AttributeStatus::FAILED_SCRUTINY, REASON_FAILING_RECOMMENDED);
    }
    evaluation
}

pub fn evaluate_device_statistic(
    attr: &KeyedAttribute,
    meta: Option<&KeyedAttributeMetadata>,
) -> Evaluation {
    let evaluation = evaluate_keyed(attr, meta);
    if attr.value <= IMPLAUSIBLE_VALUE_CEILING {
        return evaluation;
    }
    // Replaces, never supplements, the threshold verdict.
    Evaluation {
        status: evaluation
            .status
            .without(AttributeStatus::FAILED_SCRUTINY)
            .with(AttributeStatus::INVALID_VALUE),
        status_reason: REASON_IMPLAUSIBLE.to_string(),
        ..evaluation
    }
}

/// Evaluates one reading from scratch and returns a copy carrying the result.
/// Any evaluation already present on `reading` is discarded.
pub fn evaluate(reading: &AttributeReading, wwn: &str, overrides: &[AttributeOverride]) -> AttributeReading {
    let base = match reading {
        AttributeReading::AtaNormalized(attr) => {
            evaluate_ata(attr, metadata::ata(attr.attribute_id))
        }
        AttributeReading::AtaDeviceStatistic(attr) => {
            let evaluation =
                evaluate_device_statistic(attr, metadata::device_statistic(&attr.attribute_id));
            if evaluation.status.contains(AttributeStatus::INVALID_VALUE) {
                tracing::warn!(
                    wwn = %wwn,
                    attribute_id = %attr.attribute_id,
                    value = attr.value,
                    "implausible device statistic; marking invalid"
                );
            }
            evaluation
        }
        AttributeReading::Nvme(attr) => evaluate_keyed(attr, metadata::nvme(&attr.attribute_id)),
        AttributeReading::Scsi(attr) => evaluate_keyed(attr, metadata::scsi(&attr.attribute_id)),
    };

    let mut evaluated = reading.clone();
    *evaluated.evaluation_mut() = apply_overrides(reading, wwn, overrides, base);
    evaluated
}
