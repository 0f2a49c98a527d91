//! Snapshot aggregation and the flattened storage layout.
//!
//! A stored `smart` point carries the scalar metrics as `temp`,
//! `power_on_hours` and `power_cycle_count`, plus one field per attribute
//! sub-field named `attr.<id>.<subfield>`. That naming is shared with
//! history already on disk and must not change.

use super::attribute::{AtaAttribute, AttributeReading, Evaluation, KeyedAttribute};
use super::evaluate::evaluate;
use super::overrides::AttributeOverride;
use super::protocol::Protocol;
use super::raw::{RawSctTemperatureHistory, RawSmartReport};
use super::status::{AttributeStatus, DeviceStatus};
use crate::error::{EvaluationError, StoreError};
use crate::history::point::{FieldValue, Measurement, Point};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const ATTR_PREFIX: &str = "attr.";

/// Device-level fields that are persisted with every snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartRecord {
    pub timestamp: DateTime<Utc>,
    pub device_wwn: String,
    pub device_protocol: Protocol,
    pub temperature: i64,
    pub power_on_hours: i64,
    pub power_cycle_count: i64,
    pub attributes: BTreeMap<String, AttributeReading>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureSample {
    pub timestamp: DateTime<Utc>,
    pub temp: i64,
}

/// One collection cycle's verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub record: SmartRecord,
    pub device_status: DeviceStatus,
    /// Back-filled samples from the drive's own temperature log, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub temperature_history: Vec<TemperatureSample>,
}

/// Device verdict: vendor self-assessment plus any attribute that failed
/// after overrides. Warnings and invalid values never fail a device.
pub fn aggregate<'a>(
    attributes: impl IntoIterator<Item = &'a AttributeReading>,
    vendor_passed: bool,
) -> DeviceStatus {
    let mut status = DeviceStatus::PASSED;
    if !vendor_passed {
        status |= DeviceStatus::FAILED_SMART;
    }
    if attributes
        .into_iter()
        .any(|attr| attr.status().contains(AttributeStatus::FAILED_SCRUTINY))
    {
        status |= DeviceStatus::FAILED_SCRUTINY;
    }
    status
}

/// Evaluates every attribute of `raw` and derives the device status.
///
/// `fallback_now` stamps reports that carry no `local_time`.
pub fn evaluate_snapshot(
    wwn: &str,
    raw: &RawSmartReport,
    overrides: &[AttributeOverride],
    fallback_now: DateTime<Utc>,
) -> Result<Snapshot, EvaluationError> {
    let protocol = raw.protocol()?;
    let vendor_passed = raw.smart_passed(protocol)?;
    let readings = raw.readings(protocol)?;

    let timestamp = raw
        .local_time
        .as_ref()
        .and_then(|local| DateTime::from_timestamp(local.time_t, 0))
        .unwrap_or(fallback_now);

    let attributes: BTreeMap<String, AttributeReading> = readings
        .iter()
        .map(|reading| {
            let evaluated = evaluate(reading, wwn, overrides);
            (evaluated.id(), evaluated)
        })
        .collect();
    let device_status = aggregate(attributes.values(), vendor_passed);

    let temperature_history = match &raw.ata_sct_temperature_history {
        Some(history) => sct_backfill(history, timestamp)?,
        None => Vec::new(),
    };

    Ok(Snapshot {
        record: SmartRecord {
            timestamp,
            device_wwn: wwn.to_string(),
            device_protocol: protocol,
            temperature: raw.current_temperature(),
            power_on_hours: raw.power_on_hours(),
            power_cycle_count: raw.power_cycle_count(),
            attributes,
        },
        device_status,
        temperature_history,
    })
}

/// Spreads the SCT log back from `end`, one logging interval per entry.
/// Null entries are gaps; an interval that cannot be placed on the
/// calendar rejects the report.
fn sct_backfill(
    history: &RawSctTemperatureHistory,
    end: DateTime<Utc>,
) -> Result<Vec<TemperatureSample>, EvaluationError> {
    let out_of_range =
        || EvaluationError::malformed("ATA", "logging_interval_minutes out of range");
    let interval =
        Duration::try_minutes(history.logging_interval_minutes.max(1)).ok_or_else(out_of_range)?;
    let last = history.table.len().saturating_sub(1);

    let mut samples = Vec::with_capacity(history.table.len());
    for (index, temp) in history.table.iter().enumerate() {
        let Some(temp) = *temp else {
            continue;
        };
        let timestamp = i32::try_from(last - index)
            .ok()
            .and_then(|steps_back| interval.checked_mul(steps_back))
            .and_then(|offset| end.checked_sub_signed(offset))
            .ok_or_else(out_of_range)?;
        samples.push(TemperatureSample { timestamp, temp });
    }
    Ok(samples)
}

/// Attribute id of an `attr.<id>.<subfield>` field name.
pub fn attribute_field_id(name: &str) -> Option<&str> {
    name.strip_prefix(ATTR_PREFIX)?
        .rsplit_once('.')
        .map(|(id, _)| id)
}

fn attr_field(id: &str, subfield: &str) -> String {
    format!("{ATTR_PREFIX}{id}.{subfield}")
}

fn push_evaluation(point: &mut Point, id: &str, evaluation: &Evaluation, with_failure_rate: bool) {
    if let Some(transformed) = evaluation.transformed_value {
        point
            .fields
            .insert(attr_field(id, "transformed_value"), transformed.into());
    }
    point.fields.insert(
        attr_field(id, "status"),
        i64::from(evaluation.status.bits()).into(),
    );
    if !evaluation.status_reason.is_empty() {
        point.fields.insert(
            attr_field(id, "status_reason"),
            evaluation.status_reason.as_str().into(),
        );
    }
    if with_failure_rate {
        point
            .fields
            .insert(attr_field(id, "failure_rate"), evaluation.failure_rate.into());
    }
}

impl SmartRecord {
    /// Flattens into the `smart` measurement layout.
    pub fn to_point(&self) -> Point {
        let mut point = Point::new(
            Measurement::Smart,
            self.timestamp,
            self.device_wwn.clone(),
            self.device_protocol,
        )
        .with_field("temp", self.temperature)
        .with_field("power_on_hours", self.power_on_hours)
        .with_field("power_cycle_count", self.power_cycle_count);

        for (id, reading) in &self.attributes {
            match reading {
                AttributeReading::AtaNormalized(attr) => {
                    let fields = [
                        ("attribute_id", FieldValue::Int(i64::from(attr.attribute_id))),
                        ("value", attr.value.into()),
                        ("worst", attr.worst.into()),
                        ("thresh", attr.thresh.into()),
                        ("raw_value", attr.raw_value.into()),
                        ("raw_string", attr.raw_string.as_str().into()),
                        ("when_failed", attr.when_failed.as_str().into()),
                    ];
                    for (subfield, value) in fields {
                        point.fields.insert(attr_field(id, subfield), value);
                    }
                    push_evaluation(&mut point, id, &attr.evaluation, true);
                }
                AttributeReading::AtaDeviceStatistic(attr)
                | AttributeReading::Nvme(attr)
                | AttributeReading::Scsi(attr) => {
                    point
                        .fields
                        .insert(attr_field(id, "attribute_id"), attr.attribute_id.as_str().into());
                    point.fields.insert(attr_field(id, "value"), attr.value.into());
                    point.fields.insert(attr_field(id, "thresh"), attr.thresh.into());
                    push_evaluation(&mut point, id, &attr.evaluation, false);
                }
            }
        }
        point
    }

    /// Re-inflates a `smart` point. Attribute variants are recovered from
    /// the id shape: numeric ids are ATA table rows, `devstat_` ids are ATA
    /// device statistics, anything else follows the device protocol.
    pub fn from_point(point: &Point) -> Result<Self, StoreError> {
        if point.measurement != Measurement::Smart {
            return Err(StoreError::Decode(format!(
                "expected smart point, found {}",
                point.measurement
            )));
        }

        let mut grouped: BTreeMap<&str, BTreeMap<&str, &FieldValue>> = BTreeMap::new();
        for (name, value) in &point.fields {
            let Some(rest) = name.strip_prefix(ATTR_PREFIX) else {
                continue;
            };
            let Some((id, subfield)) = rest.rsplit_once('.') else {
                return Err(StoreError::Decode(format!("malformed attribute field {name}")));
            };
            grouped.entry(id).or_default().insert(subfield, value);
        }

        let mut attributes = BTreeMap::new();
        for (id, fields) in grouped {
            let reading = inflate_attribute(id, &fields, point.device_protocol)?;
            attributes.insert(id.to_string(), reading);
        }

        let scalar = |name: &str| point.field(name).and_then(FieldValue::as_i64).unwrap_or(0);
        Ok(Self {
            timestamp: point.timestamp,
            device_wwn: point.device_wwn.clone(),
            device_protocol: point.device_protocol,
            temperature: scalar("temp"),
            power_on_hours: scalar("power_on_hours"),
            power_cycle_count: scalar("power_cycle_count"),
            attributes,
        })
    }
}

fn inflate_attribute(
    id: &str,
    fields: &BTreeMap<&str, &FieldValue>,
    protocol: Protocol,
) -> Result<AttributeReading, StoreError> {
    let int = |subfield: &str| -> Result<i64, StoreError> {
        fields
            .get(subfield)
            .and_then(|value| value.as_i64())
            .ok_or_else(|| StoreError::Decode(format!("attribute {id} missing {subfield}")))
    };
    let text = |subfield: &str| -> String {
        fields
            .get(subfield)
            .and_then(|value| value.as_str())
            .unwrap_or_default()
            .to_string()
    };

    let status_bits = u8::try_from(int("status")?)
        .map_err(|_| StoreError::Decode(format!("attribute {id} has out-of-range status")))?;
    let evaluation = Evaluation {
        transformed_value: fields.get("transformed_value").and_then(|value| value.as_i64()),
        status: AttributeStatus::from_bits(status_bits),
        status_reason: text("status_reason"),
        failure_rate: fields
            .get("failure_rate")
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0),
    };

    if let Ok(attribute_id) = id.parse::<u16>() {
        return Ok(AttributeReading::AtaNormalized(AtaAttribute {
            attribute_id,
            value: int("value")?,
            worst: int("worst")?,
            thresh: int("thresh")?,
            raw_value: int("raw_value")?,
            raw_string: text("raw_string"),
            when_failed: text("when_failed"),
            evaluation,
        }));
    }

    let keyed = KeyedAttribute {
        attribute_id: id.to_string(),
        value: int("value")?,
        thresh: int("thresh")?,
        evaluation,
    };
    if id.starts_with("devstat_") {
        return Ok(AttributeReading::AtaDeviceStatistic(keyed));
    }
    match protocol {
        Protocol::Nvme => Ok(AttributeReading::Nvme(keyed)),
        Protocol::Scsi => Ok(AttributeReading::Scsi(keyed)),
        Protocol::Ata => Err(StoreError::Decode(format!(
            "attribute {id} is not a valid ATA attribute id"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smart::overrides::{ForcedStatus, OverrideAction};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("timestamp")
    }

    fn ata_report() -> RawSmartReport {
        serde_json::from_value(json!({
            "device": {"protocol": "ATA"},
            "smart_status": {"passed": true},
            "local_time": {"time_t": 1_772_366_400},
            "temperature": {"current": 34},
            "power_on_time": {"hours": 12034},
            "power_cycle_count": 41,
            "ata_smart_attributes": {"table": [
                {"id": 5, "value": 100, "worst": 100, "thresh": 10, "when_failed": "",
                 "raw": {"value": 0, "string": "0"}},
                {"id": 194, "value": 66, "worst": 55, "thresh": 0, "when_failed": "",
                 "raw": {"value": 34, "string": "34 (Min/Max 20/45)"}},
                {"id": 197, "value": 100, "worst": 100, "thresh": 0, "when_failed": "",
                 "raw": {"value": 12, "string": "12"}}
            ]},
            "ata_device_statistics": {"pages": [
                {"number": 4, "table": [{"offset": 8, "value": 2_000_000, "flags": {"valid": true}}]},
                {"number": 7, "table": [{"offset": 8, "value": 3, "flags": {"valid": true}}]}
            ]},
            "ata_sct_temperature_history": {
                "logging_interval_minutes": 10,
                "table": [30, null, 33, 34]
            }
        }))
        .expect("report")
    }

    #[test]
    fn ata_snapshot_fails_on_pending_sectors() {
        let snapshot = evaluate_snapshot("0x5000c500a1b2c3d4", &ata_report(), &[], now())
            .expect("snapshot");
        let record = &snapshot.record;
        assert_eq!(record.device_protocol, Protocol::Ata);
        assert_eq!(record.timestamp.timestamp(), 1_772_366_400);
        assert_eq!(record.temperature, 34);
        assert_eq!(record.attributes.len(), 5);
        assert!(record.attributes["5"].status().is_passed());
        assert!(record.attributes["197"]
            .status()
            .contains(AttributeStatus::FAILED_SCRUTINY));
        let devstat = record.attributes["devstat_4_8"].status();
        assert!(devstat.contains(AttributeStatus::INVALID_VALUE));
        assert!(!devstat.contains(AttributeStatus::FAILED_SCRUTINY));
        assert_eq!(snapshot.device_status, DeviceStatus::FAILED_SCRUTINY);
    }

    #[test]
    fn ignoring_the_failing_attribute_restores_device_health() {
        let overrides = vec![AttributeOverride {
            protocol: Protocol::Ata,
            attribute_id: "197".to_string(),
            wwn: String::new(),
            action: Some(OverrideAction::Ignore),
            status: None,
            warn_above: None,
            fail_above: None,
        }];
        let snapshot = evaluate_snapshot("0x5000c500a1b2c3d4", &ata_report(), &overrides, now())
            .expect("snapshot");
        assert_eq!(snapshot.device_status, DeviceStatus::PASSED);
    }

    #[test]
    fn sct_history_ends_at_snapshot_time_and_skips_gaps() {
        let snapshot = evaluate_snapshot("0x5000", &ata_report(), &[], now()).expect("snapshot");
        let end = snapshot.record.timestamp;
        let samples = &snapshot.temperature_history;
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].timestamp, end - Duration::minutes(30));
        assert_eq!(samples[0].temp, 30);
        assert_eq!(samples[2].timestamp, end);
        assert_eq!(samples[2].temp, 34);
    }

    #[test]
    fn unplaceable_sct_interval_rejects_the_report() {
        for interval in [1_000_000_000_000_000_000_i64, 1_000_000_000_000] {
            let mut report = ata_report();
            if let Some(history) = report.ata_sct_temperature_history.as_mut() {
                history.logging_interval_minutes = interval;
                history.table = vec![Some(30), Some(31)];
            }
            let err = evaluate_snapshot("0x5000", &report, &[], now())
                .expect_err("interval cannot be placed on the calendar");
            assert!(matches!(
                err,
                EvaluationError::MalformedReading { ref protocol, ref reason }
                    if protocol == "ATA" && reason.contains("logging_interval_minutes")
            ));
        }

        let mut report = ata_report();
        if let Some(history) = report.ata_sct_temperature_history.as_mut() {
            history.logging_interval_minutes = 1_000_000_000_000;
            history.table = vec![Some(31)];
        }
        let snapshot = evaluate_snapshot("0x5000", &report, &[], now()).expect("single sample");
        assert_eq!(snapshot.temperature_history.len(), 1);
    }

    #[test]
    fn aggregation_only_fails_on_failed_scrutiny() {
        let mut warn = AttributeReading::Nvme(KeyedAttribute::new("temperature", 80, -1));
        warn.evaluation_mut().status = AttributeStatus::WARNING_SCRUTINY;
        let mut invalid =
            AttributeReading::AtaDeviceStatistic(KeyedAttribute::new("devstat_4_8", 2_000_000, 0));
        invalid.evaluation_mut().status = AttributeStatus::INVALID_VALUE;
        assert_eq!(aggregate([&warn, &invalid], true), DeviceStatus::PASSED);
        assert_eq!(aggregate([&warn], false), DeviceStatus::FAILED_SMART);

        let mut failed = AttributeReading::Nvme(KeyedAttribute::new("media_errors", 3, 0));
        failed.evaluation_mut().status = AttributeStatus::FAILED_SCRUTINY;
        assert_eq!(
            aggregate([&warn, &failed], false),
            DeviceStatus::FAILED_SMART | DeviceStatus::FAILED_SCRUTINY
        );
        assert_eq!(aggregate(std::iter::empty::<&AttributeReading>(), true), DeviceStatus::PASSED);
    }

    #[test]
    fn warning_never_flips_device_to_failed() {
        let snapshot = evaluate_snapshot("0x5000", &ata_report(), &[], now()).expect("snapshot");
        let mut attributes = snapshot.record.attributes.clone();
        attributes.remove("197");
        let before = aggregate(attributes.values(), true);
        if let Some(reading) = attributes.get_mut("5") {
            reading.evaluation_mut().status = AttributeStatus::WARNING_SCRUTINY;
        }
        let after = aggregate(attributes.values(), true);
        assert_eq!(before, DeviceStatus::PASSED);
        assert_eq!(after, DeviceStatus::PASSED);
    }

    #[test]
    fn force_failed_fails_the_device() {
        let overrides = vec![AttributeOverride {
            protocol: Protocol::Nvme,
            attribute_id: "temperature".to_string(),
            wwn: "0xabc".to_string(),
            action: Some(OverrideAction::ForceStatus),
            status: Some(ForcedStatus::Failed),
            warn_above: None,
            fail_above: None,
        }];
        let snapshot = evaluate_snapshot("0xABC", &nvme_report(), &overrides, now())
            .expect("snapshot");
        assert_eq!(snapshot.device_status, DeviceStatus::FAILED_SCRUTINY);
        assert_eq!(snapshot.record.timestamp, now());
    }

    fn nvme_report() -> RawSmartReport {
        serde_json::from_value(json!({
            "device": {"protocol": "NVMe"},
            "smart_status": {"passed": true},
            "nvme_smart_health_information_log": {
                "critical_warning": 0,
                "temperature": 38,
                "available_spare": 100,
                "available_spare_threshold": 10,
                "percentage_used": 3,
                "media_errors": 0,
                "power_on_hours": 900,
                "power_cycles": 12
            }
        }))
        .expect("report")
    }

    fn scsi_report() -> RawSmartReport {
        serde_json::from_value(json!({
            "device": {"protocol": "SCSI"},
            "smart_status": {"passed": false},
            "temperature": {"current": 29},
            "scsi_grown_defect_list": 4,
            "scsi_error_counter_log": {
                "read": {"total_uncorrected_errors": 0, "errors_corrected_by_eccfast": 1200},
                "write": {"total_uncorrected_errors": 0}
            }
        }))
        .expect("report")
    }

    #[test]
    fn scsi_snapshot_combines_vendor_and_threshold_failures() {
        let snapshot = evaluate_snapshot("0x5000", &scsi_report(), &[], now()).expect("snapshot");
        assert_eq!(
            snapshot.device_status,
            DeviceStatus::FAILED_SMART | DeviceStatus::FAILED_SCRUTINY
        );
        assert!(snapshot.record.attributes["scsi_grown_defect_list"]
            .status()
            .contains(AttributeStatus::FAILED_SCRUTINY));
    }

    #[test]
    fn missing_smart_status_rejects_the_snapshot() {
        let mut report = nvme_report();
        report.smart_status = None;
        let err = evaluate_snapshot("0x5000", &report, &[], now()).expect_err("malformed");
        assert!(matches!(err, EvaluationError::MalformedReading { .. }));
    }

    #[test]
    fn flatten_then_inflate_round_trips_every_protocol() {
        for report in [ata_report(), nvme_report(), scsi_report()] {
            let snapshot = evaluate_snapshot("0x5000", &report, &[], now()).expect("snapshot");
            let point = snapshot.record.to_point();
            let inflated = SmartRecord::from_point(&point).expect("inflate");
            assert_eq!(inflated, snapshot.record);
        }
    }

    #[test]
    fn flattened_layout_uses_attr_prefix() {
        let snapshot = evaluate_snapshot("0x5000", &ata_report(), &[], now()).expect("snapshot");
        let point = snapshot.record.to_point();
        assert_eq!(point.field("temp"), Some(&FieldValue::Int(34)));
        assert_eq!(point.field("attr.5.attribute_id"), Some(&FieldValue::Int(5)));
        assert_eq!(point.field("attr.194.raw_string"), Some(&FieldValue::Str("34 (Min/Max 20/45)".into())));
        assert_eq!(point.field("attr.194.transformed_value"), Some(&FieldValue::Int(34)));
        assert_eq!(
            point.field("attr.devstat_7_8.attribute_id"),
            Some(&FieldValue::Str("devstat_7_8".into()))
        );
        assert!(point.field("attr.devstat_7_8.failure_rate").is_none());
        assert!(point.field("attr.5.worst").is_some());
    }

    #[test]
    fn inflate_rejects_non_ata_ids_on_ata_devices() {
        let point = Point::new(Measurement::Smart, now(), "0x5000", Protocol::Ata)
            .with_field("attr.media_errors.value", 1_i64)
            .with_field("attr.media_errors.thresh", 0_i64)
            .with_field("attr.media_errors.status", 0_i64);
        assert!(matches!(SmartRecord::from_point(&point), Err(StoreError::Decode(_))));
    }
}
