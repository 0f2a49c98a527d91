//! Raw report handed over by the detection collaborator, shaped like
//! `smartctl --json` output. Only the sections this crate reads are modelled.

use super::attribute::{AtaAttribute, AttributeReading, Evaluation, KeyedAttribute};
use super::metadata;
use super::protocol::Protocol;
use crate::error::EvaluationError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSmartReport {
    #[serde(default)]
    pub device: Option<RawDevice>,
    #[serde(default)]
    pub smart_status: Option<RawSmartStatus>,
    #[serde(default)]
    pub local_time: Option<RawLocalTime>,
    #[serde(default)]
    pub temperature: Option<RawTemperature>,
    #[serde(default)]
    pub power_on_time: Option<RawPowerOnTime>,
    #[serde(default)]
    pub power_cycle_count: Option<i64>,
    #[serde(default)]
    pub ata_smart_attributes: Option<RawAtaAttributes>,
    #[serde(default)]
    pub ata_device_statistics: Option<RawDeviceStatistics>,
    #[serde(default)]
    pub ata_sct_temperature_history: Option<RawSctTemperatureHistory>,
    #[serde(default)]
    pub nvme_smart_health_information_log: Option<RawNvmeHealthLog>,
    #[serde(default)]
    pub scsi_grown_defect_list: Option<i64>,
    #[serde(default)]
    pub scsi_error_counter_log: Option<RawScsiErrorCounterLog>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDevice {
    #[serde(default)]
    pub protocol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSmartStatus {
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLocalTime {
    pub time_t: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTemperature {
    pub current: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPowerOnTime {
    pub hours: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAtaAttributes {
    #[serde(default)]
    pub table: Vec<RawAtaAttribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAtaAttribute {
    pub id: u16,
    pub value: i64,
    pub worst: i64,
    pub thresh: i64,
    #[serde(default)]
    pub when_failed: String,
    pub raw: RawAtaValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAtaValue {
    pub value: i64,
    #[serde(default)]
    pub string: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDeviceStatistics {
    #[serde(default)]
    pub pages: Vec<RawStatisticsPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStatisticsPage {
    pub number: u8,
    #[serde(default)]
    pub table: Vec<RawStatistic>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStatistic {
    pub offset: u16,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub flags: RawStatisticFlags,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStatisticFlags {
    #[serde(default)]
    pub valid: bool,
}

/// SCT temperature history; `table` is oldest first and the last entry is
/// the sample taken at report time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSctTemperatureHistory {
    pub logging_interval_minutes: i64,
    #[serde(default)]
    pub table: Vec<Option<i64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawNvmeHealthLog {
    pub critical_warning: i64,
    pub temperature: i64,
    pub available_spare: i64,
    pub available_spare_threshold: i64,
    pub percentage_used: i64,
    pub data_units_read: i64,
    pub data_units_written: i64,
    pub host_reads: i64,
    pub host_writes: i64,
    pub controller_busy_time: i64,
    pub power_cycles: i64,
    pub power_on_hours: i64,
    pub unsafe_shutdowns: i64,
    pub media_errors: i64,
    pub num_err_log_entries: i64,
    pub warning_temp_time: i64,
    pub critical_comp_time: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawScsiErrorCounterLog {
    #[serde(default)]
    pub read: Option<RawScsiErrorCounter>,
    #[serde(default)]
    pub write: Option<RawScsiErrorCounter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawScsiErrorCounter {
    pub errors_corrected_by_eccfast: i64,
    pub errors_corrected_by_eccdelayed: i64,
    pub errors_corrected_by_rereads_rewrites: i64,
    pub total_errors_corrected: i64,
    pub correction_algorithm_invocations: i64,
    pub total_uncorrected_errors: i64,
}

impl RawSmartReport {
    /// Parses a report, naming the declared protocol in the rejection when
    /// the payload is malformed.
    pub fn from_json(raw: &str) -> Result<Self, EvaluationError> {
        let value: JsonValue = serde_json::from_str(raw)
            .map_err(|err| EvaluationError::malformed("unknown", err.to_string()))?;
        let declared = value
            .pointer("/device/protocol")
            .and_then(JsonValue::as_str)
            .unwrap_or("unknown")
            .to_string();
        serde_json::from_value(value).map_err(|err| EvaluationError::malformed(declared, err.to_string()))
    }

    pub fn protocol(&self) -> Result<Protocol, EvaluationError> {
        let declared = self
            .device
            .as_ref()
            .map(|device| device.protocol.trim())
            .filter(|protocol| !protocol.is_empty())
            .ok_or_else(|| EvaluationError::malformed("unknown", "missing device.protocol"))?;
        declared.parse()
    }

    pub fn smart_passed(&self, protocol: Protocol) -> Result<bool, EvaluationError> {
        self.smart_status
            .as_ref()
            .map(|status| status.passed)
            .ok_or_else(|| EvaluationError::malformed(protocol.as_str(), "missing smart_status"))
    }

    /// Builds the unevaluated readings for `protocol`, rejecting the report
    /// when the section that protocol requires is absent.
    pub fn readings(&self, protocol: Protocol) -> Result<Vec<AttributeReading>, EvaluationError> {
        match protocol {
            Protocol::Ata => self.ata_readings(),
            Protocol::Nvme => self.nvme_readings(),
            Protocol::Scsi => self.scsi_readings(),
        }
    }

    fn ata_readings(&self) -> Result<Vec<AttributeReading>, EvaluationError> {
        let table = self
            .ata_smart_attributes
            .as_ref()
            .ok_or_else(|| EvaluationError::malformed("ATA", "missing ata_smart_attributes"))?;

        let mut readings: Vec<AttributeReading> = table
            .table
            .iter()
            .map(|row| {
                AttributeReading::AtaNormalized(AtaAttribute {
                    attribute_id: row.id,
                    value: row.value,
                    worst: row.worst,
                    thresh: row.thresh,
                    raw_value: row.raw.value,
                    raw_string: row.raw.string.clone(),
                    when_failed: row.when_failed.clone(),
                    evaluation: Evaluation::default(),
                })
            })
            .collect();

        if let Some(statistics) = &self.ata_device_statistics {
            for page in &statistics.pages {
                for entry in page.table.iter().filter(|entry| entry.flags.valid) {
                    let id = format!("devstat_{}_{}", page.number, entry.offset);
                    let thresh = metadata::device_statistic(&id)
                        .map(|meta| meta.default_threshold)
                        .unwrap_or(-1);
                    readings.push(AttributeReading::AtaDeviceStatistic(KeyedAttribute::new(
                        id,
                        entry.value,
                        thresh,
                    )));
                }
            }
        }
        Ok(readings)
    }

    fn nvme_readings(&self) -> Result<Vec<AttributeReading>, EvaluationError> {
        let log = self.nvme_smart_health_information_log.as_ref().ok_or_else(|| {
            EvaluationError::malformed("NVMe", "missing nvme_smart_health_information_log")
        })?;
        let fields = [
            ("critical_warning", log.critical_warning),
            ("temperature", log.temperature),
            ("available_spare", log.available_spare),
            ("available_spare_threshold", log.available_spare_threshold),
            ("percentage_used", log.percentage_used),
            ("data_units_read", log.data_units_read),
            ("data_units_written", log.data_units_written),
            ("host_reads", log.host_reads),
            ("host_writes", log.host_writes),
            ("controller_busy_time", log.controller_busy_time),
            ("power_cycles", log.power_cycles),
            ("power_on_hours", log.power_on_hours),
            ("unsafe_shutdowns", log.unsafe_shutdowns),
            ("media_errors", log.media_errors),
            ("num_err_log_entries", log.num_err_log_entries),
            ("warning_temp_time", log.warning_temp_time),
            ("critical_comp_time", log.critical_comp_time),
        ];
        Ok(fields
            .into_iter()
            .map(|(id, value)| {
                let thresh = if id == "available_spare" {
                    log.available_spare_threshold
                } else {
                    default_threshold(metadata::nvme(id))
                };
                AttributeReading::Nvme(KeyedAttribute::new(id, value, thresh))
            })
            .collect())
    }

    fn scsi_readings(&self) -> Result<Vec<AttributeReading>, EvaluationError> {
        let log = self
            .scsi_error_counter_log
            .as_ref()
            .ok_or_else(|| EvaluationError::malformed("SCSI", "missing scsi_error_counter_log"))?;

        let mut readings = Vec::new();
        if let Some(defects) = self.scsi_grown_defect_list {
            let id = "scsi_grown_defect_list";
            readings.push(AttributeReading::Scsi(KeyedAttribute::new(
                id,
                defects,
                default_threshold(metadata::scsi(id)),
            )));
        }
        for (direction, counter) in [("read", &log.read), ("write", &log.write)] {
            let Some(counter) = counter else {
                continue;
            };
            let fields = [
                ("errors_corrected_by_eccfast", counter.errors_corrected_by_eccfast),
                ("errors_corrected_by_eccdelayed", counter.errors_corrected_by_eccdelayed),
                (
                    "errors_corrected_by_rereads_rewrites",
                    counter.errors_corrected_by_rereads_rewrites,
                ),
                ("total_errors_corrected", counter.total_errors_corrected),
                ("correction_algorithm_invocations", counter.correction_algorithm_invocations),
                ("total_uncorrected_errors", counter.total_uncorrected_errors),
            ];
            for (field, value) in fields {
                let id = format!("{direction}_{field}");
                let thresh = default_threshold(metadata::scsi(&id));
                readings.push(AttributeReading::Scsi(KeyedAttribute::new(id, value, thresh)));
            }
        }
        Ok(readings)
    }

    /// Current temperature, falling back to the NVMe health log.
    pub fn current_temperature(&self) -> i64 {
        self.temperature
            .as_ref()
            .map(|temperature| temperature.current)
            .or_else(|| {
                self.nvme_smart_health_information_log
                    .as_ref()
                    .map(|log| log.temperature)
            })
            .unwrap_or(0)
    }

    pub fn power_on_hours(&self) -> i64 {
        self.power_on_time
            .as_ref()
            .map(|time| time.hours)
            .or_else(|| {
                self.nvme_smart_health_information_log
                    .as_ref()
                    .map(|log| log.power_on_hours)
            })
            .unwrap_or(0)
    }

    pub fn power_cycle_count(&self) -> i64 {
        self.power_cycle_count
            .or_else(|| {
                self.nvme_smart_health_information_log
                    .as_ref()
                    .map(|log| log.power_cycles)
            })
            .unwrap_or(0)
    }
}

fn default_threshold(meta: Option<&metadata::KeyedAttributeMetadata>) -> i64 {
    meta.map(|meta| meta.default_threshold).unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_required_section_is_malformed() {
        let report: RawSmartReport = serde_json::from_value(json!({
            "device": {"protocol": "NVMe"},
            "smart_status": {"passed": true}
        }))
        .expect("report");
        let err = report.readings(Protocol::Nvme).expect_err("no health log");
        assert!(matches!(err, EvaluationError::MalformedReading { ref protocol, .. } if protocol == "NVMe"));
    }

    #[test]
    fn unknown_protocol_is_rejected() {
        let report = RawSmartReport::from_json(r#"{"device": {"protocol": "USB"}}"#).expect("parse");
        assert!(matches!(report.protocol(), Err(EvaluationError::UnknownProtocol(_))));

        let report = RawSmartReport::from_json("{}").expect("parse");
        assert!(matches!(report.protocol(), Err(EvaluationError::MalformedReading { .. })));
    }

    #[test]
    fn malformed_rows_name_declared_protocol() {
        let err = RawSmartReport::from_json(
            r#"{"device": {"protocol": "ATA"}, "ata_smart_attributes": {"table": [{"id": 5}]}}"#,
        )
        .expect_err("row without value");
        assert!(err.to_string().starts_with("malformed ATA reading"));
    }

    #[test]
    fn invalid_device_statistics_are_skipped() {
        let report: RawSmartReport = serde_json::from_value(json!({
            "device": {"protocol": "ATA"},
            "smart_status": {"passed": true},
            "ata_smart_attributes": {"table": []},
            "ata_device_statistics": {"pages": [
                {"number": 7, "table": [{"offset": 8, "value": 12, "flags": {"valid": true}}]},
                {"number": 4, "table": [{"offset": 8, "value": 3, "flags": {"valid": false}}]}
            ]}
        }))
        .expect("report");
        let readings = report.readings(Protocol::Ata).expect("readings");
        assert_eq!(readings.len(), 1);
        match &readings[0] {
            AttributeReading::AtaDeviceStatistic(attr) => {
                assert_eq!(attr.attribute_id, "devstat_7_8");
                assert_eq!(attr.thresh, 100);
            }
            other => panic!("unexpected reading {other:?}"),
        }
    }

    #[test]
    fn nvme_spare_uses_reported_threshold() {
        let report: RawSmartReport = serde_json::from_value(json!({
            "device": {"protocol": "NVMe"},
            "smart_status": {"passed": true},
            "nvme_smart_health_information_log": {
                "available_spare": 100,
                "available_spare_threshold": 10,
                "media_errors": 0,
                "temperature": 41
            }
        }))
        .expect("report");
        let readings = report.readings(Protocol::Nvme).expect("readings");
        let spare = readings
            .iter()
            .find(|reading| reading.id() == "available_spare")
            .expect("spare");
        match spare {
            AttributeReading::Nvme(attr) => assert_eq!(attr.thresh, 10),
            other => panic!("unexpected reading {other:?}"),
        }
        let media = readings.iter().find(|r| r.id() == "media_errors").expect("media");
        match media {
            AttributeReading::Nvme(attr) => assert_eq!(attr.thresh, 0),
            other => panic!("unexpected reading {other:?}"),
        }
        assert_eq!(report.current_temperature(), 41);
    }

    #[test]
    fn scsi_counters_are_prefixed_by_direction() {
        let report: RawSmartReport = serde_json::from_value(json!({
            "device": {"protocol": "SCSI"},
            "smart_status": {"passed": true},
            "scsi_grown_defect_list": 0,
            "scsi_error_counter_log": {
                "read": {"total_uncorrected_errors": 2},
                "write": {"total_uncorrected_errors": 0}
            }
        }))
        .expect("report");
        let readings = report.readings(Protocol::Scsi).expect("readings");
        assert_eq!(readings.len(), 13);
        assert!(readings.iter().any(|r| r.id() == "read_total_uncorrected_errors"));
        assert!(readings.iter().any(|r| r.id() == "write_errors_corrected_by_eccfast"));
        assert_eq!(readings[0].id(), "scsi_grown_defect_list");
    }
}
