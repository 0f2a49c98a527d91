use super::protocol::Protocol;
use super::status::AttributeStatus;
use serde::{Deserialize, Serialize};

/// Result of one evaluation pass. Rebuilt from scratch every pass; never
/// patched in place across passes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformed_value: Option<i64>,
    pub status: AttributeStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status_reason: String,
    /// Observed annual failure rate; only ATA attributes carry a non-zero one.
    #[serde(default)]
    pub failure_rate: f64,
}

impl Evaluation {
    pub fn passed() -> Self {
        Self::default()
    }

    /// Adds `flag` and appends `reason` to the existing reason.
    pub fn flag(&mut self, flag: AttributeStatus, reason: &str) {
        self.status |= flag;
        self.push_reason(reason);
    }

    pub fn push_reason(&mut self, reason: &str) {
        if reason.is_empty() {
            return;
        }
        if !self.status_reason.is_empty() {
            self.status_reason.push_str("; ");
        }
        self.status_reason.push_str(reason);
    }
}

/// Row of the ATA SMART attribute table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtaAttribute {
    pub attribute_id: u16,
    pub value: i64,
    pub worst: i64,
    pub thresh: i64,
    pub raw_value: i64,
    #[serde(default)]
    pub raw_string: String,
    #[serde(default)]
    pub when_failed: String,
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

/// Attribute identified by a string key: ATA device statistics, NVMe health
/// log fields and SCSI error counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedAttribute {
    pub attribute_id: String,
    pub value: i64,
    /// `-1` when no threshold applies.
    pub thresh: i64,
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

impl KeyedAttribute {
    pub fn new(attribute_id: impl Into<String>, value: i64, thresh: i64) -> Self {
        Self {
            attribute_id: attribute_id.into(),
            value,
            thresh,
            evaluation: Evaluation::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    AtaNormalized,
    AtaDeviceStatistic,
    Nvme,
    Scsi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeReading {
    AtaNormalized(AtaAttribute),
    AtaDeviceStatistic(KeyedAttribute),
    Nvme(KeyedAttribute),
    Scsi(KeyedAttribute),
}

impl AttributeReading {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::AtaNormalized(_) => AttributeKind::AtaNormalized,
            Self::AtaDeviceStatistic(_) => AttributeKind::AtaDeviceStatistic,
            Self::Nvme(_) => AttributeKind::Nvme,
            Self::Scsi(_) => AttributeKind::Scsi,
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            Self::AtaNormalized(_) | Self::AtaDeviceStatistic(_) => Protocol::Ata,
            Self::Nvme(_) => Protocol::Nvme,
            Self::Scsi(_) => Protocol::Scsi,
        }
    }

    /// Stable identifier; also the key in a snapshot's attribute map.
    pub fn id(&self) -> String {
        match self {
            Self::AtaNormalized(attr) => attr.attribute_id.to_string(),
            Self::AtaDeviceStatistic(attr) | Self::Nvme(attr) | Self::Scsi(attr) => {
                attr.attribute_id.clone()
            }
        }
    }

    /// Value compared by administrator threshold overrides: the raw counter
    /// for ATA table rows, the current value otherwise.
    pub fn comparable_value(&self) -> i64 {
        match self {
            Self::AtaNormalized(attr) => attr.raw_value,
            Self::AtaDeviceStatistic(attr) | Self::Nvme(attr) | Self::Scsi(attr) => attr.value,
        }
    }

    pub fn evaluation(&self) -> &Evaluation {
        match self {
            Self::AtaNormalized(attr) => &attr.evaluation,
            Self::AtaDeviceStatistic(attr) | Self::Nvme(attr) | Self::Scsi(attr) => {
                &attr.evaluation
            }
        }
    }

    pub fn evaluation_mut(&mut self) -> &mut Evaluation {
        match self {
            Self::AtaNormalized(attr) => &mut attr.evaluation,
            Self::AtaDeviceStatistic(attr) | Self::Nvme(attr) | Self::Scsi(attr) => {
                &mut attr.evaluation
            }
        }
    }

    pub fn status(&self) -> AttributeStatus {
        self.evaluation().status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reallocated() -> AttributeReading {
        AttributeReading::AtaNormalized(AtaAttribute {
            attribute_id: 5,
            value: 100,
            worst: 100,
            thresh: 10,
            raw_value: 8,
            raw_string: "8".to_string(),
            when_failed: String::new(),
            evaluation: Evaluation::default(),
        })
    }

    #[test]
    fn identity_follows_variant() {
        let ata = reallocated();
        assert_eq!(ata.id(), "5");
        assert_eq!(ata.protocol(), Protocol::Ata);
        assert_eq!(ata.comparable_value(), 8);

        let devstat =
            AttributeReading::AtaDeviceStatistic(KeyedAttribute::new("devstat_7_8", 12, 100));
        assert_eq!(devstat.protocol(), Protocol::Ata);
        assert_eq!(devstat.kind(), AttributeKind::AtaDeviceStatistic);
        assert_eq!(devstat.comparable_value(), 12);

        let nvme = AttributeReading::Nvme(KeyedAttribute::new("media_errors", 3, 0));
        assert_eq!(nvme.id(), "media_errors");
        assert_eq!(nvme.protocol(), Protocol::Nvme);
    }

    #[test]
    fn reasons_are_joined() {
        let mut evaluation = Evaluation::passed();
        evaluation.flag(AttributeStatus::FAILED_SMART, "first");
        evaluation.flag(AttributeStatus::WARNING_SCRUTINY, "second");
        evaluation.push_reason("");
        assert_eq!(evaluation.status_reason, "first; second");
        assert!(evaluation.status.contains(AttributeStatus::FAILED_SMART));
        assert!(evaluation.status.contains(AttributeStatus::WARNING_SCRUTINY));
    }

    #[test]
    fn json_carries_kind_tag() {
        let reading = AttributeReading::Scsi(KeyedAttribute::new("scsi_grown_defect_list", 2, 0));
        let json = serde_json::to_value(&reading).expect("serialize");
        assert_eq!(json["kind"], "scsi");
        assert_eq!(json["attribute_id"], "scsi_grown_defect_list");
        let back: AttributeReading = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, reading);
    }
}
