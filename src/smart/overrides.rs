use super::attribute::{AttributeReading, Evaluation};
use super::protocol::Protocol;
use super::status::AttributeStatus;
use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

pub const REASON_FORCED_PASSED: &str = "forced passed by override";
pub const REASON_FORCED_WARNING: &str = "forced warning by override";
pub const REASON_FORCED_FAILED: &str = "forced failure by override";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverrideAction {
    Ignore,
    ForceStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForcedStatus {
    Passed,
    Warn,
    Failed,
}

/// Administrator policy for one attribute, optionally scoped to one device.
///
/// `warn_above`/`fail_above` being `None` means "not configured", which keeps
/// a configured threshold of `0` distinct from an absent one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeOverride {
    pub protocol: Protocol,
    #[serde(deserialize_with = "attribute_id_from_json")]
    pub attribute_id: String,
    /// Empty applies to every device.
    #[serde(default)]
    pub wwn: String,
    #[serde(default)]
    pub action: Option<OverrideAction>,
    #[serde(default)]
    pub status: Option<ForcedStatus>,
    #[serde(default)]
    pub warn_above: Option<i64>,
    #[serde(default)]
    pub fail_above: Option<i64>,
}

fn attribute_id_from_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(id) => id.to_string(),
        RawId::Text(id) => id.trim().to_string(),
    })
}

impl AttributeOverride {
    pub fn matches(&self, protocol: Protocol, attribute_id: &str, wwn: &str) -> bool {
        self.protocol == protocol
            && self.attribute_id == attribute_id
            && (self.wwn.trim().is_empty() || self.wwn.trim().eq_ignore_ascii_case(wwn.trim()))
    }

    /// Applies this override to `evaluation` for an attribute whose
    /// comparable value is `value`.
    pub fn apply(&self, value: i64, mut evaluation: Evaluation) -> Evaluation {
        match (self.action, self.status) {
            (Some(OverrideAction::Ignore), _) => {
                evaluation.status = AttributeStatus::PASSED;
                evaluation.status_reason.clear();
                return evaluation;
            }
            (Some(OverrideAction::ForceStatus), Some(ForcedStatus::Passed)) => {
                evaluation.status = AttributeStatus::PASSED;
                evaluation.status_reason = REASON_FORCED_PASSED.to_string();
            }
            (Some(OverrideAction::ForceStatus), Some(ForcedStatus::Warn)) => {
                evaluation.status = evaluation
                    .status
                    .without(AttributeStatus::FAILED_SCRUTINY)
                    .with(AttributeStatus::WARNING_SCRUTINY);
                evaluation.status_reason = REASON_FORCED_WARNING.to_string();
            }
            (Some(OverrideAction::ForceStatus), Some(ForcedStatus::Failed)) => {
                evaluation.status = evaluation
                    .status
                    .without(AttributeStatus::INVALID_VALUE)
                    .with(AttributeStatus::FAILED_SCRUTINY);
                evaluation.status_reason = REASON_FORCED_FAILED.to_string();
            }
            (Some(OverrideAction::ForceStatus), None) | (None, _) => {}
        }

        // An implausible reading is never trusted enough to fail on a
        // threshold comparison.
        if evaluation.status.contains(AttributeStatus::INVALID_VALUE) {
            return evaluation;
        }

        if let Some(limit) = self.fail_above.filter(|limit| value > *limit) {
            evaluation.status = evaluation
                .status
                .without(AttributeStatus::WARNING_SCRUTINY)
                .with(AttributeStatus::FAILED_SCRUTINY);
            evaluation.push_reason(&format!("value {value} exceeds override fail threshold {limit}"));
        } else if let Some(limit) = self
            .warn_above
            .filter(|limit| value > *limit)
            .filter(|_| !evaluation.status.contains(AttributeStatus::FAILED_SCRUTINY))
        {
            evaluation.flag(
                AttributeStatus::WARNING_SCRUTINY,
                &format!("value {value} exceeds override warn threshold {limit}"),
            );
        }
        evaluation
    }
}

/// Folds every matching override, in list order, over the metadata result.
pub fn apply_overrides(
    reading: &AttributeReading,
    wwn: &str,
    overrides: &[AttributeOverride],
    evaluation: Evaluation,
) -> Evaluation {
    let protocol = reading.protocol();
    let attribute_id = reading.id();
    let value = reading.comparable_value();
    overrides
        .iter()
        .filter(|entry| entry.matches(protocol, &attribute_id, wwn))
        .fold(evaluation, |evaluation, entry| {
            if evaluation.status.contains(AttributeStatus::INVALID_VALUE)
                && (entry.warn_above.is_some() || entry.fail_above.is_some())
            {
                tracing::warn!(
                    wwn = %wwn,
                    attribute_id = %attribute_id,
                    value,
                    "skipping threshold override for implausible value"
                );
            }
            entry.apply(value, evaluation)
        })
}

pub fn validate_override(entry: &AttributeOverride) -> Result<(), String> {
    if entry.attribute_id.is_empty() {
        return Err("attribute_id must not be blank".to_string());
    }
    match (entry.action, entry.status) {
        (Some(OverrideAction::ForceStatus), None) => {
            return Err("force_status requires status".to_string());
        }
        (Some(OverrideAction::Ignore), Some(_)) | (None, Some(_)) => {
            return Err("status is only valid with action force_status".to_string());
        }
        _ => {}
    }
    if entry.action == Some(OverrideAction::Ignore)
        && (entry.warn_above.is_some() || entry.fail_above.is_some())
    {
        return Err("ignore cannot be combined with warn_above or fail_above".to_string());
    }
    if entry.action.is_none() && entry.warn_above.is_none() && entry.fail_above.is_none() {
        return Err("override needs an action, warn_above or fail_above".to_string());
    }
    Ok(())
}

/// Parses and validates the configured override list, keeping its order.
pub fn parse_overrides(entries: &[JsonValue]) -> Result<Vec<AttributeOverride>, ConfigError> {
    entries
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let entry: AttributeOverride = serde_json::from_value(raw.clone())
                .map_err(|err| ConfigError::InvalidOverride {
                    index,
                    reason: err.to_string(),
                })?;
            validate_override(&entry)
                .map_err(|reason| ConfigError::InvalidOverride { index, reason })?;
            Ok(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smart::attribute::KeyedAttribute;
    use serde_json::json;

    fn threshold_override(warn_above: Option<i64>, fail_above: Option<i64>) -> AttributeOverride {
        AttributeOverride {
            protocol: Protocol::Nvme,
            attribute_id: "media_errors".to_string(),
            wwn: String::new(),
            action: None,
            status: None,
            warn_above,
            fail_above,
        }
    }

    fn media_errors(value: i64) -> AttributeReading {
        AttributeReading::Nvme(KeyedAttribute::new("media_errors", value, 0))
    }

    #[test]
    fn wwn_scope_is_case_insensitive() {
        let mut entry = threshold_override(Some(1), None);
        assert!(entry.matches(Protocol::Nvme, "media_errors", "0x5000c500a1b2c3d4"));
        entry.wwn = "0x5000C500A1B2C3D4".to_string();
        assert!(entry.matches(Protocol::Nvme, "media_errors", "0x5000c500a1b2c3d4"));
        assert!(!entry.matches(Protocol::Nvme, "media_errors", "0x5000c500ffffffff"));
        assert!(!entry.matches(Protocol::Scsi, "media_errors", "0x5000c500a1b2c3d4"));
    }

    #[test]
    fn fail_above_wins_over_warn_above_in_any_order() {
        let reading = media_errors(50);
        let combined = [threshold_override(Some(10), Some(20))];
        let split = [
            threshold_override(None, Some(20)),
            threshold_override(Some(10), None),
        ];
        let split_reversed = [
            threshold_override(Some(10), None),
            threshold_override(None, Some(20)),
        ];
        for overrides in [&combined[..], &split[..], &split_reversed[..]] {
            let result = apply_overrides(&reading, "wwn", overrides, Evaluation::passed());
            assert_eq!(result.status, AttributeStatus::FAILED_SCRUTINY);
        }
    }

    #[test]
    fn zero_threshold_is_distinct_from_absent() {
        let reading = media_errors(1);
        let result = apply_overrides(
            &reading,
            "wwn",
            &[threshold_override(Some(0), None)],
            Evaluation::passed(),
        );
        assert!(result.status.contains(AttributeStatus::WARNING_SCRUTINY));

        let result = apply_overrides(
            &reading,
            "wwn",
            &[threshold_override(None, None)],
            Evaluation::passed(),
        );
        assert!(result.status.is_passed());
    }

    #[test]
    fn ignore_clears_everything() {
        let mut failed = Evaluation::passed();
        failed.flag(AttributeStatus::FAILED_SCRUTINY, "failing");
        let entry = AttributeOverride {
            action: Some(OverrideAction::Ignore),
            ..threshold_override(None, None)
        };
        let result = apply_overrides(&media_errors(9), "wwn", &[entry], failed);
        assert!(result.status.is_passed());
        assert!(result.status_reason.is_empty());
    }

    #[test]
    fn force_warn_clears_failure_and_later_entries_win() {
        let mut failed = Evaluation::passed();
        failed.flag(AttributeStatus::FAILED_SCRUTINY, "failing");
        let warn = AttributeOverride {
            action: Some(OverrideAction::ForceStatus),
            status: Some(ForcedStatus::Warn),
            ..threshold_override(None, None)
        };
        let result = apply_overrides(&media_errors(9), "wwn", &[warn.clone()], failed.clone());
        assert_eq!(result.status, AttributeStatus::WARNING_SCRUTINY);
        assert_eq!(result.status_reason, REASON_FORCED_WARNING);

        let passed = AttributeOverride {
            status: Some(ForcedStatus::Passed),
            ..warn.clone()
        };
        let result = apply_overrides(&media_errors(9), "wwn", &[warn, passed], failed);
        assert!(result.status.is_passed());
        assert_eq!(result.status_reason, REASON_FORCED_PASSED);
    }

    #[test]
    fn thresholds_never_fail_an_invalid_value() {
        let mut invalid = Evaluation::passed();
        invalid.flag(AttributeStatus::INVALID_VALUE, "exceeds reasonable maximum");
        let reading = AttributeReading::AtaDeviceStatistic(KeyedAttribute::new(
            "devstat_4_8",
            5_000_000,
            0,
        ));
        let entry = AttributeOverride {
            protocol: Protocol::Ata,
            attribute_id: "devstat_4_8".to_string(),
            ..threshold_override(None, Some(1))
        };
        let result = apply_overrides(&reading, "wwn", &[entry], invalid);
        assert!(result.status.contains(AttributeStatus::INVALID_VALUE));
        assert!(!result.status.contains(AttributeStatus::FAILED_SCRUTINY));
    }

    #[test]
    fn parse_rejects_malformed_entries_with_their_index() {
        let entries = vec![
            json!({"protocol": "ATA", "attribute_id": 5, "action": "ignore"}),
            json!({"protocol": "nvme", "attribute_id": "media_errors", "action": "force_status"}),
        ];
        let err = parse_overrides(&entries).expect_err("force_status without status");
        assert!(matches!(err, ConfigError::InvalidOverride { index: 1, .. }));

        let err = parse_overrides(&[json!({"protocol": "sas", "attribute_id": "x", "warn_above": 1})])
            .expect_err("unknown protocol");
        assert!(matches!(err, ConfigError::InvalidOverride { index: 0, .. }));

        let err = parse_overrides(&[json!({"protocol": "scsi", "attribute_id": "x", "action": "mute"})])
            .expect_err("unknown action");
        assert!(err.to_string().contains("#0"));
    }

    #[test]
    fn parse_keeps_order_and_normalizes_ids() {
        let entries = vec![
            json!({"protocol": "ATA", "attribute_id": 194, "fail_above": 0}),
            json!({"protocol": "NVMe", "attribute_id": " media_errors ", "wwn": "0xabc", "action": "force_status", "status": "warn"}),
        ];
        let parsed = parse_overrides(&entries).expect("valid overrides");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].attribute_id, "194");
        assert_eq!(parsed[0].fail_above, Some(0));
        assert_eq!(parsed[1].attribute_id, "media_errors");
        assert_eq!(parsed[1].status, Some(ForcedStatus::Warn));
    }
}
