use thiserror::Error;

/// Rejections raised while turning a raw report into a [`Snapshot`].
///
/// [`Snapshot`]: crate::smart::snapshot::Snapshot
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("malformed {protocol} reading: {reason}")]
    MalformedReading { protocol: String, reason: String },
    #[error("unknown device protocol {0:?}")]
    UnknownProtocol(String),
}

impl EvaluationError {
    pub fn malformed(protocol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedReading {
            protocol: protocol.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("time-series store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
    #[error("stored point could not be decoded: {0}")]
    Decode(String),
    #[error("point could not be encoded for storage: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("unknown duration key {0:?}; expected week, month, year or forever")]
    UnknownDurationKey(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid attribute override #{index}: {reason}")]
    InvalidOverride { index: usize, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_input() {
        let err = EvaluationError::malformed("NVMe", "missing nvme_smart_health_information_log");
        assert_eq!(
            err.to_string(),
            "malformed NVMe reading: missing nvme_smart_health_information_log"
        );

        let err = HistoryError::UnknownDurationKey("decade".to_string());
        assert!(err.to_string().contains("\"decade\""));

        let err = HistoryError::from(StoreError::Decode("bad field".to_string()));
        assert!(err.to_string().starts_with("history unavailable"));
    }
}
