use crate::smart::protocol::Protocol;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metric family a point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    Smart,
    Temp,
}

impl Measurement {
    pub const ALL: [Measurement; 2] = [Measurement::Smart, Measurement::Temp];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smart => "smart",
            Self::Temp => "temp",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "smart" => Some(Self::Smart),
            "temp" => Some(Self::Temp),
            _ => None,
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Float(value) if value.is_finite() => Some(value.round() as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

/// One stored sample: tagged by device and protocol, keyed by
/// `(measurement, device_wwn, timestamp)` within a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub measurement: Measurement,
    pub timestamp: DateTime<Utc>,
    pub device_wwn: String,
    pub device_protocol: Protocol,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Point {
    pub fn new(
        measurement: Measurement,
        timestamp: DateTime<Utc>,
        device_wwn: impl Into<String>,
        device_protocol: Protocol,
    ) -> Self {
        Self {
            measurement,
            timestamp,
            device_wwn: device_wwn.into(),
            device_protocol,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}
