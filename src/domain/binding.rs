// Data binding domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ConfigurationError;

/// Identifies one remote time-series property tied to a scene entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataBinding {
    pub entity_id: String,
    pub component_name: String,
    pub property_name: String,
}

impl DataBinding {
    pub fn new(
        entity_id: impl Into<String>,
        component_name: impl Into<String>,
        property_name: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            component_name: component_name.into(),
            property_name: property_name.into(),
        }
    }
}

impl fmt::Display for DataBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.entity_id, self.component_name, self.property_name
        )
    }
}

/// Primitive type the remote service declares for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Double,
    Boolean,
    Integer,
    Long,
}

impl ValueKind {
    /// Key of the value object in a property history sample, e.g. `doubleValue`.
    pub fn field_name(&self) -> &'static str {
        match self {
            ValueKind::String => "stringValue",
            ValueKind::Double => "doubleValue",
            ValueKind::Boolean => "booleanValue",
            ValueKind::Integer => "integerValue",
            ValueKind::Long => "longValue",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, ValueKind::String)
    }
}

impl FromStr for ValueKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STRING" => Ok(ValueKind::String),
            "DOUBLE" => Ok(ValueKind::Double),
            "BOOLEAN" => Ok(ValueKind::Boolean),
            "INTEGER" => Ok(ValueKind::Integer),
            "LONG" => Ok(ValueKind::Long),
            other => Err(ConfigurationError::UnsupportedValueType(other.to_string())),
        }
    }
}

/// Decoded property value. Every non-string kind is carried as a 64-bit float
/// so cached values and rule thresholds compare in the same domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    /// Decode a raw JSON sample according to the binding's value kind.
    /// Returns `None` when the raw value cannot be represented in that kind.
    pub fn decode(raw: &serde_json::Value, kind: ValueKind) -> Option<Self> {
        if !kind.is_numeric() {
            return match raw {
                serde_json::Value::String(s) => Some(Value::Text(s.clone())),
                serde_json::Value::Null => None,
                other => Some(Value::Text(other.to_string())),
            };
        }

        match raw {
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::Bool(b) => Some(Value::Number(if *b { 1.0 } else { 0.0 })),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(Value::Number),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Latest value of a binding, stamped with the end of the window it was fetched in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Value,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: Value) -> Self {
        Self { timestamp, value }
    }
}

/// Half-open fetch window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}
