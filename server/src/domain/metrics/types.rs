//! Device snapshot and sample types shared by the classifier and the collector

use std::collections::HashMap;
use std::fmt;

/// Raw attribute value as reported by the upstream device API.
///
/// Absent and `null` values are both represented as [`RawValue::Empty`] so the
/// mappers see them the same way as an empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Empty,
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Text view of the value, treating `Empty` as the empty string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Empty => Some(""),
            RawValue::Text(s) => Some(s),
            RawValue::Number(_) => None,
        }
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Empty,
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => RawValue::Number(f),
                None => RawValue::Text(n.to_string()),
            },
            serde_json::Value::String(s) => RawValue::Text(s),
            // Booleans, arrays and objects keep their JSON rendering so they
            // still reach the mapper and fail there as a type mismatch.
            other => RawValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Empty => write!(f, "\"\""),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// One device as seen in a single collection cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: String,
    pub display_name: String,
    pub attributes: HashMap<String, RawValue>,
}

impl Device {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// One gauge reading produced for a device attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Metric name without the exporter namespace (e.g. `battery_percentage`)
    pub metric: String,
    pub device_id: String,
    pub device_name: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_value_from_json() {
        assert_eq!(RawValue::from(json!(null)), RawValue::Empty);
        assert_eq!(RawValue::from(json!(55.5)), RawValue::Number(55.5));
        assert_eq!(RawValue::from(json!(12)), RawValue::Number(12.0));
        assert_eq!(
            RawValue::from(json!("closed")),
            RawValue::Text("closed".to_string())
        );
        assert_eq!(
            RawValue::from(json!(true)),
            RawValue::Text("true".to_string())
        );
        assert_eq!(
            RawValue::from(json!({"x": 1, "y": 2})),
            RawValue::Text(r#"{"x":1,"y":2}"#.to_string())
        );
    }

    #[test]
    fn test_raw_value_as_text() {
        assert_eq!(RawValue::Empty.as_text(), Some(""));
        assert_eq!(RawValue::from("open").as_text(), Some("open"));
        assert_eq!(RawValue::Number(1.0).as_text(), None);
    }

    #[test]
    fn test_raw_value_display() {
        assert_eq!(RawValue::Empty.to_string(), "\"\"");
        assert_eq!(RawValue::Number(2.5).to_string(), "2.5");
        assert_eq!(RawValue::from("ajar").to_string(), "\"ajar\"");
    }

    #[test]
    fn test_device_builder() {
        let device = Device::new("1", "Front Door")
            .with_attribute("contact", "closed")
            .with_attribute("battery", 80.0);

        assert_eq!(device.id, "1");
        assert_eq!(device.display_name, "Front Door");
        assert_eq!(device.attributes.len(), 2);
        assert_eq!(device.attributes["battery"], RawValue::Number(80.0));
    }
}
