//! Value mappers: turn a raw attribute value into a gauge value

use thiserror::Error;

use super::types::RawValue;

/// kWh to joules
pub const KWH_TO_JOULES: f64 = 3_600_000.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("invalid non {expected} argument {raw} for attribute '{attribute}'")]
    TypeMismatch {
        attribute: String,
        raw: RawValue,
        expected: &'static str,
    },

    #[error("invalid option {raw} for attribute '{attribute}', expected one of {expected:?}")]
    UnrecognizedOption {
        attribute: String,
        raw: RawValue,
        expected: [&'static str; 2],
    },
}

impl MapError {
    fn type_mismatch(attribute: &str, raw: &RawValue, expected: &'static str) -> Self {
        Self::TypeMismatch {
            attribute: attribute.to_string(),
            raw: raw.clone(),
            expected,
        }
    }

    pub fn attribute(&self) -> &str {
        match self {
            Self::TypeMismatch { attribute, .. } | Self::UnrecognizedOption { attribute, .. } => {
                attribute
            }
        }
    }
}

/// Conversion rule attached to a metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueMapper {
    /// Numbers pass through, the empty string becomes 0.0
    Float,
    /// Same as `Float`, then multiplied by the factor
    ScaledFloat(f64),
    /// `"clear"` is 0.0, any other string is 1.0
    Clear,
    /// `low` is 0.0, `high` is 1.0, anything else is rejected
    OneOf {
        low: &'static str,
        high: &'static str,
    },
}

impl ValueMapper {
    pub const fn one_of(low: &'static str, high: &'static str) -> Self {
        Self::OneOf { low, high }
    }

    pub fn map(&self, attribute: &str, raw: &RawValue) -> Result<f64, MapError> {
        match *self {
            Self::Float => map_float(attribute, raw),
            Self::ScaledFloat(factor) => map_float(attribute, raw).map(|v| v * factor),
            Self::Clear => match raw.as_text() {
                Some("clear") => Ok(0.0),
                Some(_) => Ok(1.0),
                None => Err(MapError::type_mismatch(attribute, raw, "string")),
            },
            Self::OneOf { low, high } => match raw.as_text() {
                Some(s) if s == low => Ok(0.0),
                Some(s) if s == high => Ok(1.0),
                Some(_) => Err(MapError::UnrecognizedOption {
                    attribute: attribute.to_string(),
                    raw: raw.clone(),
                    expected: [low, high],
                }),
                None => Err(MapError::type_mismatch(attribute, raw, "string")),
            },
        }
    }
}

fn map_float(attribute: &str, raw: &RawValue) -> Result<f64, MapError> {
    match raw {
        RawValue::Empty => Ok(0.0),
        RawValue::Text(s) if s.is_empty() => Ok(0.0),
        RawValue::Number(n) => Ok(*n),
        RawValue::Text(_) => Err(MapError::type_mismatch(attribute, raw, "floating-point")),
    }
}
