//! Communication tone of a persona.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ValidationError;
use crate::validation::{FieldReader, Violations};

const MODEL: &str = "ToneVector";

/// Four independent style scalars, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ToneVector {
    direct: f64,
    warm: f64,
    humorous: f64,
    formal: f64,
}

impl ToneVector {
    /// Build a tone vector, rejecting any component outside `[0, 1]`.
    pub fn new(direct: f64, warm: f64, humorous: f64, formal: f64) -> Result<Self, ValidationError> {
        let tone = Self {
            direct,
            warm,
            humorous,
            formal,
        };
        let mut v = Violations::new();
        tone.check(&mut v);
        v.finish(MODEL, Some(tone))
    }

    /// Get the directness component.
    pub fn direct(&self) -> f64 {
        self.direct
    }

    /// Get the warmth component.
    pub fn warm(&self) -> f64 {
        self.warm
    }

    /// Get the humour component.
    pub fn humorous(&self) -> f64 {
        self.humorous
    }

    /// Get the formality component.
    pub fn formal(&self) -> f64 {
        self.formal
    }

    fn check(&self, v: &mut Violations) {
        v.check_range("direct", self.direct, 0.0, 1.0);
        v.check_range("warm", self.warm, 0.0, 1.0);
        v.check_range("humorous", self.humorous, 0.0, 1.0);
        v.check_range("formal", self.formal, 0.0, 1.0);
    }

    /// Read and check a raw tone vector under the current scope of `v`.
    pub(crate) fn read(value: &Value, v: &mut Violations) -> Option<Self> {
        let mut r = FieldReader::root(value, v)?;
        let direct = r.float("direct");
        let warm = r.float("warm");
        let humorous = r.float("humorous");
        let formal = r.float("formal");

        let mut component = |field: &str, value: Option<f64>| {
            let value = v.require(field, value);
            if let Some(x) = value {
                v.check_range(field, x, 0.0, 1.0);
            }
            value
        };
        let direct = component("direct", direct);
        let warm = component("warm", warm);
        let humorous = component("humorous", humorous);
        let formal = component("formal", formal);

        Some(Self {
            direct: direct?,
            warm: warm?,
            humorous: humorous?,
            formal: formal?,
        })
    }

    /// Reconstruct from a structural dump.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let mut v = Violations::new();
        let tone = Self::read(value, &mut v);
        v.finish(MODEL, tone)
    }

    /// Serialize to a structural dump.
    pub fn to_value(&self) -> Value {
        crate::hashing::to_canonical_value(self)
    }
}

impl TryFrom<Value> for ToneVector {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_and_boundary_values() {
        let tone = ToneVector::new(0.8, 0.6, 0.3, 0.9).unwrap();
        assert_eq!(tone.direct(), 0.8);
        assert_eq!(tone.formal(), 0.9);
        assert!(ToneVector::new(0.0, 0.0, 0.0, 0.0).is_ok());
        assert!(ToneVector::new(1.0, 1.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn test_out_of_range_components_fail() {
        let err = ToneVector::new(1.5, 0.5, 0.5, 0.5).unwrap_err();
        assert!(err.has_field("direct"));
        let err = ToneVector::new(-0.1, 0.5, 0.5, 0.5).unwrap_err();
        assert!(err.has_field("direct"));
    }

    #[test]
    fn test_all_violations_reported() {
        let err = ToneVector::new(1.5, -1.0, 0.5, f64::NAN).unwrap_err();
        assert_eq!(err.errors.len(), 3);
        assert!(err.has_field("direct"));
        assert!(err.has_field("warm"));
        assert!(err.has_field("formal"));
    }

    #[test]
    fn test_from_value_missing_and_bad_fields() {
        let err = ToneVector::from_value(&json!({"direct": "high", "warm": 0.5})).unwrap_err();
        assert!(err.has_field("direct"));
        assert!(err.has_field("humorous"));
        assert!(err.has_field("formal"));
        assert_eq!(err.errors.len(), 3);
    }

    #[test]
    fn test_round_trip() {
        let tone = ToneVector::new(0.25, 0.5, 0.75, 1.0).unwrap();
        let back = ToneVector::from_value(&tone.to_value()).unwrap();
        assert_eq!(tone, back);
    }
}
