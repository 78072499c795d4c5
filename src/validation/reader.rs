//! Typed extraction from raw JSON field maps.
//!
//! A [`FieldReader`] pulls individual fields out of an untyped object. Type
//! mismatches are recorded as violations; absent keys (and explicit `null`)
//! simply yield `None`, leaving the "field required" decision to the builder
//! that knows which fields have defaults.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::{timestamp, Violations};

/// Reads fields from one JSON object, reporting into a shared [`Violations`].
pub struct FieldReader<'a, 'v> {
    map: &'a Map<String, Value>,
    violations: &'v mut Violations,
}

impl<'a, 'v> FieldReader<'a, 'v> {
    /// Open `value` as an object. A non-object is reported under `field`.
    pub fn open(
        value: &'a Value,
        field: &str,
        violations: &'v mut Violations,
    ) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self { map, violations }),
            other => {
                violations.push(field, format!("expected object, got {}", kind(other)));
                None
            }
        }
    }

    /// Open a root-level value; a non-object is reported under `$`.
    pub fn root(value: &'a Value, violations: &'v mut Violations) -> Option<Self> {
        Self::open(value, "$", violations)
    }

    /// Raw access to a present, non-null field.
    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        match self.map.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    /// A nested object, left unread. Any other JSON type is reported at `name`.
    pub fn object(&mut self, name: &str) -> Option<&'a Value> {
        let value = self.raw(name)?;
        if value.is_object() {
            Some(value)
        } else {
            self.mismatch(name, "object", value);
            None
        }
    }

    /// The shared accumulator.
    pub fn violations(&mut self) -> &mut Violations {
        self.violations
    }

    fn mismatch(&mut self, name: &str, expected: &str, got: &Value) {
        self.violations
            .push(name, format!("expected {}, got {}", expected, kind(got)));
    }

    /// A string field.
    pub fn string(&mut self, name: &str) -> Option<String> {
        let value = self.raw(name)?;
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.mismatch(name, "string", other);
                None
            }
        }
    }

    /// A numeric field, as `f64`.
    pub fn float(&mut self, name: &str) -> Option<f64> {
        let value = self.raw(name)?;
        match value.as_f64() {
            Some(n) => Some(n),
            None => {
                self.mismatch(name, "number", value);
                None
            }
        }
    }

    /// An integer; floats with no fractional part are accepted.
    pub fn integer(&mut self, name: &str) -> Option<i64> {
        let value = self.raw(name)?;
        if let Some(n) = value.as_i64() {
            return Some(n);
        }
        match value.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                Some(f as i64)
            }
            _ => {
                self.mismatch(name, "integer", value);
                None
            }
        }
    }

    /// A non-negative integer that fits in `u32`.
    pub fn unsigned(&mut self, name: &str) -> Option<u32> {
        let n = self.integer(name)?;
        match u32::try_from(n) {
            Ok(n) => Some(n),
            Err(_) => {
                self.violations
                    .push(name, format!("must be a non-negative integer, got {}", n));
                None
            }
        }
    }

    /// An ISO-8601 timestamp field, normalised to UTC.
    pub fn datetime(&mut self, name: &str) -> Option<DateTime<Utc>> {
        let raw = self.string(name)?;
        match timestamp::parse(&raw) {
            Ok(at) => Some(at),
            Err(reason) => {
                self.violations.push(name, reason);
                None
            }
        }
    }

    /// A list of strings. Any bad element is reported by index and the list is dropped.
    pub fn string_list(&mut self, name: &str) -> Option<Vec<String>> {
        self.list(name, |value| match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(format!("expected string, got {}", kind(other))),
        })
    }

    /// A list of closed-vocabulary tokens.
    pub fn token_list<T>(&mut self, name: &str) -> Option<Vec<T>>
    where
        T: FromStr<Err = String>,
    {
        self.list(name, |value| match value {
            Value::String(s) => s.parse::<T>(),
            other => Err(format!("expected string, got {}", kind(other))),
        })
    }

    /// A single closed-vocabulary token.
    pub fn token<T>(&mut self, name: &str) -> Option<T>
    where
        T: FromStr<Err = String>,
    {
        let raw = self.string(name)?;
        match raw.parse::<T>() {
            Ok(token) => Some(token),
            Err(reason) => {
                self.violations.push(name, reason);
                None
            }
        }
    }

    fn list<T>(
        &mut self,
        name: &str,
        mut item: impl FnMut(&Value) -> Result<T, String>,
    ) -> Option<Vec<T>> {
        let value = self.raw(name)?;
        let items = match value {
            Value::Array(items) => items,
            other => {
                self.mismatch(name, "list", other);
                return None;
            }
        };
        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, value) in items.iter().enumerate() {
            match item(value) {
                Ok(v) => out.push(v),
                Err(reason) => {
                    self.violations.push(&format!("{}[{}]", name, i), reason);
                    ok = false;
                }
            }
        }
        ok.then_some(out)
    }
}

/// JSON type name used in mismatch messages.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
