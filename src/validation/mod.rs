//! Field validators shared by every record type.
//!
//! Construction never stops at the first problem. Each check appends to a
//! [`Violations`] accumulator, and the record is only produced when the
//! accumulator is still empty at the end.
//!
//! Paths are dotted from the root of the value being built. Nested sub-records
//! are checked inside [`Violations::scope`], which prefixes every path pushed
//! from the closure.

pub mod reader;
pub mod timestamp;

use chrono::{DateTime, Utc};

use crate::errors::{FieldError, ValidationError};

pub use reader::FieldReader;

/// Accumulates constraint violations for one construction attempt.
#[derive(Debug, Default)]
pub struct Violations {
    prefix: Vec<String>,
    errors: Vec<FieldError>,
}

impl Violations {
    /// Start an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Full dotted path of `field` under the current scope.
    pub fn path(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.prefix.join("."), field)
        }
    }

    /// Record a violation for `field` under the current scope.
    pub fn push(&mut self, field: &str, reason: impl Into<String>) {
        let field = self.path(field);
        self.errors.push(FieldError::new(field, reason));
    }

    /// Run `f` with `key` appended to the path prefix.
    pub fn scope<R>(&mut self, key: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.prefix.push(key.to_string());
        let result = f(self);
        self.prefix.pop();
        result
    }

    /// Whether a violation was already recorded for `field` (or anything below it).
    pub fn has(&self, field: &str) -> bool {
        let path = self.path(field);
        let nested = format!("{}.", path);
        let indexed = format!("{}[", path);
        self.errors.iter().any(|e| {
            e.field == path || e.field.starts_with(&nested) || e.field.starts_with(&indexed)
        })
    }

    /// Whether nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of violations reported so far.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Unwrap a required value, reporting it as missing when absent.
    ///
    /// A field that already failed type checking is not reported a second time.
    pub fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() && !self.has(field) {
            self.push(field, "field required");
        }
        value
    }

    /// Character-length bounds, inclusive.
    pub fn check_len(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let n = value.chars().count();
        if n < min || n > max {
            self.push(
                field,
                format!(
                    "length must be between {} and {} characters, got {}",
                    min, max, n
                ),
            );
        }
    }

    /// Reject empty or whitespace-only strings.
    pub fn check_not_blank(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be blank");
        }
    }

    /// Inclusive float range. NaN and infinities always fail.
    pub fn check_range(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if !value.is_finite() || value < min || value > max {
            self.push(
                field,
                format!("must be between {} and {}, got {}", min, max, value),
            );
        }
    }

    /// Inclusive integer range.
    pub fn check_int_range(&mut self, field: &str, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.push(
                field,
                format!("must be between {} and {}, got {}", min, max, value),
            );
        }
    }

    /// Reject an empty collection.
    pub fn check_non_empty<T>(&mut self, field: &str, values: &[T]) {
        if values.is_empty() {
            self.push(field, "must contain at least one entry");
        }
    }

    /// Ordered-set semantics: every entry appears once.
    pub fn check_unique(&mut self, field: &str, values: &[String]) {
        for (i, value) in values.iter().enumerate() {
            if values[..i].contains(value) {
                self.push(field, format!("duplicate entry '{}'", value));
            }
        }
    }

    /// The instant must lie strictly after `now`.
    pub fn check_future(&mut self, field: &str, at: &DateTime<Utc>, now: &DateTime<Utc>) {
        if at <= now {
            self.push(
                field,
                format!(
                    "must be in the future, got {} (now {})",
                    timestamp::render(at),
                    timestamp::render(now)
                ),
            );
        }
    }

    /// Close the attempt: the assembled value if nothing was violated.
    pub fn finish<T>(self, model: &str, value: Option<T>) -> Result<T, ValidationError> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ if self.errors.is_empty() => Err(ValidationError::single(
                model,
                "$",
                "record could not be assembled",
            )),
            _ => Err(ValidationError::new(model, self.errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_scope_prefixes_paths() {
        let mut v = Violations::new();
        v.scope("persona", |v| {
            v.scope("tone_vector", |v| v.push("direct", "out of range"));
        });
        v.push("policy_version", "bad");
        let err = v.finish::<()>("IdentityRecord", None).unwrap_err();
        assert!(err.has_field("persona.tone_vector.direct"));
        assert!(err.has_field("policy_version"));
    }

    #[test]
    fn test_require_does_not_double_report() {
        let mut v = Violations::new();
        v.push("name", "expected string");
        assert!(v.require::<String>("name", None).is_none());
        assert!(v.require::<String>("created_by", None).is_none());
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn test_range_rejects_nan_and_bounds() {
        let mut v = Violations::new();
        v.check_range("a", 0.0, 0.0, 1.0);
        v.check_range("b", 1.0, 0.0, 1.0);
        assert!(v.is_empty());
        v.check_range("c", f64::NAN, 0.0, 1.0);
        v.check_range("d", 1.5, 0.0, 1.0);
        v.check_range("e", -0.1, 0.0, 1.0);
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn test_len_counts_characters() {
        let mut v = Violations::new();
        v.check_len("name", "Zoë", 3, 40);
        assert!(v.is_empty());
        v.check_len("name", "ab", 3, 40);
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_unique_and_non_empty() {
        let mut v = Violations::new();
        v.check_non_empty::<String>("role_scope", &[]);
        v.check_unique("role_scope", &["a".into(), "b".into(), "a".into()]);
        let err = v.finish::<()>("RoleEnvelope", None).unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert!(err.errors[1].reason.contains("duplicate entry 'a'"));
    }

    #[test]
    fn test_future_is_strict() {
        let now = Utc::now();
        let mut v = Violations::new();
        v.check_future("expiration", &now, &now);
        v.check_future("expiration", &(now - Duration::seconds(1)), &now);
        assert_eq!(v.len(), 2);
        let mut ok = Violations::new();
        ok.check_future("expiration", &(now + Duration::seconds(1)), &now);
        assert!(ok.is_empty());
    }

}
