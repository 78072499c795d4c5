//! Error types for record construction.
//!
//! There is a single failure taxonomy: a [`ValidationError`] carrying every
//! violated constraint found while building one record.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One violated constraint, addressed by a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path from the root of the constructed value (e.g. `persona.tone_vector.direct`).
    pub field: String,
    /// Human-readable reason.
    pub reason: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Aggregated validation failure for a single construction attempt.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} validation error(s) for {model}: {}", .errors.len(), join_errors(.errors))]
pub struct ValidationError {
    /// Name of the model whose construction failed.
    pub model: String,
    /// Every violation found, in discovery order. Never empty.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Create a failure from a non-empty list of violations.
    pub fn new(model: impl Into<String>, errors: Vec<FieldError>) -> Self {
        debug_assert!(!errors.is_empty(), "ValidationError without violations");
        Self {
            model: model.into(),
            errors,
        }
    }

    /// Shorthand for a failure with exactly one violation.
    pub fn single(
        model: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(model, vec![FieldError::new(field, reason)])
    }

    /// Whether any violation is reported for `field` (exact path match).
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Flatten into `"<field>: <reason>"` strings.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_violation() {
        let err = ValidationError::new(
            "RoleEnvelope",
            vec![
                FieldError::new("role_scope", "must contain at least one entry"),
                FieldError::new("trust_vector", "must be between 0 and 1, got 1.2"),
            ],
        );
        let text = err.to_string();
        assert!(text.starts_with("2 validation error(s) for RoleEnvelope"));
        assert!(text.contains("role_scope: must contain at least one entry"));
        assert!(text.contains("trust_vector: must be between 0 and 1, got 1.2"));
    }

    #[test]
    fn test_has_field_and_messages() {
        let err = ValidationError::single("ToneVector", "direct", "must be between 0 and 1, got 1.5");
        assert!(err.has_field("direct"));
        assert!(!err.has_field("warm"));
        assert_eq!(err.messages(), vec!["direct: must be between 0 and 1, got 1.5"]);
    }
}
