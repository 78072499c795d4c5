//! Schema configuration.
//!
//! Holds the knobs that influence construction but are not part of any record:
//! the default policy version stamped on identity records and the instant used
//! for credential expiry checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;

/// Configuration applied when records are built or reconstructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Policy version used when an identity record does not carry one.
    #[serde(default = "default_policy_version")]
    pub policy_version: String,
    /// Fixed evaluation instant for expiry checks. `None` means the wall clock.
    #[serde(default)]
    pub reference_time: Option<DateTime<Utc>>,
}

fn default_policy_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            policy_version: default_policy_version(),
            reference_time: None,
        }
    }
}

impl SchemaConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the default policy version.
    pub fn with_policy_version(mut self, policy_version: impl Into<String>) -> Self {
        self.policy_version = policy_version.into();
        self
    }

    /// Pin the evaluation instant used for expiry checks.
    pub fn with_reference_time(mut self, at: DateTime<Utc>) -> Self {
        self.reference_time = Some(at);
        self
    }

    /// The instant expirations are compared against.
    pub fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults() {
        let config = SchemaConfig::default();
        assert_eq!(config.policy_version, "v2.0");
        assert!(config.reference_time.is_none());
    }

    #[test]
    fn test_pinned_reference_time() {
        let at = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let config = SchemaConfig::new().with_reference_time(at);
        assert_eq!(config.now(), at);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SchemaConfig = serde_json::from_str(r#"{"policy_version": "v2.1"}"#).unwrap();
        assert_eq!(config.policy_version, "v2.1");
        assert!(config.reference_time.is_none());
    }
}
