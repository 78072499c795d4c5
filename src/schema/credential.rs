//! MACP: Memory Access Credential Package.
//!
//! A scoped, time-bound grant. Expiry is checked once, at construction, against
//! [`SchemaConfig::now`]. Both sides of the comparison are UTC instants.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::vocab::MemoryScope;
use crate::config::SchemaConfig;
use crate::errors::ValidationError;
use crate::validation::{timestamp, FieldReader, Violations};

const MODEL: &str = "MemoryCredential";

/// Memory access grant. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct MemoryCredential {
    credential_id: String,
    scope: BTreeSet<MemoryScope>,
    issuer: String,
    #[serde(with = "timestamp")]
    expiration: DateTime<Utc>,
    signature: Option<String>,
    policy_tag: Option<String>,
}

impl MemoryCredential {
    /// Start an empty builder.
    pub fn builder() -> MemoryCredentialBuilder {
        MemoryCredentialBuilder::default()
    }

    /// A builder pre-filled with this record's values.
    pub fn to_builder(&self) -> MemoryCredentialBuilder {
        MemoryCredentialBuilder {
            credential_id: Some(self.credential_id.clone()),
            scope: Some(self.scope.iter().copied().collect()),
            issuer: Some(self.issuer.clone()),
            expiration: Some(self.expiration),
            signature: self.signature.clone(),
            policy_tag: self.policy_tag.clone(),
        }
    }

    /// Get the credential identifier.
    pub fn credential_id(&self) -> &str {
        &self.credential_id
    }

    /// Get the granted memory scopes.
    pub fn scope(&self) -> &BTreeSet<MemoryScope> {
        &self.scope
    }

    /// Whether `scope` is granted.
    pub fn allows(&self, scope: MemoryScope) -> bool {
        self.scope.contains(&scope)
    }

    /// Get the issuing authority.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Get the expiration instant.
    pub fn expiration(&self) -> &DateTime<Utc> {
        &self.expiration
    }

    /// Whether the credential has lapsed at `at`.
    pub fn is_expired_at(&self, at: &DateTime<Utc>) -> bool {
        self.expiration <= *at
    }

    /// Opaque signature. Carried through, never verified.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Get the policy tag.
    pub fn policy_tag(&self) -> Option<&str> {
        self.policy_tag.as_deref()
    }

    pub(crate) fn read(value: &Value, v: &mut Violations) -> Option<MemoryCredentialBuilder> {
        let mut r = FieldReader::root(value, v)?;
        Some(MemoryCredentialBuilder {
            credential_id: r.string("credential_id"),
            scope: r.token_list("scope"),
            issuer: r.string("issuer"),
            expiration: r.datetime("expiration"),
            signature: r.string("signature"),
            policy_tag: r.string("policy_tag"),
        })
    }

    /// Reconstruct from a structural dump, checking expiry against the wall clock.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        Self::from_value_with(value, &SchemaConfig::default())
    }

    /// Reconstruct from a structural dump, evaluating expiry per `config`.
    pub fn from_value_with(value: &Value, config: &SchemaConfig) -> Result<Self, ValidationError> {
        let mut v = Violations::new();
        let credential = Self::read(value, &mut v).and_then(|b| b.assemble(config, &mut v));
        v.finish(MODEL, credential)
    }

    /// Serialize to a structural dump.
    pub fn to_value(&self) -> Value {
        crate::hashing::to_canonical_value(self)
    }
}

impl TryFrom<Value> for MemoryCredential {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// Two-phase constructor for [`MemoryCredential`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialBuilder {
    credential_id: Option<String>,
    scope: Option<Vec<MemoryScope>>,
    issuer: Option<String>,
    expiration: Option<DateTime<Utc>>,
    signature: Option<String>,
    policy_tag: Option<String>,
}

impl MemoryCredentialBuilder {
    /// Set the credential identifier.
    pub fn credential_id(mut self, id: impl Into<String>) -> Self {
        self.credential_id = Some(id.into());
        self
    }

    /// Set the granted memory scopes.
    pub fn scope(mut self, scope: impl IntoIterator<Item = MemoryScope>) -> Self {
        self.scope = Some(scope.into_iter().collect());
        self
    }

    /// Set the issuing authority.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the expiration instant.
    pub fn expiration(mut self, at: DateTime<Utc>) -> Self {
        self.expiration = Some(at);
        self
    }

    /// Set the signature.
    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Set the policy tag.
    pub fn policy_tag(mut self, tag: impl Into<String>) -> Self {
        self.policy_tag = Some(tag.into());
        self
    }

    /// Validate against the wall clock and freeze the credential.
    pub fn build(self) -> Result<MemoryCredential, ValidationError> {
        self.build_with(&SchemaConfig::default())
    }

    /// Validate against `config` and freeze the record.
    pub fn build_with(self, config: &SchemaConfig) -> Result<MemoryCredential, ValidationError> {
        let mut v = Violations::new();
        let credential = self.assemble(config, &mut v);
        v.finish(MODEL, credential)
    }

    pub(crate) fn assemble(
        self,
        config: &SchemaConfig,
        v: &mut Violations,
    ) -> Option<MemoryCredential> {
        let credential_id = self
            .credential_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        v.check_not_blank("credential_id", &credential_id);
        let scope = v.require("scope", self.scope);
        if let Some(scope) = &scope {
            v.check_non_empty("scope", scope);
        }
        let issuer = v.require("issuer", self.issuer);
        if let Some(issuer) = &issuer {
            v.check_not_blank("issuer", issuer);
        }
        let expiration = v.require("expiration", self.expiration);
        if let Some(at) = &expiration {
            v.check_future("expiration", at, &config.now());
        }

        Some(MemoryCredential {
            credential_id,
            scope: scope?.into_iter().collect(),
            issuer: issuer?,
            expiration: expiration?,
            signature: self.signature,
            policy_tag: self.policy_tag,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    pub(crate) fn sample_credential() -> MemoryCredentialBuilder {
        MemoryCredential::builder()
            .scope([
                MemoryScope::MemoryRead,
                MemoryScope::MemoryWrite,
                MemoryScope::TrustvaultCommit,
            ])
            .issuer("identity-authority")
            .expiration(Utc::now() + Duration::days(365))
    }

    #[test]
    fn test_defaults() {
        let credential = sample_credential().build().unwrap();
        assert!(Uuid::parse_str(credential.credential_id()).is_ok());
        assert!(credential.signature().is_none());
        assert!(credential.policy_tag().is_none());
        assert!(credential.allows(MemoryScope::TrustvaultCommit));
        assert!(!credential.allows(MemoryScope::AuditExport));
    }

    #[test]
    fn test_past_expiration_is_rejected() {
        let err = sample_credential()
            .expiration(Utc::now() - Duration::days(1))
            .build()
            .unwrap_err();
        assert!(err.has_field("expiration"));
    }

    #[test]
    fn test_expiration_equal_to_now_is_rejected() {
        let at = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
        let config = SchemaConfig::new().with_reference_time(at);
        let err = sample_credential().expiration(at).build_with(&config).unwrap_err();
        assert!(err.has_field("expiration"));
        assert!(sample_credential()
            .expiration(at + Duration::seconds(1))
            .build_with(&config)
            .is_ok());
    }

    #[test]
    fn test_is_expired_at() {
        let at = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
        let credential = sample_credential()
            .expiration(at)
            .build_with(&SchemaConfig::new().with_reference_time(at - Duration::days(1)))
            .unwrap();
        assert!(!credential.is_expired_at(&(at - Duration::seconds(1))));
        assert!(credential.is_expired_at(&at));
        assert!(credential.is_expired_at(&(at + Duration::days(1))));
    }

    #[test]
    fn test_offset_and_naive_expirations_compare_as_utc() {
        let config = SchemaConfig::new()
            .with_reference_time(Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap());
        let base = json!({"scope": ["memory.read"], "issuer": "test-issuer"});

        let mut aware = base.clone();
        // 13:30 at +02:00 is 11:30 UTC, before the reference instant
        aware["expiration"] = json!("2030-06-01T13:30:00+02:00");
        assert!(MemoryCredential::from_value_with(&aware, &config).is_err());

        let mut naive = base.clone();
        naive["expiration"] = json!("2030-06-01T12:30:00");
        let credential = MemoryCredential::from_value_with(&naive, &config).unwrap();
        assert_eq!(
            *credential.expiration(),
            Utc.with_ymd_and_hms(2030, 6, 1, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_invalid_scope_token_is_rejected() {
        let err = MemoryCredential::from_value(&json!({
            "scope": ["invalid.scope"],
            "issuer": "test",
            "expiration": crate::validation::timestamp::render(&(Utc::now() + Duration::days(1)))
        }))
        .unwrap_err();
        assert!(err.has_field("scope[0]"));
        assert!(err.errors[0].reason.contains("invalid.scope"));
        assert_eq!(err.errors.len(), 1);
    }

    #[test]
    fn test_empty_scope_is_rejected() {
        let err = sample_credential().scope(Vec::new()).build().unwrap_err();
        assert!(err.has_field("scope"));
    }

    #[test]
    fn test_round_trip_keeps_optional_fields() {
        let credential = sample_credential()
            .credential_id("cred-001")
            .signature("sig:xyz")
            .policy_tag("gdpr")
            .build()
            .unwrap();
        let back = MemoryCredential::from_value(&credential.to_value()).unwrap();
        assert_eq!(credential, back);
        assert_eq!(back.credential_id(), "cred-001");
    }
}
