//! RAIR: the unified identity record.
//!
//! Composes one record of each kind and seals the whole with a second-level
//! provenance hash. The persona hash is part of the input to the record hash,
//! so tampering with the persona invalidates both.
//!
//! ```text
//! caller fields ─▶ sub-record builders (validate)
//!                    └─ PersonaBuilder ─▶ persona hash
//!               ─▶ IdentityRecordBuilder ─▶ record hash over {arc, role, macp, persona, policy_version}
//!               ─▶ extract_hashes / CommitRecord
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::commit::CommitRecord;
use super::credential::MemoryCredential;
use super::origin::OriginRecord;
use super::persona::Persona;
use super::role::RoleEnvelope;
use crate::config::SchemaConfig;
use crate::errors::ValidationError;
use crate::hashing;
use crate::validation::{FieldReader, Violations};

const MODEL: &str = "IdentityRecord";

/// The two provenance hashes of an identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHashes {
    pub persona_hash: String,
    pub record_hash: String,
}

/// Unified agent identity. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct IdentityRecord {
    arc: OriginRecord,
    role: RoleEnvelope,
    macp: MemoryCredential,
    persona: Persona,
    policy_version: String,
    provenance_hash: String,
}

impl IdentityRecord {
    /// Start an empty builder.
    pub fn builder() -> IdentityRecordBuilder {
        IdentityRecordBuilder::default()
    }

    /// A builder holding the same sub-records, minus the record hash.
    pub fn to_builder(&self) -> IdentityRecordBuilder {
        IdentityRecordBuilder {
            arc: Some(self.arc.clone()),
            role: Some(self.role.clone()),
            macp: Some(self.macp.clone()),
            persona: Some(self.persona.clone()),
            policy_version: Some(self.policy_version.clone()),
            provenance_hash: None,
        }
    }

    /// Get the origin record.
    pub fn arc(&self) -> &OriginRecord {
        &self.arc
    }

    /// Get the role envelope.
    pub fn role(&self) -> &RoleEnvelope {
        &self.role
    }

    /// Get the memory credential.
    pub fn macp(&self) -> &MemoryCredential {
        &self.macp
    }

    /// Get the persona.
    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Get the policy version.
    pub fn policy_version(&self) -> &str {
        &self.policy_version
    }

    /// Get the record provenance hash.
    pub fn provenance_hash(&self) -> &str {
        &self.provenance_hash
    }

    /// Both stored hashes, as fixed at construction.
    pub fn hashes(&self) -> RecordHashes {
        RecordHashes {
            persona_hash: self.persona.provenance_hash().to_string(),
            record_hash: self.provenance_hash.clone(),
        }
    }

    /// Recompute the record-level digest from the current field values.
    pub fn compute_hash(&self) -> String {
        hashing::provenance_digest(&self.to_value())
    }

    /// Whether the stored record hash matches its fields.
    pub fn verify_hash(&self) -> bool {
        let ok = self.compute_hash() == self.provenance_hash;
        if !ok {
            log::warn!(
                "identity record for agent {} failed provenance hash verification",
                self.arc.agent_id()
            );
        }
        ok
    }

    /// Verify both levels of the hash chain.
    pub fn verify_chain(&self) -> bool {
        self.persona.verify_hash() && self.verify_hash()
    }

    /// Commit record for this identity, asserted as verified.
    pub fn commit(&self) -> CommitRecord {
        CommitRecord::from_record(self)
    }

    /// Reconstruct from a structural dump. Expiry is checked against the wall clock.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        Self::from_value_with(value, &SchemaConfig::default())
    }

    /// Reconstruct from a structural dump, evaluating expiry per `config`.
    pub fn from_value_with(value: &Value, config: &SchemaConfig) -> Result<Self, ValidationError> {
        let mut v = Violations::new();
        let record = Self::read(value, config, &mut v).and_then(|b| b.assemble(config, &mut v));
        v.finish(MODEL, record)
    }

    fn read(
        value: &Value,
        config: &SchemaConfig,
        v: &mut Violations,
    ) -> Option<IdentityRecordBuilder> {
        let mut r = FieldReader::root(value, v)?;
        let raw_arc = r.object("arc");
        let raw_role = r.object("role");
        let raw_macp = r.object("macp");
        let raw_persona = r.object("persona");
        let policy_version = r.string("policy_version");
        let provenance_hash = r.string("provenance_hash");

        let arc = raw_arc.and_then(|raw| {
            v.scope("arc", |v| OriginRecord::read(raw, v).and_then(|b| b.assemble(v)))
        });
        let role = raw_role.and_then(|raw| {
            v.scope("role", |v| RoleEnvelope::read(raw, v).and_then(|b| b.assemble(v)))
        });
        let macp = raw_macp.and_then(|raw| {
            v.scope("macp", |v| {
                MemoryCredential::read(raw, v).and_then(|b| b.assemble(config, v))
            })
        });
        let persona = raw_persona.and_then(|raw| {
            v.scope("persona", |v| Persona::read(raw, v).and_then(|b| b.assemble(v)))
        });

        Some(IdentityRecordBuilder {
            arc,
            role,
            macp,
            persona,
            policy_version,
            provenance_hash,
        })
    }

    /// Parse and reconstruct from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        Self::from_json_with(json, &SchemaConfig::default())
    }

    /// Parse and reconstruct from JSON text, evaluating expiry per `config`.
    pub fn from_json_with(json: &str, config: &SchemaConfig) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| ValidationError::single(MODEL, "$", format!("invalid JSON: {}", e)))?;
        Self::from_value_with(&value, config)
    }

    /// Serialize to a structural dump.
    pub fn to_value(&self) -> Value {
        hashing::to_canonical_value(self)
    }

    /// Serialize to compact JSON text.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

impl TryFrom<Value> for IdentityRecord {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// Two-phase constructor for [`IdentityRecord`].
#[derive(Debug, Clone, Default)]
pub struct IdentityRecordBuilder {
    arc: Option<OriginRecord>,
    role: Option<RoleEnvelope>,
    macp: Option<MemoryCredential>,
    persona: Option<Persona>,
    policy_version: Option<String>,
    provenance_hash: Option<String>,
}

impl IdentityRecordBuilder {
    /// Set the origin record.
    pub fn arc(mut self, arc: OriginRecord) -> Self {
        self.arc = Some(arc);
        self
    }

    /// Set the role envelope.
    pub fn role(mut self, role: RoleEnvelope) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the memory credential.
    pub fn macp(mut self, macp: MemoryCredential) -> Self {
        self.macp = Some(macp);
        self
    }

    /// Set the persona.
    pub fn persona(mut self, persona: Persona) -> Self {
        self.persona = Some(persona);
        self
    }

    /// Set the policy version.
    pub fn policy_version(mut self, policy_version: impl Into<String>) -> Self {
        self.policy_version = Some(policy_version.into());
        self
    }

    /// Supply a precomputed record hash instead of deriving one.
    pub fn provenance_hash(mut self, hash: impl Into<String>) -> Self {
        self.provenance_hash = Some(hash.into());
        self
    }

    /// Validate every field and freeze the record.
    pub fn build(self) -> Result<IdentityRecord, ValidationError> {
        self.build_with(&SchemaConfig::default())
    }

    /// Validate against `config` and freeze the record.
    pub fn build_with(self, config: &SchemaConfig) -> Result<IdentityRecord, ValidationError> {
        let mut v = Violations::new();
        let record = self.assemble(config, &mut v);
        v.finish(MODEL, record)
    }

    fn assemble(self, config: &SchemaConfig, v: &mut Violations) -> Option<IdentityRecord> {
        let arc = v.require("arc", self.arc);
        let role = v.require("role", self.role);
        let macp = v.require("macp", self.macp);
        let persona = v.require("persona", self.persona);
        let policy_version = self
            .policy_version
            .unwrap_or_else(|| config.policy_version.clone());
        v.check_not_blank("policy_version", &policy_version);
        if !v.is_empty() {
            return None;
        }

        let mut record = IdentityRecord {
            arc: arc?,
            role: role?,
            macp: macp?,
            persona: persona?,
            policy_version,
            provenance_hash: String::new(),
        };
        record.provenance_hash = match self.provenance_hash {
            Some(hash) => {
                log::debug!(
                    "identity record {}: keeping supplied provenance hash",
                    record.arc.agent_id()
                );
                hash
            }
            None => {
                let hash = record.compute_hash();
                log::debug!(
                    "identity record {}: computed provenance hash {}",
                    record.arc.agent_id(),
                    &hash[..12]
                );
                hash
            }
        };
        Some(record)
    }
}

/// Pre-flight check of raw identity data.
///
/// Builds every sub-record and the composite, then discards the result.
/// Returns `(true, [])` on success, or `(false, errors)` with one
/// `"<field>: <reason>"` entry per violation.
pub fn validate(raw: &Value) -> (bool, Vec<String>) {
    validate_with(raw, &SchemaConfig::default())
}

/// [`validate`] with an explicit config.
pub fn validate_with(raw: &Value, config: &SchemaConfig) -> (bool, Vec<String>) {
    match IdentityRecord::from_value_with(raw, config) {
        Ok(_) => (true, Vec::new()),
        Err(err) => {
            log::debug!("identity record rejected with {} error(s)", err.errors.len());
            (false, err.messages())
        }
    }
}

/// Read both stored hashes of a built record. No recomputation.
pub fn extract_hashes(record: &IdentityRecord) -> RecordHashes {
    record.hashes()
}
