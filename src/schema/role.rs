//! ROLE: Resource Operations License Envelope.
//!
//! Declares where an agent may operate (`role_scope`), what it may do there
//! (`permissions`), in which behavioural contexts it reacts (`reflex_scope`)
//! and how much it is trusted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::vocab::{GovernanceLevel, Permission};
use crate::errors::ValidationError;
use crate::validation::{FieldReader, Violations};

const MODEL: &str = "RoleEnvelope";

pub const DEFAULT_VERSION: u32 = 1;

/// Permission envelope of an agent. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct RoleEnvelope {
    role_scope: Vec<String>,
    permissions: BTreeSet<Permission>,
    reflex_scope: Vec<String>,
    trust_vector: f64,
    governance_level: GovernanceLevel,
    memory_refs: Vec<String>,
    version: u32,
}

impl RoleEnvelope {
    /// Start an empty builder.
    pub fn builder() -> RoleEnvelopeBuilder {
        RoleEnvelopeBuilder::default()
    }

    /// A builder pre-filled with this record's values.
    pub fn to_builder(&self) -> RoleEnvelopeBuilder {
        RoleEnvelopeBuilder {
            role_scope: Some(self.role_scope.clone()),
            permissions: Some(self.permissions.iter().copied().collect()),
            reflex_scope: Some(self.reflex_scope.clone()),
            trust_vector: Some(self.trust_vector),
            governance_level: Some(self.governance_level),
            memory_refs: Some(self.memory_refs.clone()),
            version: Some(self.version),
        }
    }

    /// Namespaces the agent may operate within, in declared order.
    pub fn role_scope(&self) -> &[String] {
        &self.role_scope
    }

    /// Get the granted permissions.
    pub fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    /// Whether `permission` is granted.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Get the reflex scope.
    pub fn reflex_scope(&self) -> &[String] {
        &self.reflex_scope
    }

    /// Get the trust level.
    pub fn trust_vector(&self) -> f64 {
        self.trust_vector
    }

    /// Get the governance tier.
    pub fn governance_level(&self) -> GovernanceLevel {
        self.governance_level
    }

    /// Get the memory references.
    pub fn memory_refs(&self) -> &[String] {
        &self.memory_refs
    }

    /// Get the version tag.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub(crate) fn read(value: &Value, v: &mut Violations) -> Option<RoleEnvelopeBuilder> {
        let mut r = FieldReader::root(value, v)?;
        Some(RoleEnvelopeBuilder {
            role_scope: r.string_list("role_scope"),
            permissions: r.token_list("permissions"),
            reflex_scope: r.string_list("reflex_scope"),
            trust_vector: r.float("trust_vector"),
            governance_level: r.token("governance_level"),
            memory_refs: r.string_list("memory_refs"),
            version: r.unsigned("version"),
        })
    }

    /// Reconstruct from a structural dump.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let mut v = Violations::new();
        let role = Self::read(value, &mut v).and_then(|b| b.assemble(&mut v));
        v.finish(MODEL, role)
    }

    /// Serialize to a structural dump.
    pub fn to_value(&self) -> Value {
        crate::hashing::to_canonical_value(self)
    }
}

impl TryFrom<Value> for RoleEnvelope {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// Two-phase constructor for [`RoleEnvelope`].
#[derive(Debug, Clone, Default)]
pub struct RoleEnvelopeBuilder {
    role_scope: Option<Vec<String>>,
    permissions: Option<Vec<Permission>>,
    reflex_scope: Option<Vec<String>>,
    trust_vector: Option<f64>,
    governance_level: Option<GovernanceLevel>,
    memory_refs: Option<Vec<String>>,
    version: Option<u32>,
}

impl RoleEnvelopeBuilder {
    /// Set the role scope.
    pub fn role_scope<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_scope = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Set the granted permissions.
    pub fn permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions = Some(permissions.into_iter().collect());
        self
    }

    /// Set the reflex scope.
    pub fn reflex_scope<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reflex_scope = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Set the trust level.
    pub fn trust_vector(mut self, trust: f64) -> Self {
        self.trust_vector = Some(trust);
        self
    }

    /// Set the governance tier.
    pub fn governance_level(mut self, level: GovernanceLevel) -> Self {
        self.governance_level = Some(level);
        self
    }

    /// Set the memory references.
    pub fn memory_refs<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.memory_refs = Some(refs.into_iter().map(Into::into).collect());
        self
    }

    /// Set the version tag.
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Validate every field and freeze the record.
    pub fn build(self) -> Result<RoleEnvelope, ValidationError> {
        let mut v = Violations::new();
        let role = self.assemble(&mut v);
        v.finish(MODEL, role)
    }

    pub(crate) fn assemble(self, v: &mut Violations) -> Option<RoleEnvelope> {
        let role_scope = v.require("role_scope", self.role_scope);
        if let Some(scopes) = &role_scope {
            v.check_non_empty("role_scope", scopes);
            v.check_unique("role_scope", scopes);
            for (i, scope) in scopes.iter().enumerate() {
                v.check_not_blank(&format!("role_scope[{}]", i), scope);
            }
        }
        let permissions = v.require("permissions", self.permissions);
        let reflex_scope = v.require("reflex_scope", self.reflex_scope);
        let trust_vector = v.require("trust_vector", self.trust_vector);
        if let Some(trust) = trust_vector {
            v.check_range("trust_vector", trust, 0.0, 1.0);
        }

        Some(RoleEnvelope {
            role_scope: role_scope?,
            permissions: permissions?.into_iter().collect(),
            reflex_scope: reflex_scope?,
            trust_vector: trust_vector?,
            governance_level: self.governance_level.unwrap_or_default(),
            memory_refs: self.memory_refs.unwrap_or_default(),
            version: self.version.unwrap_or(DEFAULT_VERSION),
        })
    }
}
