//! ARC: Agent Record Core.
//!
//! The origin record pins an agent's reasoning configuration: which engine and
//! model checkpoint it runs, the inference parameters, and who created it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::vocab::{Provider, ReasoningEngine};
use crate::errors::ValidationError;
use crate::validation::reader::kind;
use crate::validation::{timestamp, FieldReader, Violations};

const MODEL: &str = "OriginRecord";

pub const NAME_LEN: (usize, usize) = (3, 50);
pub const BASE_MODEL_LEN: (usize, usize) = (5, 100);
pub const CHECKPOINT_LEN: (usize, usize) = (8, 100);
pub const CONTEXT_WINDOW_RANGE: (i64, i64) = (1024, 128_000);
pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);
pub const MAX_TOKENS_RANGE: (i64, i64) = (1, 4096);

pub const DEFAULT_AGENT_CLASS: &str = "general";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_LICENSE_CLASS: &str = "tier3";
pub const DEFAULT_VERSION: &str = "1.0";

/// A reasoning parameter value. Limited to JSON primitives so the canonical
/// form stays well-defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`.
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    fn from_json(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(ParamValue::Null),
            Value::Bool(b) => Ok(ParamValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ParamValue::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(ParamValue::Unsigned(u))
                } else {
                    n.as_f64()
                        .map(ParamValue::Float)
                        .ok_or_else(|| format!("unrepresentable number {}", n))
                }
            }
            Value::String(s) => Ok(ParamValue::Text(s.clone())),
            other => Err(format!(
                "expected string, number, boolean or null, got {}",
                kind(other)
            )),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => ParamValue::Integer(i),
            Err(_) => ParamValue::Unsigned(value),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Reasoning configuration of an agent. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct OriginRecord {
    agent_id: String,
    arc_id: String,
    name: String,
    agent_name: String,
    agent_class: String,
    reasoning_engine: ReasoningEngine,
    base_model: String,
    checkpoint: String,
    reasoning_params: BTreeMap<String, ParamValue>,
    context_window: u32,
    temperature: f64,
    max_tokens: u32,
    provider: Provider,
    license_class: String,
    origin_signature: String,
    created_by: String,
    #[serde(with = "timestamp")]
    created_at: DateTime<Utc>,
    version: String,
}

impl OriginRecord {
    /// Start an empty builder.
    pub fn builder() -> OriginRecordBuilder {
        OriginRecordBuilder::default()
    }

    /// A builder pre-filled with this record's values.
    pub fn to_builder(&self) -> OriginRecordBuilder {
        OriginRecordBuilder {
            agent_id: Some(self.agent_id.clone()),
            arc_id: Some(self.arc_id.clone()),
            name: Some(self.name.clone()),
            agent_name: Some(self.agent_name.clone()),
            agent_class: Some(self.agent_class.clone()),
            reasoning_engine: Some(self.reasoning_engine),
            base_model: Some(self.base_model.clone()),
            checkpoint: Some(self.checkpoint.clone()),
            reasoning_params: Some(self.reasoning_params.clone()),
            context_window: Some(i64::from(self.context_window)),
            temperature: Some(self.temperature),
            max_tokens: Some(i64::from(self.max_tokens)),
            provider: Some(self.provider),
            license_class: Some(self.license_class.clone()),
            origin_signature: Some(self.origin_signature.clone()),
            created_by: Some(self.created_by.clone()),
            created_at: Some(self.created_at),
            version: Some(self.version.clone()),
        }
    }

    /// Get the agent identifier.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Get the origin record identifier.
    pub fn arc_id(&self) -> &str {
        &self.arc_id
    }

    /// Get the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the agent name.
    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    /// Get the agent classification.
    pub fn agent_class(&self) -> &str {
        &self.agent_class
    }

    /// Get the reasoning engine kind.
    pub fn reasoning_engine(&self) -> ReasoningEngine {
        self.reasoning_engine
    }

    /// Get the base model identifier.
    pub fn base_model(&self) -> &str {
        &self.base_model
    }

    /// Get the model checkpoint.
    pub fn checkpoint(&self) -> &str {
        &self.checkpoint
    }

    /// Get the reasoning parameters.
    pub fn reasoning_params(&self) -> &BTreeMap<String, ParamValue> {
        &self.reasoning_params
    }

    /// Get the context window size in tokens.
    pub fn context_window(&self) -> u32 {
        self.context_window
    }

    /// Get the sampling temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Get the output token limit.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Get the model provider.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Get the license tier.
    pub fn license_class(&self) -> &str {
        &self.license_class
    }

    /// Opaque origin signature. Carried through, never verified.
    pub fn origin_signature(&self) -> &str {
        &self.origin_signature
    }

    /// Get the creator identity.
    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    /// Get the creation timestamp.
    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    /// Get the version tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Read raw fields into a builder, reporting type errors under the current scope.
    pub(crate) fn read(value: &Value, v: &mut Violations) -> Option<OriginRecordBuilder> {
        let mut r = FieldReader::root(value, v)?;
        let reasoning_params = read_params(&mut r);
        let builder = OriginRecordBuilder {
            agent_id: r.string("agent_id"),
            arc_id: r.string("arc_id"),
            name: r.string("name"),
            agent_name: r.string("agent_name"),
            agent_class: r.string("agent_class"),
            reasoning_engine: r.token("reasoning_engine"),
            base_model: r.string("base_model"),
            checkpoint: r.string("checkpoint"),
            reasoning_params,
            context_window: r.integer("context_window"),
            temperature: r.float("temperature"),
            max_tokens: r.integer("max_tokens"),
            provider: r.token("provider"),
            license_class: r.string("license_class"),
            origin_signature: r.string("origin_signature"),
            created_by: r.string("created_by"),
            created_at: r.datetime("created_at"),
            version: r.string("version"),
        };
        Some(builder)
    }

    /// Reconstruct from a structural dump.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let mut v = Violations::new();
        let record = Self::read(value, &mut v).and_then(|b| b.assemble(&mut v));
        v.finish(MODEL, record)
    }

    /// Serialize to a structural dump.
    pub fn to_value(&self) -> Value {
        crate::hashing::to_canonical_value(self)
    }
}

impl TryFrom<Value> for OriginRecord {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

fn read_params(r: &mut FieldReader<'_, '_>) -> Option<BTreeMap<String, ParamValue>> {
    let Value::Object(map) = r.object("reasoning_params")? else {
        return None;
    };
    let mut params = BTreeMap::new();
    let mut ok = true;
    for (key, value) in map {
        match ParamValue::from_json(value) {
            Ok(param) => {
                params.insert(key.clone(), param);
            }
            Err(reason) => {
                r.violations()
                    .push(&format!("reasoning_params.{}", key), reason);
                ok = false;
            }
        }
    }
    ok.then_some(params)
}

/// Two-phase constructor for [`OriginRecord`].
#[derive(Debug, Clone, Default)]
pub struct OriginRecordBuilder {
    agent_id: Option<String>,
    arc_id: Option<String>,
    name: Option<String>,
    agent_name: Option<String>,
    agent_class: Option<String>,
    reasoning_engine: Option<ReasoningEngine>,
    base_model: Option<String>,
    checkpoint: Option<String>,
    reasoning_params: Option<BTreeMap<String, ParamValue>>,
    context_window: Option<i64>,
    temperature: Option<f64>,
    max_tokens: Option<i64>,
    provider: Option<Provider>,
    license_class: Option<String>,
    origin_signature: Option<String>,
    created_by: Option<String>,
    created_at: Option<DateTime<Utc>>,
    version: Option<String>,
}

impl OriginRecordBuilder {
    /// Set the agent identifier.
    pub fn agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Set the origin record identifier.
    pub fn arc_id(mut self, arc_id: impl Into<String>) -> Self {
        self.arc_id = Some(arc_id.into());
        self
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the agent name.
    pub fn agent_name(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = Some(agent_name.into());
        self
    }

    /// Set the agent classification.
    pub fn agent_class(mut self, agent_class: impl Into<String>) -> Self {
        self.agent_class = Some(agent_class.into());
        self
    }

    /// Set the reasoning engine kind.
    pub fn reasoning_engine(mut self, engine: ReasoningEngine) -> Self {
        self.reasoning_engine = Some(engine);
        self
    }

    /// Set the base model identifier.
    pub fn base_model(mut self, base_model: impl Into<String>) -> Self {
        self.base_model = Some(base_model.into());
        self
    }

    /// Set the model checkpoint.
    pub fn checkpoint(mut self, checkpoint: impl Into<String>) -> Self {
        self.checkpoint = Some(checkpoint.into());
        self
    }

    /// Replace the whole parameter map.
    pub fn reasoning_params(mut self, params: BTreeMap<String, ParamValue>) -> Self {
        self.reasoning_params = Some(params);
        self
    }

    /// Add one parameter.
    pub fn reasoning_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.reasoning_params
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the context window size in tokens.
    pub fn context_window(mut self, tokens: u32) -> Self {
        self.context_window = Some(i64::from(tokens));
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the output token limit.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(i64::from(tokens));
        self
    }

    /// Set the model provider.
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the license tier.
    pub fn license_class(mut self, license_class: impl Into<String>) -> Self {
        self.license_class = Some(license_class.into());
        self
    }

    /// Set the origin signature.
    pub fn origin_signature(mut self, signature: impl Into<String>) -> Self {
        self.origin_signature = Some(signature.into());
        self
    }

    /// Set the creator identity.
    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// Set the creation timestamp.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Set the version tag.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Validate every field and freeze the record.
    pub fn build(self) -> Result<OriginRecord, ValidationError> {
        let mut v = Violations::new();
        let record = self.assemble(&mut v);
        v.finish(MODEL, record)
    }

    pub(crate) fn assemble(self, v: &mut Violations) -> Option<OriginRecord> {
        let agent_id = self.agent_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        v.check_not_blank("agent_id", &agent_id);
        let arc_id = self
            .arc_id
            .unwrap_or_else(|| format!("arc-{}", &Uuid::new_v4().simple().to_string()[..8]));
        v.check_not_blank("arc_id", &arc_id);

        let name = v.require("name", self.name);
        if let Some(name) = &name {
            v.check_len("name", name, NAME_LEN.0, NAME_LEN.1);
        }
        let agent_name = v.require("agent_name", self.agent_name);
        if let Some(agent_name) = &agent_name {
            v.check_len("agent_name", agent_name, NAME_LEN.0, NAME_LEN.1);
        }
        let reasoning_engine = v.require("reasoning_engine", self.reasoning_engine);
        let base_model = v.require("base_model", self.base_model);
        if let Some(base_model) = &base_model {
            v.check_len("base_model", base_model, BASE_MODEL_LEN.0, BASE_MODEL_LEN.1);
        }
        let checkpoint = v.require("checkpoint", self.checkpoint);
        if let Some(checkpoint) = &checkpoint {
            v.check_len("checkpoint", checkpoint, CHECKPOINT_LEN.0, CHECKPOINT_LEN.1);
        }
        let reasoning_params = v.require("reasoning_params", self.reasoning_params);
        if let Some(params) = &reasoning_params {
            for (key, value) in params {
                if let ParamValue::Float(f) = value {
                    if !f.is_finite() {
                        v.push(
                            &format!("reasoning_params.{}", key),
                            format!("must be a finite number, got {}", f),
                        );
                    }
                }
            }
        }
        let context_window = v.require("context_window", self.context_window);
        if let Some(n) = context_window {
            v.check_int_range("context_window", n, CONTEXT_WINDOW_RANGE.0, CONTEXT_WINDOW_RANGE.1);
        }
        let temperature = self.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        v.check_range("temperature", temperature, TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1);
        let max_tokens = self.max_tokens.unwrap_or(i64::from(DEFAULT_MAX_TOKENS));
        v.check_int_range("max_tokens", max_tokens, MAX_TOKENS_RANGE.0, MAX_TOKENS_RANGE.1);
        let provider = v.require("provider", self.provider);
        let created_by = v.require("created_by", self.created_by);
        if let Some(created_by) = &created_by {
            v.check_not_blank("created_by", created_by);
        }

        // range checks above guarantee the narrowing below
        Some(OriginRecord {
            agent_id,
            arc_id,
            name: name?,
            agent_name: agent_name?,
            agent_class: self
                .agent_class
                .unwrap_or_else(|| DEFAULT_AGENT_CLASS.to_string()),
            reasoning_engine: reasoning_engine?,
            base_model: base_model?,
            checkpoint: checkpoint?,
            reasoning_params: reasoning_params?,
            context_window: u32::try_from(context_window?).ok()?,
            temperature,
            max_tokens: u32::try_from(max_tokens).ok()?,
            provider: provider?,
            license_class: self
                .license_class
                .unwrap_or_else(|| DEFAULT_LICENSE_CLASS.to_string()),
            origin_signature: self.origin_signature.unwrap_or_default(),
            created_by: created_by?,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            version: self.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_origin() -> OriginRecordBuilder {
        OriginRecord::builder()
            .name("ProductionAgent")
            .agent_name("ProductionAgent")
            .reasoning_engine(ReasoningEngine::Llm)
            .base_model("claude-3-opus-20240229")
            .checkpoint("prod-checkpoint-v2.1")
            .reasoning_param("temperature", 0.7)
            .reasoning_param("top_p", 0.9)
            .reasoning_param("max_thinking_time", 30i64)
            .context_window(100_000)
            .temperature(0.7)
            .max_tokens(4096)
            .provider(Provider::Anthropic)
            .created_by("system-admin")
    }

    #[test]
    fn test_build_applies_defaults() {
        let origin = sample_origin().build().unwrap();
        assert_eq!(origin.agent_class(), "general");
        assert_eq!(origin.license_class(), "tier3");
        assert_eq!(origin.origin_signature(), "");
        assert_eq!(origin.version(), "1.0");
        assert!(origin.arc_id().starts_with("arc-"));
        assert_eq!(origin.arc_id().len(), 12);
        assert!(Uuid::parse_str(origin.agent_id()).is_ok());
    }

    #[test]
    fn test_missing_required_fields_are_all_reported() {
        let err = OriginRecord::builder().name("X").build().unwrap_err();
        assert!(err.has_field("name"));
        for field in [
            "agent_name",
            "reasoning_engine",
            "base_model",
            "checkpoint",
            "reasoning_params",
            "context_window",
            "provider",
            "created_by",
        ] {
            assert!(err.has_field(field), "missing report for {}", field);
        }
    }

    #[test]
    fn test_numeric_bounds() {
        let err = sample_origin()
            .context_window(512)
            .temperature(2.5)
            .max_tokens(0)
            .build()
            .unwrap_err();
        assert!(err.has_field("context_window"));
        assert!(err.has_field("temperature"));
        assert!(err.has_field("max_tokens"));

        assert!(sample_origin().context_window(1024).temperature(0.0).build().is_ok());
        assert!(sample_origin().context_window(128_000).temperature(2.0).build().is_ok());
    }

    #[test]
    fn test_length_bounds() {
        let err = sample_origin()
            .agent_name("x".repeat(51))
            .base_model("gpt")
            .checkpoint("short")
            .build()
            .unwrap_err();
        assert!(err.has_field("agent_name"));
        assert!(err.has_field("base_model"));
        assert!(err.has_field("checkpoint"));
    }

    #[test]
    fn test_non_finite_param_rejected() {
        let err = sample_origin()
            .reasoning_param("decay", f64::INFINITY)
            .build()
            .unwrap_err();
        assert!(err.has_field("reasoning_params.decay"));
    }

    #[test]
    fn test_from_value_rejects_unknown_tokens_and_nested_params() {
        let err = OriginRecord::from_value(&json!({
            "name": "ValidAgent",
            "agent_name": "ValidAgent",
            "reasoning_engine": "quantum",
            "base_model": "claude-3-opus",
            "checkpoint": "checkpoint-v1.0",
            "reasoning_params": {"nested": {"a": 1}},
            "context_window": 8192,
            "provider": "acme",
            "created_by": "test"
        }))
        .unwrap_err();
        assert!(err.has_field("reasoning_engine"));
        assert!(err.has_field("provider"));
        assert!(err.has_field("reasoning_params.nested"));
        assert_eq!(err.errors.len(), 3);
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let origin = sample_origin().origin_signature("sig:abc").build().unwrap();
        let dumped = origin.to_value();
        assert_eq!(dumped["reasoning_engine"], "llm");
        assert_eq!(dumped["reasoning_params"]["max_thinking_time"], 30);
        let back = OriginRecord::from_value(&dumped).unwrap();
        assert_eq!(origin, back);
        assert_eq!(back.to_value(), dumped);
    }

    #[test]
    fn test_large_unsigned_param_keeps_its_value() {
        let mut dumped = sample_origin().build().unwrap().to_value();
        dumped["reasoning_params"]["seed"] = json!(u64::MAX);
        let origin = OriginRecord::from_value(&dumped).unwrap();
        assert_eq!(
            origin.reasoning_params()["seed"],
            ParamValue::Unsigned(u64::MAX)
        );
        assert_eq!(origin.to_value()["reasoning_params"]["seed"], json!(u64::MAX));
        assert_eq!(origin.to_value(), dumped);

        let serde_back: OriginRecord = serde_json::from_value(dumped.clone()).unwrap();
        assert_eq!(serde_back, origin);
        assert_eq!(ParamValue::from(7u64), ParamValue::Integer(7));
        assert_eq!(ParamValue::from(u64::MAX), ParamValue::Unsigned(u64::MAX));
    }

    #[test]
    fn test_non_object_params_reported_at_the_key() {
        let mut dumped = sample_origin().build().unwrap().to_value();
        dumped["reasoning_params"] = json!([1, 2]);
        let err = OriginRecord::from_value(&dumped).unwrap_err();
        assert_eq!(err.messages(), vec!["reasoning_params: expected object, got list"]);
    }

    #[test]
    fn test_to_builder_keeps_identity() {
        let origin = sample_origin().build().unwrap();
        let bumped = origin.to_builder().version("1.1").build().unwrap();
        assert_eq!(bumped.agent_id(), origin.agent_id());
        assert_eq!(bumped.arc_id(), origin.arc_id());
        assert_eq!(bumped.version(), "1.1");
    }
}
