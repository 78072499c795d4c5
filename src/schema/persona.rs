//! PERSONA: temperament and moral accent.
//!
//! A persona carries its own provenance hash: the digest of every other field,
//! computed once when the record is frozen. A hash supplied by the caller (for
//! example when reconstructing a stored record) is kept as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::tone::ToneVector;
use super::vocab::{MoralAccent, Temperament};
use crate::errors::ValidationError;
use crate::hashing;
use crate::validation::{timestamp, FieldReader, Violations};

const MODEL: &str = "Persona";

pub const NAME_LEN: (usize, usize) = (3, 40);
pub const DEFAULT_TRUST_SEED: f64 = 0.95;
pub const DEFAULT_VERSION: &str = "1.0";

/// Personality and ethical framing of an agent. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Persona {
    persona_id: String,
    name: String,
    temperament_profile: Temperament,
    moral_accent: MoralAccent,
    tone_vector: ToneVector,
    alignment_directives: Vec<String>,
    embedding_ref: Option<String>,
    trust_seed: f64,
    created_by: String,
    #[serde(with = "timestamp")]
    created_at: DateTime<Utc>,
    version: String,
    provenance_hash: String,
}

impl Persona {
    /// Start an empty builder.
    pub fn builder() -> PersonaBuilder {
        PersonaBuilder::default()
    }

    /// A builder pre-filled with this persona's fields, minus the hash.
    ///
    /// Building it yields a persona with a freshly computed hash.
    pub fn to_builder(&self) -> PersonaBuilder {
        PersonaBuilder {
            persona_id: Some(self.persona_id.clone()),
            name: Some(self.name.clone()),
            temperament_profile: Some(self.temperament_profile),
            moral_accent: Some(self.moral_accent),
            tone_vector: Some(self.tone_vector),
            alignment_directives: Some(self.alignment_directives.clone()),
            embedding_ref: self.embedding_ref.clone(),
            trust_seed: Some(self.trust_seed),
            created_by: Some(self.created_by.clone()),
            created_at: Some(self.created_at),
            version: Some(self.version.clone()),
            provenance_hash: None,
        }
    }

    /// Get the persona identifier.
    pub fn persona_id(&self) -> &str {
        &self.persona_id
    }

    /// Get the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the temperament profile.
    pub fn temperament_profile(&self) -> Temperament {
        self.temperament_profile
    }

    /// Get the moral accent.
    pub fn moral_accent(&self) -> MoralAccent {
        self.moral_accent
    }

    /// Get the tone vector.
    pub fn tone_vector(&self) -> &ToneVector {
        &self.tone_vector
    }

    /// Get the alignment directives.
    pub fn alignment_directives(&self) -> &[String] {
        &self.alignment_directives
    }

    /// Get the embedding reference.
    pub fn embedding_ref(&self) -> Option<&str> {
        self.embedding_ref.as_deref()
    }

    /// Get the trust seed.
    pub fn trust_seed(&self) -> f64 {
        self.trust_seed
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

    /// Hash fixed at construction time.
    pub fn provenance_hash(&self) -> &str {
        &self.provenance_hash
    }

    /// Recompute the digest from the current field values.
    pub fn compute_hash(&self) -> String {
        hashing::provenance_digest(&self.to_value())
    }

    /// Whether the stored hash still matches the fields.
    pub fn verify_hash(&self) -> bool {
        let ok = self.compute_hash() == self.provenance_hash;
        if !ok {
            log::warn!("persona {} failed provenance hash verification", self.persona_id);
        }
        ok
    }

    pub(crate) fn read(value: &Value, v: &mut Violations) -> Option<PersonaBuilder> {
        let mut r = FieldReader::root(value, v)?;
        let persona_id = r.string("persona_id");
        let name = r.string("name");
        let temperament_profile = r.token("temperament_profile");
        let moral_accent = r.token("moral_accent");
        let raw_tone = r.object("tone_vector");
        let alignment_directives = r.string_list("alignment_directives");
        let embedding_ref = r.string("embedding_ref");
        let trust_seed = r.float("trust_seed");
        let created_by = r.string("created_by");
        let created_at = r.datetime("created_at");
        let version = r.string("version");
        let provenance_hash = r.string("provenance_hash");

        let tone_vector = raw_tone.and_then(|raw| v.scope("tone_vector", |v| ToneVector::read(raw, v)));

        Some(PersonaBuilder {
            persona_id,
            name,
            temperament_profile,
            moral_accent,
            tone_vector,
            alignment_directives,
            embedding_ref,
            trust_seed,
            created_by,
            created_at,
            version,
            provenance_hash,
        })
    }

    /// Reconstruct from a structural dump. A present `provenance_hash` is kept.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let mut v = Violations::new();
        let persona = Self::read(value, &mut v).and_then(|b| b.assemble(&mut v));
        v.finish(MODEL, persona)
    }

    /// Serialize to a structural dump.
    pub fn to_value(&self) -> Value {
        hashing::to_canonical_value(self)
    }
}

impl TryFrom<Value> for Persona {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// Two-phase constructor for [`Persona`]: validate, then hash, then freeze.
#[derive(Debug, Clone, Default)]
pub struct PersonaBuilder {
    persona_id: Option<String>,
    name: Option<String>,
    temperament_profile: Option<Temperament>,
    moral_accent: Option<MoralAccent>,
    tone_vector: Option<ToneVector>,
    alignment_directives: Option<Vec<String>>,
    embedding_ref: Option<String>,
    trust_seed: Option<f64>,
    created_by: Option<String>,
    created_at: Option<DateTime<Utc>>,
    version: Option<String>,
    provenance_hash: Option<String>,
}

impl PersonaBuilder {
    /// Set the persona identifier.
    pub fn persona_id(mut self, id: impl Into<String>) -> Self {
        self.persona_id = Some(id.into());
        self
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the temperament profile.
    pub fn temperament_profile(mut self, temperament: Temperament) -> Self {
        self.temperament_profile = Some(temperament);
        self
    }

    /// Set the moral accent.
    pub fn moral_accent(mut self, accent: MoralAccent) -> Self {
        self.moral_accent = Some(accent);
        self
    }

    /// Set the tone vector.
    pub fn tone_vector(mut self, tone: ToneVector) -> Self {
        self.tone_vector = Some(tone);
        self
    }

    /// Set the alignment directives.
    pub fn alignment_directives<I, S>(mut self, directives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alignment_directives = Some(directives.into_iter().map(Into::into).collect());
        self
    }

    /// Set the embedding reference.
    pub fn embedding_ref(mut self, embedding_ref: impl Into<String>) -> Self {
        self.embedding_ref = Some(embedding_ref.into());
        self
    }

    /// Set the trust seed.
    pub fn trust_seed(mut self, trust_seed: f64) -> Self {
        self.trust_seed = Some(trust_seed);
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

    /// Supply a precomputed hash instead of deriving one.
    pub fn provenance_hash(mut self, hash: impl Into<String>) -> Self {
        self.provenance_hash = Some(hash.into());
        self
    }

    /// Validate every field and freeze the record.
    pub fn build(self) -> Result<Persona, ValidationError> {
        let mut v = Violations::new();
        let persona = self.assemble(&mut v);
        v.finish(MODEL, persona)
    }

    pub(crate) fn assemble(self, v: &mut Violations) -> Option<Persona> {
        let reported = v.len();
        let persona_id = self
            .persona_id
            .unwrap_or_else(|| format!("persona-{}", &Uuid::new_v4().simple().to_string()[..8]));
        v.check_not_blank("persona_id", &persona_id);
        let name = v.require("name", self.name);
        if let Some(name) = &name {
            v.check_len("name", name, NAME_LEN.0, NAME_LEN.1);
        }
        let temperament_profile = v.require("temperament_profile", self.temperament_profile);
        let moral_accent = v.require("moral_accent", self.moral_accent);
        let tone_vector = v.require("tone_vector", self.tone_vector);
        let alignment_directives = v.require("alignment_directives", self.alignment_directives);
        if let Some(directives) = &alignment_directives {
            v.check_non_empty("alignment_directives", directives);
        }
        let trust_seed = self.trust_seed.unwrap_or(DEFAULT_TRUST_SEED);
        v.check_range("trust_seed", trust_seed, 0.0, 1.0);
        let created_by = v.require("created_by", self.created_by);
        if let Some(created_by) = &created_by {
            v.check_not_blank("created_by", created_by);
        }
        // no hash for a persona that is about to be rejected
        if v.len() > reported {
            return None;
        }

        let mut persona = Persona {
            persona_id,
            name: name?,
            temperament_profile: temperament_profile?,
            moral_accent: moral_accent?,
            tone_vector: tone_vector?,
            alignment_directives: alignment_directives?,
            embedding_ref: self.embedding_ref,
            trust_seed,
            created_by: created_by?,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            version: self.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            provenance_hash: String::new(),
        };
        persona.provenance_hash = match self.provenance_hash {
            Some(hash) => {
                log::debug!("persona {}: keeping supplied provenance hash", persona.persona_id);
                hash
            }
            None => {
                let hash = persona.compute_hash();
                log::debug!("persona {}: computed provenance hash {}", persona.persona_id, &hash[..12]);
                hash
            }
        };
        Some(persona)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    pub(crate) fn sample_persona() -> PersonaBuilder {
        Persona::builder()
            .name("Strategic Analytics Specialist")
            .temperament_profile(Temperament::Strategic)
            .moral_accent(MoralAccent::Utilitarian)
            .tone_vector(ToneVector::new(0.8, 0.6, 0.3, 0.7).unwrap())
            .alignment_directives([
                "Prioritize data accuracy",
                "Maintain user privacy",
                "Optimize for efficiency",
            ])
            .created_by("system-admin")
    }

    fn pinned() -> PersonaBuilder {
        sample_persona()
            .persona_id("persona-0001")
            .created_at(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap())
    }

    #[test]
    fn test_hash_is_computed_at_build() {
        let persona = sample_persona().build().unwrap();
        assert!(hashing::is_digest(persona.provenance_hash()));
        assert!(persona.verify_hash());
        assert!(persona.persona_id().starts_with("persona-"));
        assert_eq!(persona.trust_seed(), 0.95);
        assert_eq!(persona.version(), "1.0");
    }

    #[test]
    fn test_hash_is_deterministic() {
        let a = pinned().build().unwrap();
        let b = pinned().build().unwrap();
        assert_eq!(a.provenance_hash(), b.provenance_hash());
    }

    #[test]
    fn test_single_field_change_changes_hash() {
        let base = pinned().build().unwrap();
        let variants = vec![
            pinned().name("Strategic Analytics Expert"),
            pinned().temperament_profile(Temperament::Stoic),
            pinned().moral_accent(MoralAccent::Virtue),
            pinned().tone_vector(ToneVector::new(0.8, 0.6, 0.3, 0.71).unwrap()),
            pinned().alignment_directives(["Prioritize data accuracy"]),
            pinned().embedding_ref("vec://persona/1"),
            pinned().trust_seed(0.9),
            pinned().created_by("someone-else"),
            pinned().created_at(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 1).unwrap()),
            pinned().version("1.1"),
            pinned().persona_id("persona-0002"),
        ];
        for builder in variants {
            let changed = builder.build().unwrap();
            assert_ne!(changed.provenance_hash(), base.provenance_hash());
        }
    }

    #[test]
    fn test_supplied_hash_is_kept() {
        let persona = sample_persona().provenance_hash("f".repeat(64)).build().unwrap();
        assert_eq!(persona.provenance_hash(), "f".repeat(64));
        assert!(!persona.verify_hash());
    }

    #[test]
    fn test_to_builder_rehashes() {
        let persona = pinned().build().unwrap();
        let updated = persona.to_builder().version("2.0").build().unwrap();
        assert_ne!(updated.provenance_hash(), persona.provenance_hash());
        assert!(updated.verify_hash());
        let unchanged = persona.to_builder().build().unwrap();
        assert_eq!(unchanged.provenance_hash(), persona.provenance_hash());
    }

    #[test]
    fn test_validation_errors() {
        let err = Persona::builder()
            .name("AB")
            .trust_seed(1.2)
            .alignment_directives(Vec::<String>::new())
            .build()
            .unwrap_err();
        for field in [
            "name",
            "trust_seed",
            "alignment_directives",
            "temperament_profile",
            "moral_accent",
            "tone_vector",
            "created_by",
        ] {
            assert!(err.has_field(field), "missing report for {}", field);
        }
    }

    #[test]
    fn test_from_value_reports_nested_tone_errors() {
        let err = Persona::from_value(&json!({
            "name": "TestPersona",
            "temperament_profile": "analytic",
            "moral_accent": "reflexic",
            "tone_vector": {"direct": 1.5, "warm": 0.5, "humorous": 0.5},
            "alignment_directives": ["test"],
            "created_by": "test"
        }))
        .unwrap_err();
        assert!(err.has_field("tone_vector.direct"));
        assert!(err.has_field("tone_vector.formal"));
        assert!(!err.has_field("tone_vector"));
    }

    #[test]
    fn test_round_trip_preserves_hash() {
        let persona = sample_persona().embedding_ref("vec://p/7").build().unwrap();
        let dumped = persona.to_value();
        assert_eq!(dumped["provenance_hash"], persona.provenance_hash());
        let back = Persona::from_value(&dumped).unwrap();
        assert_eq!(back, persona);
        assert!(back.verify_hash());
    }

    #[test]
    fn test_tampered_dump_keeps_stale_hash() {
        let persona = sample_persona().build().unwrap();
        let mut dumped = persona.to_value();
        dumped["name"] = json!("Tampered Persona");
        let back = Persona::from_value(&dumped).unwrap();
        assert_eq!(back.provenance_hash(), persona.provenance_hash());
        assert!(!back.verify_hash());
    }
}
