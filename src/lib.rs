//! # RAIR - Reflexic Agent Identity Record
//!
//! Typed, validated identity records for AI agents, version 2.0.
//!
//! An identity is composed of four sub-records (ARC, ROLE, MACP and PERSONA)
//! sealed by a two-level SHA-256 provenance chain: the persona hashes itself,
//! and the unified record hashes everything including the persona hash.
//!
//! ```no_run
//! use rair::{validate, IdentityRecord};
//! use serde_json::json;
//!
//! let raw = json!({"arc": {"name": "X"}});
//! let (ok, errors) = validate(&raw);
//! assert!(!ok);
//! for error in errors {
//!     println!("{}", error);
//! }
//! # let _ = IdentityRecord::from_value(&raw);
//! ```

use serde::{Deserialize, Serialize};

pub mod config;
pub mod errors;
pub mod hashing;
pub mod schema;
pub mod validation;

pub use config::SchemaConfig;
pub use errors::{FieldError, ValidationError};
pub use schema::{
    extract_hashes, validate, validate_with, CommitRecord, GovernanceLevel, IdentityRecord,
    IdentityRecordBuilder, MemoryCredential, MemoryScope, MoralAccent, OriginRecord, ParamValue,
    Permission, Persona, Provider, ReasoningEngine, RecordHashes, RoleEnvelope, Temperament,
    ToneVector,
};

/// Package version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema revision, also the default policy version of new records.
pub const SCHEMA_VERSION: &str = "v2.0";

/// Sub-record kinds making up an identity, in composition order.
pub const SCHEMA_COMPONENTS: [&str; 4] = ["ARC", "ROLE", "MACP", "PERSONA"];

const LICENSE: &str = "FRAND/SEP";
const FOUNDATION: &str = "Seldon Reflex Foundation";

/// Static description of this schema release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub package_version: String,
    pub schema_version: String,
    pub components: Vec<String>,
    pub license: String,
    pub foundation: String,
}

/// Describe this schema release.
pub fn schema_info() -> SchemaInfo {
    SchemaInfo {
        package_version: VERSION.to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        components: SCHEMA_COMPONENTS.iter().map(|c| c.to_string()).collect(),
        license: LICENSE.to_string(),
        foundation: FOUNDATION.to_string(),
    }
}
