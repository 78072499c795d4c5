//! Record types of the identity schema.
//!
//! - [`origin`]: ARC, the agent's origin and build parameters
//! - [`role`]: ROLE, the permission envelope
//! - [`credential`]: MACP, the memory access credential
//! - [`persona`]: PERSONA, temperament and moral accent, self-hashed
//! - [`record`]: the unified identity record and its second-level hash
//! - [`commit`]: hash pairs handed to a ledger

pub mod commit;
pub mod credential;
pub mod origin;
pub mod persona;
pub mod record;
pub mod role;
pub mod tone;
pub mod vocab;

pub use commit::CommitRecord;
pub use credential::{MemoryCredential, MemoryCredentialBuilder};
pub use origin::{OriginRecord, OriginRecordBuilder, ParamValue};
pub use persona::{Persona, PersonaBuilder};
pub use record::{
    extract_hashes, validate, validate_with, IdentityRecord, IdentityRecordBuilder, RecordHashes,
};
pub use role::{RoleEnvelope, RoleEnvelopeBuilder};
pub use tone::ToneVector;
pub use vocab::{
    GovernanceLevel, MemoryScope, MoralAccent, Permission, Provider, ReasoningEngine, Temperament,
};
