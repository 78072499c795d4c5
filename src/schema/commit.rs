//! Commit records: the pair of hashes an identity was sealed with.
//!
//! A commit record is a plain carrier. `verified` is asserted by whoever
//! creates it; nothing here checks it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{IdentityRecord, RecordHashes};
use crate::validation::timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub agent_id: String,
    pub persona_hash: String,
    pub record_hash: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_verified")]
    pub verified: bool,
}

fn default_verified() -> bool {
    true
}

impl CommitRecord {
    /// Commit for `agent_id`, stamped now and marked verified.
    pub fn new(agent_id: impl Into<String>, hashes: RecordHashes) -> Self {
        Self {
            agent_id: agent_id.into(),
            persona_hash: hashes.persona_hash,
            record_hash: hashes.record_hash,
            timestamp: Utc::now(),
            verified: default_verified(),
        }
    }

    /// Commit for `record`, using its origin agent id and stored hashes.
    pub fn from_record(record: &IdentityRecord) -> Self {
        Self::new(record.arc().agent_id(), record.hashes())
    }

    /// Override the commit timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Override the verified flag.
    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Whether this commit names `record` and carries its stored hashes.
    pub fn matches(&self, record: &IdentityRecord) -> bool {
        self.agent_id == record.arc().agent_id()
            && self.persona_hash == record.persona().provenance_hash()
            && self.record_hash == record.provenance_hash()
    }
}
