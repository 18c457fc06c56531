//! The immutable audit record and its tamper-evident hash chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Genesis value for the first record's `previous_hash`.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// A single append-only entry in the audit trail.
///
/// Records are created once (per denied check, and per successful
/// mutating operation a caller chooses to log) and never mutated or
/// deleted. Each record carries the hash of its predecessor so the trail
/// can be verified end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique id for this record.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// The acting principal ("system" for records without one).
    pub principal_id: String,
    /// Event tag, e.g. `DENIED_UPDATE` or a caller-chosen success tag.
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    /// Human-readable reason or context.
    pub details: Option<String>,
    /// Hash of the previous record, for chain verification.
    pub previous_hash: String,
    /// Hash of this record.
    pub entry_hash: String,
}

impl AuditRecord {
    pub fn new(
        principal_id: String,
        action: String,
        resource_type: String,
        resource_id: Option<String>,
        details: Option<String>,
        previous_hash: String,
    ) -> Self {
        let mut record = Self {
            id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            principal_id,
            action,
            resource_type,
            resource_id,
            details,
            previous_hash,
            entry_hash: String::new(),
        };
        record.entry_hash = record.calculate_hash();
        record
    }

    /// SHA-256 over every field except `entry_hash` itself.
    fn calculate_hash(&self) -> String {
        let mut hasher = Sha256::new();

        hasher.update(self.id.as_bytes());
        hasher.update(self.timestamp.to_rfc3339().as_bytes());
        hasher.update(self.principal_id.as_bytes());
        hasher.update(self.action.as_bytes());
        hasher.update(self.resource_type.as_bytes());

        if let Some(ref resource_id) = self.resource_id {
            hasher.update(resource_id.as_bytes());
        }

        if let Some(ref details) = self.details {
            hasher.update(details.as_bytes());
        }

        hasher.update(self.previous_hash.as_bytes());

        hex::encode(hasher.finalize())
    }

    /// Verify this record's own hash.
    pub fn verify_hash(&self) -> bool {
        self.entry_hash == self.calculate_hash()
    }
}
