//! Append-only audit trail for authorization and business events.
//!
//! Every denied permission check produces one record here (written by the
//! gate through the [`authz::AuditSink`] implementation on
//! [`AuditTrail`]), and callers may record successful mutating operations
//! through the same sink. Records are hash-chained so tampering with the
//! trail is detectable, and the trail is best-effort by contract: a
//! failed append is reported on the diagnostic channel and never aborts
//! the operation that triggered it.

pub mod error;
pub mod record;
pub mod trail;

pub use error::{AuditError, Result};
pub use record::{AuditRecord, GENESIS_HASH};
pub use trail::{AuditTrail, AuditTrailConfig};
