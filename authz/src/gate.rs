//! The enforcement gate: the single entry point business code calls
//! before performing a protected operation.
//!
//! The principal is an explicit input on every call rather than ambient
//! state, so the gate is testable without a live session backend. Each
//! call evaluates fresh against the matrix; decisions are never cached,
//! since role and ownership can change between calls.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::error::{AuthzError, Result};
use crate::matrix::grant_for;
use crate::types::{Action, Grant, Principal, Resource};

/// A denied or otherwise noteworthy authorization event, handed to the
/// audit sink. The sink stamps time and identity-chains the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub principal_id: String,
    /// Event tag, e.g. `DENIED_UPDATE` or a caller-chosen success tag.
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: Option<String>,
}

/// Persistence collaborator for audit events. Implementations may fail;
/// the [`AuditLogger`] wrapper guarantees failures never reach the caller.
pub trait AuditSink: Send + Sync {
    fn append(&self, event: AuditEvent) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Collaborator supplying the current principal, for callers that resolve
/// identity out-of-band (the HTTP layer reads the session itself and
/// passes the principal in explicitly instead).
pub trait IdentityAccessor: Send + Sync {
    fn current_principal(&self) -> Option<Principal>;
}

/// Best-effort, never-throws wrapper around an [`AuditSink`].
///
/// A broken audit sink must not become an authorization outage: append
/// failures are reported on the diagnostic channel and swallowed.
#[derive(Clone)]
pub struct AuditLogger {
    sink: Option<Arc<dyn AuditSink>>,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// A logger that drops every event. Used by tests of pure decision
    /// logic and by tools that run without an audit trail.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Append an event, swallowing sink failures.
    pub fn record(&self, event: AuditEvent) {
        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(e) = sink.append(event.clone()) {
            error!(
                action = %event.action,
                resource = %event.resource_type,
                principal = %event.principal_id,
                "audit append failed, continuing: {e}"
            );
        }
    }

    /// Record a successful mutating business operation. The gate never
    /// calls this itself; callers decide which successes are worth a
    /// trail entry.
    pub fn record_success(
        &self,
        principal_id: &str,
        action: &str,
        resource: Resource,
        resource_id: Option<&str>,
        details: Option<&str>,
    ) {
        self.record(AuditEvent {
            principal_id: principal_id.to_string(),
            action: action.to_string(),
            resource_type: resource.as_str().to_string(),
            resource_id: resource_id.map(str::to_string),
            details: details.map(str::to_string),
        });
    }
}

/// The permission gate. Construct once per process with the audit logger
/// and share via [`Arc`]; the gate itself holds no mutable state.
#[derive(Clone)]
pub struct PermissionGate {
    audit: AuditLogger,
}

impl PermissionGate {
    pub fn new(audit: AuditLogger) -> Self {
        Self { audit }
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Assert that `principal` may perform `action` on `resource`.
    ///
    /// `owner_id` is the owning principal's id for the specific resource
    /// instance, supplied by the caller; it is consulted only when the
    /// grant is own-qualified. The gate compares identifiers, it never
    /// looks ownership up.
    ///
    /// On every denial path exactly one audit event tagged
    /// `DENIED_<ACTION>` is recorded before the error is returned.
    pub fn assert_permission(
        &self,
        principal: Option<&Principal>,
        resource: Resource,
        action: Action,
        owner_id: Option<&str>,
    ) -> Result<()> {
        let principal = principal.ok_or(AuthzError::Unauthenticated)?;

        match Self::decide(principal, resource, action, owner_id) {
            Ok(()) => {
                debug!(
                    principal = %principal.id,
                    role = %principal.role,
                    %resource,
                    %action,
                    "access allowed"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    principal = %principal.id,
                    role = %principal.role,
                    %resource,
                    %action,
                    "access denied: {err}"
                );
                self.audit.record(AuditEvent {
                    principal_id: principal.id.clone(),
                    action: action.denied_tag().to_string(),
                    resource_type: resource.as_str().to_string(),
                    resource_id: None,
                    details: Some(err.to_string()),
                });
                Err(err)
            }
        }
    }

    /// Boolean form of the same decision, for affordance toggling in
    /// UI-adjacent code. Every failure, including a missing principal,
    /// becomes `false`. Writes no audit events; denial auditing belongs
    /// to [`Self::assert_permission`].
    pub fn is_allowed(
        &self,
        principal: Option<&Principal>,
        resource: Resource,
        action: Action,
        owner_id: Option<&str>,
    ) -> bool {
        match principal {
            Some(principal) => Self::decide(principal, resource, action, owner_id).is_ok(),
            None => false,
        }
    }

    /// Resolve the principal through `identity` and assert. Convenience
    /// for non-HTTP callers carrying an [`IdentityAccessor`].
    pub fn assert_with(
        &self,
        identity: &dyn IdentityAccessor,
        resource: Resource,
        action: Action,
        owner_id: Option<&str>,
    ) -> Result<()> {
        let principal = identity.current_principal();
        self.assert_permission(principal.as_ref(), resource, action, owner_id)
    }

    /// The shared decision path behind both call styles. Pure.
    fn decide(
        principal: &Principal,
        resource: Resource,
        action: Action,
        owner_id: Option<&str>,
    ) -> Result<()> {
        match grant_for(principal.role, resource, action) {
            Grant::Allow => Ok(()),
            Grant::Deny => Err(AuthzError::PermissionDenied { resource, action }),
            Grant::AllowOwnOnly => match owner_id {
                Some(owner) if owner == principal.id => Ok(()),
                _ => Err(AuthzError::OwnershipRequired { resource, action }),
            },
        }
    }
}
