//! Error types for the authorization core.
//!
//! # Security Note
//! Denial messages name only the resource and action tags, never other
//! principals or the existence of specific records. Detailed context goes
//! to the audit trail and the tracing output, not to callers.

use thiserror::Error;

use crate::types::{Action, Resource};

/// Authorization failures surfaced by the gate and the route resolver.
///
/// These are deterministic for a given (principal, resource, action,
/// owner) input and are never retried; each protected operation performs a
/// fresh evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// No principal could be resolved for the request.
    ///
    /// Surfaced distinctly from a denial so callers can send the user to
    /// login rather than to a forbidden page.
    #[error("not authenticated")]
    Unauthenticated,

    /// The matrix resolved to an unconditional deny.
    #[error("permission denied: {action} on {resource}")]
    PermissionDenied { resource: Resource, action: Action },

    /// The grant was own-only and the ownership claim was missing or
    /// named a different principal.
    #[error("ownership required: {action} on {resource} is limited to the owner")]
    OwnershipRequired { resource: Resource, action: Action },

    /// A route rule's role allow-list or grant refused the navigation.
    #[error("route forbidden: {reason}")]
    RouteForbidden { reason: String },
}

/// A specialized Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_only_resource_and_action() {
        let err = AuthzError::PermissionDenied {
            resource: Resource::Invoices,
            action: Action::Read,
        };
        assert_eq!(err.to_string(), "permission denied: read on invoices");

        let err = AuthzError::OwnershipRequired {
            resource: Resource::TimeEntries,
            action: Action::Update,
        };
        assert_eq!(
            err.to_string(),
            "ownership required: update on timeentries is limited to the owner"
        );
    }

    #[test]
    fn unauthenticated_is_distinct_from_denial() {
        assert_ne!(
            AuthzError::Unauthenticated,
            AuthzError::PermissionDenied {
                resource: Resource::Projects,
                action: Action::Read,
            }
        );
        assert_eq!(AuthzError::Unauthenticated.to_string(), "not authenticated");
    }
}
