//! HTTP enforcement layer for the RBAC core.
//!
//! Wires the session (identity), the permission gate, and the route table
//! into axum middleware. Handlers and pages sit behind these two
//! enforcement points and additionally call
//! [`authz::PermissionGate::assert_permission`] with real ownership
//! claims inside their own data fetches.

pub mod error;
pub mod guard;
pub mod session;

#[cfg(test)]
mod guard_tests;

use std::sync::Arc;

use tracing::info;

use audit::{AuditTrail, AuditTrailConfig};
use authz::{AuditLogger, PermissionGate, RouteTable, DEFAULT_ROUTES};

pub use error::{ApiError, ApiErrorResponse, ApiResult, ErrorDetail};
pub use guard::{authorization_middleware, route_guard, FORBIDDEN_REDIRECT, LOGIN_REDIRECT};
pub use session::{principal_from_session, SessionKeys};

/// Shared state handed to the middleware stack.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<PermissionGate>,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    pub fn new(gate: Arc<PermissionGate>, routes: Arc<RouteTable>) -> Self {
        Self { gate, routes }
    }

    /// Production wiring: hash-chained audit trail on disk, the
    /// application route table, one gate shared process-wide.
    pub fn with_audit_trail(config: AuditTrailConfig) -> ApiResult<Self> {
        info!("initializing authorization state with audit trail at {:?}", config.log_path);
        let trail = Arc::new(AuditTrail::new(config)?);
        let gate = PermissionGate::new(AuditLogger::new(trail));
        Ok(Self {
            gate: Arc::new(gate),
            routes: Arc::new(DEFAULT_ROUTES.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authz::{Action, Principal, Resource, Role};
    use tempfile::TempDir;

    #[test]
    fn state_wires_gate_routes_and_trail() {
        let dir = TempDir::new().unwrap();
        let state = AppState::with_audit_trail(AuditTrailConfig {
            log_path: dir.path().join("audit.log"),
            max_size_mb: 10,
            max_rotations: 3,
        })
        .unwrap();

        let worker = Principal::new("worker-1", Role::Worker);
        // A denial through the gate lands in the trail file.
        let result =
            state
                .gate
                .assert_permission(Some(&worker), Resource::Invoices, Action::Read, None);
        assert!(result.is_err());
        assert!(dir.path().join("audit.log").exists());

        // The default route table is live.
        assert!(!state.routes.resolve(Some(&worker), "/invoices").allowed);
        assert!(state.routes.resolve(Some(&worker), "/projects").allowed);
    }
}
