//! RBAC authorization core for the business-management suite.
//!
//! This crate holds the permission matrix, the evaluator, the enforcement
//! gate, and the route access resolver that together gate every protected
//! page and server action. Everything else — UI, business logic, the
//! database, the authentication provider — is a collaborator on the other
//! side of two in-process contracts:
//!
//! - **Inbound**: business code calls [`PermissionGate::assert_permission`]
//!   / [`PermissionGate::is_allowed`] before protected operations, and the
//!   HTTP layer calls [`RouteTable::resolve`] / [`RouteTable::require_access`]
//!   on page navigation.
//! - **Outbound**: an [`AuditSink`] persists denial records (failures are
//!   swallowed, never surfaced), and an [`IdentityAccessor`] — or the
//!   caller directly — supplies the request's [`Principal`].
//!
//! # Authorization Flow
//!
//! 1. A page load or server action arrives.
//! 2. The caller resolves the current principal (session, token, test
//!    fixture) and passes it in explicitly.
//! 3. The route resolver or the gate consults the matrix.
//! 4. On denial the gate records one audit event and returns a structured
//!    error; on grant (possibly ownership-qualified) control proceeds.
//!
//! # Security Architecture
//!
//! - The matrix is total and fail-closed: unknown roles, resources, or
//!   actions evaluate to deny, never to an error and never to allow.
//! - Decisions are never cached; every call re-evaluates.
//! - The audit write happens after the decision is final and can never
//!   change the outcome.
//! - Policy lives in code: changing it is a code change and redeploy, not
//!   a data migration.

pub mod error;
pub mod gate;
pub mod matrix;
pub mod routes;
pub mod types;

pub use error::{AuthzError, Result};
pub use gate::{AuditEvent, AuditLogger, AuditSink, IdentityAccessor, PermissionGate};
pub use matrix::{evaluate, grant_for};
pub use routes::{RouteDecision, RouteRule, RouteTable, DEFAULT_ROUTES};
pub use types::{Action, Grant, Principal, Resource, Role};
