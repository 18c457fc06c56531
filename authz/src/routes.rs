//! Route-to-permission mapping for whole-page navigation.
//!
//! Rules are scanned in declaration order and the first rule whose
//! `path_prefix` is a prefix of the requested path wins. This is a caller
//! contract, not an implementation detail: a rule for `/admin` also
//! matches `/admin/users`, so a more specific prefix must be declared
//! before its parent. Paths with no matching rule are allowed — a
//! deliberate fail-open for intentionally public sub-paths, the inverse
//! of the gate's fail-closed matrix default.
//!
//! Route-level checks never carry an ownership claim; own-qualified
//! grants pass here and ownership is enforced inside the page's own data
//! fetch through the gate.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AuthzError, Result};
use crate::matrix::grant_for;
use crate::types::{Action, Grant, Principal, Resource, Role};

/// One static navigation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRule {
    pub path_prefix: String,
    pub resource: Resource,
    pub action: Action,
    /// Optional allow-list stricter than the generic grant, used to hide
    /// entire sections from roles whose matrix row would technically let
    /// them through.
    pub allowed_roles: Option<Vec<Role>>,
}

impl RouteRule {
    pub fn new(path_prefix: impl Into<String>, resource: Resource, action: Action) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            resource,
            action,
            allowed_roles: None,
        }
    }

    pub fn roles(mut self, roles: &[Role]) -> Self {
        self.allowed_roles = Some(roles.to_vec());
        self
    }
}

/// Outcome of resolving a navigation against the table.
///
/// The reason string is for server-side display ("why was I redirected")
/// and must never be placed in a URL or response body verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl RouteDecision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Static, load-once route table. Immutable after construction; tests
/// inject their own tables through [`RouteTable::new`].
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Resolve whether `principal` may navigate to `path`.
    pub fn resolve(&self, principal: Option<&Principal>, path: &str) -> RouteDecision {
        let Some(principal) = principal else {
            return RouteDecision::denied("not authenticated");
        };

        let Some(rule) = self
            .rules
            .iter()
            .find(|rule| path.starts_with(&rule.path_prefix))
        else {
            // Unprotected by default; see module docs.
            debug!(%path, "no route rule matched, allowing");
            return RouteDecision::allowed();
        };

        if let Some(allowed_roles) = &rule.allowed_roles {
            if !allowed_roles.contains(&principal.role) {
                let required = allowed_roles
                    .iter()
                    .map(Role::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                return RouteDecision::denied(format!(
                    "section requires one of: {required}"
                ));
            }
        }

        match grant_for(principal.role, rule.resource, rule.action) {
            Grant::Deny => RouteDecision::denied(format!(
                "{} may not {} {}",
                principal.role, rule.action, rule.resource
            )),
            // Ownership is checked later, inside the page's data fetch.
            Grant::Allow | Grant::AllowOwnOnly => RouteDecision::allowed(),
        }
    }

    /// Error-returning form of [`Self::resolve`], for callers that
    /// redirect on deny.
    pub fn require_access(&self, principal: Option<&Principal>, path: &str) -> Result<()> {
        if principal.is_none() {
            return Err(AuthzError::Unauthenticated);
        }
        let decision = self.resolve(principal, path);
        if decision.allowed {
            Ok(())
        } else {
            Err(AuthzError::RouteForbidden {
                reason: decision
                    .reason
                    .unwrap_or_else(|| "route forbidden".to_string()),
            })
        }
    }
}

/// The application's route table. Declaration order is significant: the
/// more specific `/admin/users` precedes `/admin`.
pub static DEFAULT_ROUTES: Lazy<RouteTable> = Lazy::new(|| {
    RouteTable::new(vec![
        RouteRule::new("/admin/users", Resource::Users, Action::Read).roles(&[Role::Admin]),
        RouteRule::new("/admin", Resource::Settings, Action::Read)
            .roles(&[Role::Admin, Role::Manager]),
        RouteRule::new("/projects", Resource::Projects, Action::Read),
        RouteRule::new("/invoices", Resource::Invoices, Action::Read),
        RouteRule::new("/timesheets", Resource::TimeEntries, Action::Read),
        RouteRule::new("/crm", Resource::Leads, Action::Read),
        RouteRule::new("/documents", Resource::Documents, Action::Read),
        RouteRule::new("/expenses", Resource::Expenses, Action::Read),
        RouteRule::new("/analytics", Resource::Analytics, Action::Read)
            .roles(&[Role::Admin, Role::Manager]),
        RouteRule::new("/settings", Resource::Settings, Action::Read),
    ])
});
