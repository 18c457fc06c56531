//! Core authorization vocabulary: roles, resources, actions, grants.
//!
//! All four vocabularies are closed enums. The string boundary is
//! deliberately strict: tags are case-sensitive and anything unrecognized
//! parses to `None`, which the matrix boundary maps to [`Grant::Deny`].
//! A typo'd or foreign role value must fail closed, never open.
//!
//! # Security Note
//! Principals must be built from authenticated session data only. This
//! crate never constructs a `Principal` on its own and never persists one.

use serde::{Deserialize, Serialize};

/// A principal's authorization class. Exactly one per principal.
///
/// The application layer may carry a `SUPERADMIN` bypass on top of these;
/// that bypass never reaches the matrix and is not represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    Worker,
    Client,
}

impl Role {
    /// Every role, for exhaustive sweeps over the matrix.
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Worker, Role::Client];

    /// The canonical wire/session tag for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Worker => "WORKER",
            Role::Client => "CLIENT",
        }
    }

    /// Case-sensitive tag parse. `"admin"` is not a role; only `"ADMIN"` is.
    pub fn parse(tag: &str) -> Option<Role> {
        match tag {
            "ADMIN" => Some(Role::Admin),
            "MANAGER" => Some(Role::Manager),
            "WORKER" => Some(Role::Worker),
            "CLIENT" => Some(Role::Client),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protectable noun in the system.
///
/// Extending this enum requires a full row per role in the matrix; the
/// exhaustive `match` there turns a forgotten row into a compile error
/// instead of an implicit grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Users,
    Projects,
    Clients,
    Leads,
    Tasks,
    TimeEntries,
    Documents,
    Expenses,
    Invoices,
    Settings,
    Analytics,
}

impl Resource {
    pub const ALL: [Resource; 11] = [
        Resource::Users,
        Resource::Projects,
        Resource::Clients,
        Resource::Leads,
        Resource::Tasks,
        Resource::TimeEntries,
        Resource::Documents,
        Resource::Expenses,
        Resource::Invoices,
        Resource::Settings,
        Resource::Analytics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Projects => "projects",
            Resource::Clients => "clients",
            Resource::Leads => "leads",
            Resource::Tasks => "tasks",
            Resource::TimeEntries => "timeentries",
            Resource::Documents => "documents",
            Resource::Expenses => "expenses",
            Resource::Invoices => "invoices",
            Resource::Settings => "settings",
            Resource::Analytics => "analytics",
        }
    }

    pub fn parse(tag: &str) -> Option<Resource> {
        match tag {
            "users" => Some(Resource::Users),
            "projects" => Some(Resource::Projects),
            "clients" => Some(Resource::Clients),
            "leads" => Some(Resource::Leads),
            "tasks" => Some(Resource::Tasks),
            "timeentries" => Some(Resource::TimeEntries),
            "documents" => Some(Resource::Documents),
            "expenses" => Some(Resource::Expenses),
            "invoices" => Some(Resource::Invoices),
            "settings" => Some(Resource::Settings),
            "analytics" => Some(Resource::Analytics),
            _ => None,
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation on a [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Approve,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Approve,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Approve => "approve",
        }
    }

    pub fn parse(tag: &str) -> Option<Action> {
        match tag {
            "create" => Some(Action::Create),
            "read" => Some(Action::Read),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            "approve" => Some(Action::Approve),
            _ => None,
        }
    }

    /// Uppercase tag used when labelling denied attempts in the audit
    /// trail, e.g. `DENIED_UPDATE`.
    pub fn denied_tag(&self) -> &'static str {
        match self {
            Action::Create => "DENIED_CREATE",
            Action::Read => "DENIED_READ",
            Action::Update => "DENIED_UPDATE",
            Action::Delete => "DENIED_DELETE",
            Action::Approve => "DENIED_APPROVE",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authorization outcome stored at one (role, resource, action) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grant {
    /// Unconditionally permitted.
    Allow,
    /// Unconditionally forbidden.
    Deny,
    /// Permitted only when the acting principal owns the specific
    /// resource instance being acted upon.
    AllowOwnOnly,
}

impl Grant {
    /// Whether this grant can let an operation proceed at all. The
    /// ownership comparison for [`Grant::AllowOwnOnly`] happens in the
    /// gate, not here.
    pub fn is_granting(&self) -> bool {
        !matches!(self, Grant::Deny)
    }
}

/// The acting identity for one evaluation.
///
/// Built per request from session data, immutable for the duration of one
/// check, never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque user identifier (the value ownership claims are compared to).
    pub id: String,
    pub role: Role,
    /// Tenant identifier, passed through for collaborators; absent for
    /// principals outside any company scope.
    pub company_id: Option<String>,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            company_id: None,
        }
    }

    pub fn with_company(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }
}
