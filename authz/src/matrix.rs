//! The static permission matrix and its evaluation seam.
//!
//! The matrix is a total function over (role, resource, action): every
//! triple resolves to exactly one [`Grant`], with no partial lookup and no
//! I/O. Cells not explicitly granted fall through to [`Grant::Deny`], so a
//! resource or action added without updating a role's rows denies instead
//! of allowing.
//!
//! Business code never calls [`grant_for`] directly; it goes through
//! [`evaluate`] (string boundary) or the gate, keeping a single choke
//! point should the matrix ever move to a database-backed policy store.

use crate::types::{Action, Grant, Resource, Role};

/// Look up the grant for a typed (role, resource, action) triple.
///
/// Pure and constant; never panics. Arms are grouped per role, most
/// privileged first. Anything not named is denied.
pub fn grant_for(role: Role, resource: Resource, action: Action) -> Grant {
    use Action::*;
    use Grant::*;
    use Resource::*;
    use Role::*;

    match (role, resource, action) {
        // ADMIN holds every grant unconditionally.
        (Admin, _, _) => Allow,

        // MANAGER: org-wide on operational records, own-only on
        // destructive deletes, read-only on users/settings/analytics.
        (Manager, Users, Read) => Allow,
        (Manager, Projects, Create | Read | Update | Approve) => Allow,
        (Manager, Clients, Create | Read | Update) => Allow,
        (Manager, Leads, Create | Read | Update) => Allow,
        (Manager, Leads, Delete) => AllowOwnOnly,
        (Manager, Tasks, _) => Allow,
        (Manager, TimeEntries, Read | Approve) => Allow,
        (Manager, TimeEntries, Create | Update | Delete) => AllowOwnOnly,
        (Manager, Documents, Create | Read | Update) => Allow,
        (Manager, Documents, Delete) => AllowOwnOnly,
        (Manager, Expenses, Create | Read | Approve) => Allow,
        (Manager, Expenses, Update | Delete) => AllowOwnOnly,
        (Manager, Invoices, Create | Read | Update | Approve) => Allow,
        (Manager, Settings, Read) => Allow,
        (Manager, Analytics, Read) => Allow,

        // WORKER: reads shared project context, full own-scoped control of
        // the artifacts they produce. No invoice grants at all.
        (Worker, Projects, Read) => Allow,
        (Worker, Clients, Read) => Allow,
        (Worker, Tasks, Read) => Allow,
        (Worker, Tasks, Update) => AllowOwnOnly,
        (Worker, TimeEntries, Create) => Allow,
        (Worker, TimeEntries, Read | Update | Delete) => AllowOwnOnly,
        (Worker, Documents, Create | Read) => Allow,
        (Worker, Documents, Update | Delete) => AllowOwnOnly,
        (Worker, Expenses, Create) => Allow,
        (Worker, Expenses, Read | Update | Delete) => AllowOwnOnly,

        // CLIENT: own-only visibility into what concerns them.
        (Client, Projects | Tasks | Documents | Invoices, Read) => AllowOwnOnly,

        _ => Deny,
    }
}

/// The string-boundary evaluator used by everything outside this crate.
///
/// Tags are case-sensitive; any unrecognized role, resource, or action
/// evaluates to [`Grant::Deny`] rather than an error, preserving the
/// fail-closed behavior for typo'd or foreign values observed at the
/// session boundary.
pub fn evaluate(role: &str, resource: &str, action: &str) -> Grant {
    match (Role::parse(role), Resource::parse(resource), Action::parse(action)) {
        (Some(role), Some(resource), Some(action)) => grant_for(role, resource, action),
        _ => Grant::Deny,
    }
}
