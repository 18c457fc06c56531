//! Session-to-principal resolution.
//!
//! This is the concrete Identity Accessor for the HTTP layer: it reads
//! the keys the authentication flow stored in the session and builds the
//! request-scoped [`Principal`] the gate and the route resolver consume.
//! The session is read here, never written; establishing it is the
//! authentication provider's job and out of scope.

use tower_sessions::Session;
use tracing::{debug, warn};

use authz::{Principal, Role};

/// Session keys used for storing identity data
pub struct SessionKeys;

impl SessionKeys {
    pub const USER_ID: &'static str = "user_id";
    pub const ROLE: &'static str = "role";
    pub const COMPANY_ID: &'static str = "company_id";
}

/// Build the current [`Principal`] from the session, if one resolves.
///
/// Returns `None` when there is no session user, when session reads
/// fail, or when the stored role tag does not parse — a session carrying
/// an unrecognized role is not trusted as authenticated. Role tags are
/// matched case-sensitively, like everywhere else in the core.
pub async fn principal_from_session(session: &Session) -> Option<Principal> {
    let user_id: String = match session.get(SessionKeys::USER_ID).await {
        Ok(Some(id)) => id,
        Ok(None) => return None,
        Err(e) => {
            warn!("failed to read user_id from session: {e}");
            return None;
        }
    };

    let role_tag: String = match session.get(SessionKeys::ROLE).await {
        Ok(Some(tag)) => tag,
        Ok(None) => {
            warn!(user = %user_id, "session has no role, treating as unauthenticated");
            return None;
        }
        Err(e) => {
            warn!("failed to read role from session: {e}");
            return None;
        }
    };

    let Some(role) = Role::parse(&role_tag) else {
        warn!(user = %user_id, role = %role_tag, "unrecognized role tag in session");
        return None;
    };

    let company_id: Option<String> = session
        .get(SessionKeys::COMPANY_ID)
        .await
        .unwrap_or_default();

    debug!(user = %user_id, %role, "principal resolved from session");

    let mut principal = Principal::new(user_id, role);
    principal.company_id = company_id;
    Some(principal)
}
