//! Authorization middleware: the two HTTP enforcement points.
//!
//! `route_guard` gates whole-page navigation through the route table and
//! redirects on deny; `authorization_middleware` screens API calls
//! against the matrix before they reach a handler. Both resolve the
//! principal from the session and pass it explicitly into the core.
//!
//! The API screen is deliberately coarse: an own-qualified grant passes
//! here because the ownership claim only exists inside the handler's data
//! fetch, where business code calls `assert_permission` with the real
//! owner id. A flat deny, though, is final and is audited once here.

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{debug, warn};

use authz::{evaluate, Action, AuditEvent, Grant, Resource};

use crate::session::principal_from_session;
use crate::AppState;

/// Where unauthenticated navigation is sent.
pub const LOGIN_REDIRECT: &str = "/login?denied=1";
/// Where authenticated-but-forbidden navigation is sent. The internal
/// reason string stays out of the URL; a generic flag is enough for the
/// page to show a "you were redirected" notice.
pub const FORBIDDEN_REDIRECT: &str = "/dashboard?denied=1";

/// Page-navigation guard. Resolves the principal, consults the route
/// table, and redirects on deny instead of rendering an error body.
pub async fn route_guard(
    State(state): State<AppState>,
    session: Session,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let principal = principal_from_session(&session).await;

    let decision = state.routes.resolve(principal.as_ref(), &path);
    if decision.allowed {
        debug!(%path, "route allowed");
        return next.run(request).await;
    }

    match principal {
        None => {
            debug!(%path, "unauthenticated navigation, redirecting to login");
            Redirect::to(LOGIN_REDIRECT).into_response()
        }
        Some(principal) => {
            warn!(
                %path,
                principal = %principal.id,
                role = %principal.role,
                reason = decision.reason.as_deref().unwrap_or("route forbidden"),
                "navigation denied, redirecting"
            );
            Redirect::to(FORBIDDEN_REDIRECT).into_response()
        }
    }
}

/// API-call screen. Maps the HTTP method and path onto a (resource,
/// action) pair and evaluates it through the string-boundary evaluator;
/// flat denies get one audit record and a 403. Paths that name no known
/// resource pass through, mirroring the route table's unprotected
/// default.
pub async fn authorization_middleware(
    State(state): State<AppState>,
    session: Session,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(resource) = resource_from_path(&path) else {
        debug!(%path, "no resource mapped, passing through");
        return Ok(next.run(request).await);
    };
    let action = action_from_method(&method);

    let Some(principal) = principal_from_session(&session).await else {
        warn!(%path, "unauthenticated API call");
        return Err(StatusCode::UNAUTHORIZED);
    };

    match evaluate(principal.role.as_str(), resource.as_str(), action.as_str()) {
        Grant::Allow | Grant::AllowOwnOnly => {
            debug!(
                principal = %principal.id,
                %resource,
                %action,
                "API call allowed"
            );
            Ok(next.run(request).await)
        }
        Grant::Deny => {
            warn!(
                principal = %principal.id,
                role = %principal.role,
                %resource,
                %action,
                "API call denied"
            );
            state.gate.audit().record(AuditEvent {
                principal_id: principal.id.clone(),
                action: action.denied_tag().to_string(),
                resource_type: resource.as_str().to_string(),
                resource_id: None,
                details: Some(format!("{} {} blocked at API boundary", method, path)),
            });
            Err(StatusCode::FORBIDDEN)
        }
    }
}

/// Map an HTTP method onto an authorization action:
/// GET/HEAD → read, POST → create, PUT/PATCH → update, DELETE → delete.
/// Exotic methods default to read, the least privileged screen.
pub fn action_from_method(method: &Method) -> Action {
    match method.as_str() {
        "GET" | "HEAD" => Action::Read,
        "POST" => Action::Create,
        "PUT" | "PATCH" => Action::Update,
        "DELETE" => Action::Delete,
        _ => Action::Read,
    }
}

/// Map a request path onto the resource its first meaningful segment
/// names. An optional leading `api` segment is skipped, so both
/// `/invoices/42` and `/api/invoices/42` resolve to `invoices`.
pub fn resource_from_path(path: &str) -> Option<Resource> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let first = segments.next()?;
    let candidate = if first == "api" { segments.next()? } else { first };
    Resource::parse(candidate)
}
