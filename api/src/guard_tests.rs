//! Tests for the authorization middleware.
//!
//! The mapping helpers and the decision surface they delegate to are
//! tested directly; the middleware bodies are exercised end to end
//! through a small router with an in-memory session layer.

#[cfg(test)]
mod tests {
    use super::super::guard::*;
    use crate::{AppState, SessionKeys};
    use authz::{
        evaluate, Action, AuditLogger, Grant, PermissionGate, Principal, Resource, Role,
        DEFAULT_ROUTES,
    };
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

    #[test]
    fn get_and_head_map_to_read() {
        assert_eq!(action_from_method(&Method::GET), Action::Read);
        assert_eq!(action_from_method(&Method::HEAD), Action::Read);
    }

    #[test]
    fn post_maps_to_create() {
        assert_eq!(action_from_method(&Method::POST), Action::Create);
    }

    #[test]
    fn put_and_patch_map_to_update() {
        assert_eq!(action_from_method(&Method::PUT), Action::Update);
        assert_eq!(action_from_method(&Method::PATCH), Action::Update);
    }

    #[test]
    fn delete_maps_to_delete() {
        assert_eq!(action_from_method(&Method::DELETE), Action::Delete);
    }

    #[test]
    fn exotic_methods_default_to_read() {
        assert_eq!(action_from_method(&Method::OPTIONS), Action::Read);
        assert_eq!(action_from_method(&Method::TRACE), Action::Read);
    }

    #[test]
    fn resource_from_plain_path() {
        assert_eq!(resource_from_path("/invoices/42"), Some(Resource::Invoices));
        assert_eq!(resource_from_path("/timeentries"), Some(Resource::TimeEntries));
    }

    #[test]
    fn resource_from_api_prefixed_path() {
        assert_eq!(
            resource_from_path("/api/expenses/7/receipt"),
            Some(Resource::Expenses)
        );
    }

    #[test]
    fn unknown_paths_map_to_no_resource() {
        assert_eq!(resource_from_path("/health"), None);
        assert_eq!(resource_from_path("/api"), None);
        assert_eq!(resource_from_path("/"), None);
        // Resource tags are case-sensitive like every other tag.
        assert_eq!(resource_from_path("/Invoices"), None);
    }

    #[test]
    fn api_screen_decision_matches_the_matrix() {
        // The middleware evaluates exactly this: role tag, resource tag,
        // action tag through the string boundary.
        assert_eq!(evaluate("WORKER", "invoices", "read"), Grant::Deny);
        assert_eq!(evaluate("WORKER", "timeentries", "create"), Grant::Allow);
        assert_eq!(
            evaluate("WORKER", "timeentries", "update"),
            Grant::AllowOwnOnly
        );
    }

    #[test]
    fn redirect_targets_carry_only_a_generic_flag() {
        assert!(!LOGIN_REDIRECT.contains("reason"));
        assert!(!FORBIDDEN_REDIRECT.contains("reason"));
        assert!(LOGIN_REDIRECT.ends_with("denied=1"));
        assert!(FORBIDDEN_REDIRECT.ends_with("denied=1"));
    }

    fn test_state() -> AppState {
        AppState::new(
            Arc::new(PermissionGate::new(AuditLogger::disabled())),
            Arc::new(DEFAULT_ROUTES.clone()),
        )
    }

    /// Stands in for the authentication flow: stores a worker identity
    /// in the session the way the login handlers would.
    async fn start_worker_session(session: Session) -> &'static str {
        session
            .insert(SessionKeys::USER_ID, "worker-1")
            .await
            .unwrap();
        session.insert(SessionKeys::ROLE, "WORKER").await.unwrap();
        "signed in"
    }

    /// Pages behind the route guard, plus an unguarded sign-in route.
    fn page_app(state: AppState) -> Router {
        Router::new()
            .route("/projects", get(|| async { "projects" }))
            .route("/invoices", get(|| async { "invoices" }))
            .layer(middleware::from_fn_with_state(state, route_guard))
            .route("/start", get(start_worker_session))
            .layer(SessionManagerLayer::new(MemoryStore::default()))
    }

    /// API routes behind the authorization screen.
    fn api_app(state: AppState) -> Router {
        Router::new()
            .route("/api/projects", get(|| async { "projects" }))
            .route("/api/invoices", get(|| async { "invoices" }))
            .layer(middleware::from_fn_with_state(state, authorization_middleware))
            .route("/start", get(start_worker_session))
            .layer(SessionManagerLayer::new(MemoryStore::default()))
    }

    /// Run the sign-in route and hand back the session cookie.
    async fn sign_in(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/start").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie")
            .to_str()
            .unwrap();
        cookie.split(';').next().unwrap().to_string()
    }

    async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> axum::response::Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn route_guard_redirects_unauthenticated_navigation_to_login() {
        let app = page_app(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/projects")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location.to_str().unwrap(), LOGIN_REDIRECT);
    }

    #[tokio::test]
    async fn route_guard_lets_an_authorized_navigation_through() {
        let app = page_app(test_state());
        let cookie = sign_in(&app).await;

        let response = get_with_cookie(&app, "/projects", &cookie).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn route_guard_redirects_forbidden_navigation_to_fallback() {
        let app = page_app(test_state());
        let cookie = sign_in(&app).await;

        // Workers hold no invoice grants; the /invoices rule denies.
        let response = get_with_cookie(&app, "/invoices", &cookie).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(location, FORBIDDEN_REDIRECT);
        // The internal reason never reaches the URL.
        assert!(!location.contains("invoices"));
        assert!(!location.contains("may not"));
    }

    #[tokio::test]
    async fn api_screen_rejects_unauthenticated_calls() {
        let app = api_app(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/projects")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn api_screen_enforces_the_matrix_end_to_end() {
        let app = api_app(test_state());
        let cookie = sign_in(&app).await;

        let allowed = get_with_cookie(&app, "/api/projects", &cookie).await;
        assert_eq!(allowed.status(), StatusCode::OK);

        let denied = get_with_cookie(&app, "/api/invoices", &cookie).await;
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn route_table_distinguishes_login_from_forbidden() {
        // The guard redirects to login only when no principal resolves.
        let unauthenticated = DEFAULT_ROUTES.resolve(None, "/projects");
        assert_eq!(unauthenticated.reason.as_deref(), Some("not authenticated"));

        let client = Principal::new("client-1", Role::Client);
        let forbidden = DEFAULT_ROUTES.resolve(Some(&client), "/admin");
        assert!(!forbidden.allowed);
        assert_ne!(forbidden.reason.as_deref(), Some("not authenticated"));
    }
}
