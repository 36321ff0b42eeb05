// src/middleware/guard.rs
//
// Role-based page guard. `decide` holds the rules; `session_guard` resolves
// the caller's session once per request and applies them.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::Role,
};

pub const SESSION_COOKIE: &str = "spotly_session";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(String),
}

/// Raw access token of the current request, when one was sent.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

// `/dashboard/admin` covers `/dashboard/admin/...` but not `/dashboard/administrator`.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// First matching rule wins.
pub fn decide(path: &str, role: Option<Role>) -> GuardDecision {
    if under(path, "/login") || under(path, "/signup") {
        return match role {
            Some(role) => GuardDecision::Redirect(role.dashboard_path()),
            None => GuardDecision::Pass,
        };
    }

    if !under(path, "/dashboard") {
        return GuardDecision::Pass;
    }

    let Some(role) = role else {
        return GuardDecision::Redirect(LOGIN_PATH.to_string());
    };

    if under(path, "/dashboard/admin") && role != Role::Admin {
        return GuardDecision::Redirect(role.dashboard_path());
    }
    if under(path, "/dashboard/vendor") && !matches!(role, Role::Vendor | Role::Admin) {
        return GuardDecision::Redirect(role.dashboard_path());
    }
    if under(path, "/dashboard/user") && role == Role::Admin {
        return GuardDecision::Redirect(Role::Admin.dashboard_path());
    }

    GuardDecision::Pass
}

/// Bearer token first, then the session cookie.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

pub async fn session_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request_token(request.headers());
    let session = match &token {
        Some(token) => app_state.identity.get_session(token).await?,
        None => None,
    };

    let path = request.uri().path();
    if let GuardDecision::Redirect(target) = decide(path, session.as_ref().map(|s| s.role)) {
        tracing::debug!(%path, %target, "guard redirect");
        return Ok(Redirect::to(&target).into_response());
    }

    if let Some(token) = token {
        request.extensions_mut().insert(SessionToken(token));
    }
    if let Some(user) = session {
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderValue};

    use super::*;

    fn redirect(to: &str) -> GuardDecision {
        GuardDecision::Redirect(to.to_string())
    }

    #[test]
    fn signed_in_users_skip_login_and_signup() {
        assert_eq!(decide("/login", Some(Role::Vendor)), redirect("/dashboard/vendor"));
        assert_eq!(decide("/signup", Some(Role::User)), redirect("/dashboard/user"));
        assert_eq!(decide("/login", None), GuardDecision::Pass);
    }

    #[test]
    fn dashboards_require_a_session() {
        assert_eq!(decide("/dashboard", None), redirect("/login"));
        assert_eq!(decide("/dashboard/user/properties", None), redirect("/login"));
    }

    #[test]
    fn admin_area_is_admin_only() {
        assert_eq!(decide("/dashboard/admin", Some(Role::User)), redirect("/dashboard/user"));
        assert_eq!(decide("/dashboard/admin", Some(Role::Vendor)), redirect("/dashboard/vendor"));
        assert_eq!(decide("/dashboard/admin", Some(Role::Admin)), GuardDecision::Pass);
    }

    #[test]
    fn vendor_area_admits_vendors_and_admins() {
        assert_eq!(decide("/dashboard/vendor/list-property", Some(Role::User)), redirect("/dashboard/user"));
        assert_eq!(decide("/dashboard/vendor", Some(Role::Vendor)), GuardDecision::Pass);
        assert_eq!(decide("/dashboard/vendor", Some(Role::Admin)), GuardDecision::Pass);
    }

    #[test]
    fn admins_are_sent_from_user_area_to_admin() {
        assert_eq!(decide("/dashboard/user", Some(Role::Admin)), redirect("/dashboard/admin"));
        assert_eq!(decide("/dashboard/user/venues", Some(Role::Vendor)), GuardDecision::Pass);
    }

    #[test]
    fn prefixes_match_whole_segments() {
        assert_eq!(decide("/dashboard/administrator", Some(Role::User)), GuardDecision::Pass);
        assert_eq!(decide("/dashboards", None), GuardDecision::Pass);
        assert_eq!(decide("/login-help", Some(Role::User)), GuardDecision::Pass);
    }

    #[test]
    fn other_paths_pass() {
        assert_eq!(decide("/", None), GuardDecision::Pass);
        assert_eq!(decide("/api/properties/flat", None), GuardDecision::Pass);
    }

    #[test]
    fn token_from_bearer_or_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_token(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; spotly_session=cookie-token"));
        assert_eq!(request_token(&headers).as_deref(), Some("cookie-token"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        assert_eq!(request_token(&headers).as_deref(), Some("header-token"));
    }
}
