// src/handlers/auth.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        guard::{SessionToken, SESSION_COOKIE},
    },
    models::auth::{AuthResponse, AuthSession, Role, SessionUser, SignInPayload, SignUpMetadata, SignUpPayload},
};

pub const CALLBACK_FAILED_PATH: &str = "/login?error=oauth_callback_failed";

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn auth_response(session: AuthSession) -> AuthResponse {
    let redirect_to = session.user.role.dashboard_path();
    AuthResponse {
        token: session.access_token,
        expires_at: session.expires_at,
        user: session.user,
        redirect_to,
    }
}

#[utoipa::path(
    post,
    path = "/signup",
    tag = "Auth",
    request_body = SignUpPayload,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 400, description = "Invalid form"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignUpPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let role = Role::from_metadata(payload.role.as_deref())
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    if role == Role::Admin {
        return Err(AppError::Forbidden(role.to_string()));
    }

    let metadata = SignUpMetadata { name: payload.name, role };
    let session = app_state
        .identity
        .sign_up(&payload.email, &payload.password, metadata)
        .await?;

    let jar = jar.add(session_cookie(session.access_token.clone()));
    Ok((StatusCode::CREATED, jar, Json(auth_response(session))))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = SignInPayload,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignInPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let session = app_state.identity.sign_in(&payload.email, &payload.password).await?;

    let jar = jar.add(session_cookie(session.access_token.clone()));
    Ok((jar, Json(auth_response(session))))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "No session")
    ),
    security(("api_jwt" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    jar: CookieJar,
    SessionToken(token): SessionToken,
) -> Result<impl IntoResponse, AppError> {
    app_state.identity.sign_out(&token).await?;
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((StatusCode::NO_CONTENT, jar))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = SessionUser),
        (status = 401, description = "No session")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<SessionUser> {
    Json(user)
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    pub code: Option<String>,
    /// Relative path to continue to after sign-in.
    pub next: Option<String>,
}

// Only same-site relative paths; `//host` would leave the site.
fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
        .filter(|n| *n != "/")
}

#[utoipa::path(
    get,
    path = "/callback",
    tag = "Auth",
    params(CallbackQuery),
    responses(
        (status = 303, description = "To the dashboard on success, back to login on failure")
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    let Some(code) = query.code.filter(|c| !c.trim().is_empty()) else {
        return (jar, Redirect::to(CALLBACK_FAILED_PATH));
    };

    match app_state.identity.exchange_code_for_session(&code).await {
        Ok(session) => {
            let target = safe_next(query.next.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| session.user.role.dashboard_path());
            let jar = jar.add(session_cookie(session.access_token));
            (jar, Redirect::to(&target))
        }
        Err(e) => {
            tracing::warn!(error = %e, "code exchange failed");
            (jar, Redirect::to(CALLBACK_FAILED_PATH))
        }
    }
}
