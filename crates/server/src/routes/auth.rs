//! Auth group: login/register pages, session cookie and email verification.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use tracing::info;

use service::auth::domain::{AuthUser, LoginInput, RegisterInput};

use crate::errors::JsonApiError;
use crate::gate::{enforce, CurrentUser, Policy, SESSION_COOKIE};
use crate::inertia::redirect;
use crate::pages::{mount, path_for, PageRoute};
use crate::state::ServerState;

pub const AUTH_PAGES: &[PageRoute] = &[
    PageRoute { name: "login", path: "/login", view: "auth/Login", policy: Policy::PUBLIC },
    PageRoute { name: "register", path: "/register", view: "auth/Register", policy: Policy::PUBLIC },
    PageRoute { name: "verification.notice", path: "/verify-email", view: "auth/VerifyEmail", policy: Policy::AUTHENTICATED },
];

#[derive(Serialize)]
pub struct LoginOutput {
    pub user: AuthUser,
    pub token: String,
}

pub(crate) fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Always sends an expired cookie, whether or not the request carried one.
pub(crate) fn clear_session(jar: CookieJar) -> CookieJar {
    let mut removal = Cookie::build((SESSION_COOKIE, "")).path("/").http_only(true).build();
    removal.make_removal();
    jar.add(removal)
}

/// No mailer: the link goes to the log.
pub(crate) fn send_verification_link(state: &ServerState, user: &AuthUser) -> Result<(), JsonApiError> {
    let token = state.auth.issue_verification_token(user)?;
    let link = format!("{}/verify-email/{}", state.app.url.trim_end_matches('/'), token);
    info!(user_id = %user.id, email = %user.email, %link, "verification link issued");
    Ok(())
}

#[utoipa::path(post, path = "/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 409, description = "Conflict"), (status = 422, description = "Validation Error")))]
pub async fn register(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<RegisterInput>) -> Result<(StatusCode, CookieJar, Json<AuthUser>), JsonApiError> {
    let user = state.auth.register(input).await?;
    send_verification_link(&state, &user)?;
    let token = state.auth.issue_session_token(&user)?;
    Ok((StatusCode::CREATED, jar.add(session_cookie(token, state.secure_cookies)), Json(user)))
}

#[utoipa::path(post, path = "/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = state.auth.login(input).await?;
    let jar = jar.add(session_cookie(session.token.clone(), state.secure_cookies));
    Ok((jar, Json(LoginOutput { user: session.user, token: session.token })))
}

#[utoipa::path(post, path = "/logout", tag = "auth", responses((status = 204, description = "Logged Out")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    (clear_session(jar), StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/verify-email/{token}", tag = "auth",
    params(("token" = String, Path, description = "Signed verification link token")),
    responses((status = 302, description = "Verified, redirect to the dashboard"), (status = 403, description = "Invalid or expired link"))
)]
pub async fn verify_email(State(state): State<ServerState>, Path(token): Path<String>) -> Result<Response, JsonApiError> {
    state.auth.verify_email(&token).await?;
    Ok(redirect(path_for("dashboard").unwrap_or("/dashboard")))
}

#[utoipa::path(
    post, path = "/email/verification-notification", tag = "auth",
    responses((status = 202, description = "Link sent"), (status = 204, description = "Already verified"), (status = 401, description = "Unauthorized"))
)]
pub async fn resend_verification(State(state): State<ServerState>, CurrentUser(user): CurrentUser) -> Result<Response, JsonApiError> {
    if user.is_verified() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    send_verification_link(&state, &user)?;
    Ok(StatusCode::ACCEPTED.into_response())
}

pub fn router() -> Router<ServerState> {
    let actions = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/verify-email/:token", get(verify_email));
    let authed = Router::new()
        .route("/email/verification-notification", post(resend_verification))
        .route_layer(middleware::from_fn_with_state(Policy::AUTHENTICATED, enforce));
    mount(AUTH_PAGES).merge(actions).merge(authed)
}
