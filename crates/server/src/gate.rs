//! Capability gates.
//!
//! [`authenticate`] runs on every request and leaves a [`Viewer`] in the
//! request extensions. [`enforce`] is mounted per route with the route's
//! [`Policy`] and turns a missing capability into a redirect (browsers) or a
//! JSON error (API clients).

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use service::auth::domain::AuthUser;

use crate::inertia::redirect;
use crate::pages::path_for;
use crate::state::ServerState;

pub const SESSION_COOKIE: &str = "auth_token";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    Authenticated,
    Verified,
}

/// Capabilities a route requires, checked in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Policy(pub &'static [Capability]);

impl Policy {
    pub const PUBLIC: Policy = Policy(&[]);
    pub const AUTHENTICATED: Policy = Policy(&[Capability::Authenticated]);
    pub const AUTH_VERIFIED: Policy = Policy(&[Capability::Authenticated, Capability::Verified]);

    pub fn is_public(&self) -> bool {
        self.0.is_empty()
    }

    pub fn check(&self, viewer: &Viewer) -> Result<(), Denied> {
        for cap in self.0 {
            match (cap, viewer.user()) {
                (_, None) => return Err(Denied::Unauthenticated),
                (Capability::Verified, Some(user)) if !user.is_verified() => return Err(Denied::Unverified),
                _ => {}
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denied {
    Unauthenticated,
    Unverified,
}

impl Denied {
    pub fn respond(self, json: bool) -> Response {
        match (self, json) {
            (Denied::Unauthenticated, true) => {
                (StatusCode::UNAUTHORIZED, Json(serde_json::json!({"message": "Unauthenticated."}))).into_response()
            }
            (Denied::Unverified, true) => {
                (StatusCode::FORBIDDEN, Json(serde_json::json!({"message": "Your email address is not verified."}))).into_response()
            }
            (Denied::Unauthenticated, false) => redirect(path_for("login").unwrap_or("/login")),
            (Denied::Unverified, false) => redirect(path_for("verification.notice").unwrap_or("/verify-email")),
        }
    }
}

/// Who is making the request.
#[derive(Clone, Debug, Default)]
pub enum Viewer {
    #[default]
    Guest,
    User(AuthUser),
}

impl Viewer {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Viewer::Guest => None,
            Viewer::User(u) => Some(u),
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Viewer>().cloned().unwrap_or_default())
    }
}

/// The signed-in user; guests are rejected like an `AUTHENTICATED` route would.
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Viewer>() {
            Some(Viewer::User(user)) => Ok(CurrentUser(user.clone())),
            _ => Err(Denied::Unauthenticated.respond(wants_json(&parts.headers, parts.uri.path()))),
        }
    }
}

/// API clients get JSON errors instead of redirects.
pub fn wants_json(headers: &HeaderMap, path: &str) -> bool {
    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);
    accepts_json || path.starts_with("/api/")
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|t| t.trim().to_string())
}

/// Resolve the viewer from `Authorization: Bearer` or the session cookie.
pub async fn authenticate(State(state): State<ServerState>, jar: CookieJar, mut req: Request, next: Next) -> Response {
    let token = bearer_token(req.headers()).or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()));
    let viewer = match token {
        None => Viewer::Guest,
        Some(token) => match state.auth.resolve_session(&token).await {
            Ok(user) => Viewer::User(user),
            Err(e) => {
                warn!(path = %req.uri().path(), error = %e, "session token rejected, treating request as guest");
                Viewer::Guest
            }
        },
    };
    req.extensions_mut().insert(viewer);
    next.run(req).await
}

/// Per-route policy check, mounted with `middleware::from_fn_with_state(policy, enforce)`.
pub async fn enforce(State(policy): State<Policy>, req: Request, next: Next) -> Response {
    let viewer = req.extensions().get::<Viewer>().cloned().unwrap_or_default();
    match policy.check(&viewer) {
        Ok(()) => next.run(req).await,
        Err(denied) => {
            debug!(path = %req.uri().path(), ?denied, "capability gate denied request");
            denied.respond(wants_json(req.headers(), req.uri().path()))
        }
    }
}
