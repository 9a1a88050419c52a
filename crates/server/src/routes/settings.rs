use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Response,
    routing::{get, patch, put},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::info;

use service::auth::domain::{AuthUser, PasswordUpdate, ProfileUpdate};

use crate::errors::JsonApiError;
use crate::gate::{enforce, CurrentUser, Policy};
use crate::inertia::redirect;
use crate::pages::{mount, path_for, PageRoute};
use crate::routes::auth::clear_session;
use crate::state::ServerState;

pub const SETTINGS_PAGES: &[PageRoute] = &[
    PageRoute { name: "profile.edit", path: "/settings/profile", view: "settings/Profile", policy: Policy::AUTHENTICATED },
    PageRoute { name: "password.edit", path: "/settings/password", view: "settings/Password", policy: Policy::AUTHENTICATED },
    PageRoute { name: "appearance", path: "/settings/appearance", view: "settings/Appearance", policy: Policy::AUTHENTICATED },
];

#[derive(Debug, Deserialize)]
pub struct DeleteAccountInput {
    pub password: String,
}

async fn settings_root() -> Response {
    redirect(path_for("profile.edit").unwrap_or("/settings/profile"))
}

#[utoipa::path(
    patch, path = "/settings/profile", tag = "settings",
    request_body = crate::openapi::ProfileUpdateRequest,
    responses((status = 200, description = "Updated"), (status = 401, description = "Unauthorized"), (status = 409, description = "Email taken"), (status = 422, description = "Validation Error"))
)]
pub async fn update_profile(State(state): State<ServerState>, CurrentUser(user): CurrentUser, Json(input): Json<ProfileUpdate>) -> Result<Json<AuthUser>, JsonApiError> {
    let updated = state.auth.update_profile(user.id, input).await?;
    if updated.email != user.email {
        info!(user_id = %user.id, "email changed, verification required again");
    }
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/settings/profile", tag = "settings",
    request_body = crate::openapi::DeleteAccountRequest,
    responses((status = 204, description = "Deleted, session cleared"), (status = 401, description = "Unauthorized or wrong password"))
)]
pub async fn delete_account(State(state): State<ServerState>, CurrentUser(user): CurrentUser, jar: CookieJar, Json(input): Json<DeleteAccountInput>) -> Result<(CookieJar, StatusCode), JsonApiError> {
    state.auth.delete_account(user.id, &input.password).await?;
    Ok((clear_session(jar), StatusCode::NO_CONTENT))
}

#[utoipa::path(
    put, path = "/settings/password", tag = "settings",
    request_body = crate::openapi::PasswordUpdateRequest,
    responses((status = 204, description = "Updated"), (status = 401, description = "Unauthorized or wrong current password"), (status = 422, description = "Validation Error"))
)]
pub async fn update_password(State(state): State<ServerState>, CurrentUser(user): CurrentUser, Json(input): Json<PasswordUpdate>) -> Result<StatusCode, JsonApiError> {
    state.auth.update_password(user.id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<ServerState> {
    let actions = Router::new()
        .route("/settings", get(settings_root))
        .route("/settings/profile", patch(update_profile).delete(delete_account))
        .route("/settings/password", put(update_password))
        .route_layer(middleware::from_fn_with_state(Policy::AUTHENTICATED, enforce));
    mount(SETTINGS_PAGES).merge(actions)
}
