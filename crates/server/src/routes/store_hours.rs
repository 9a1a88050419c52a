//! JSON API over store hours. Mounted behind `Policy::AUTH_VERIFIED`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use service::errors::ServiceError;
use service::pagination::Pagination;
use service::store_hours::domain::{StoreHoursInput, StoreHoursPatch, StoreHoursRecord};

use crate::errors::JsonApiError;
use crate::gate::{enforce, Policy};
use crate::state::ServerState;

/// Window listed when `to` is omitted.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// First day (inclusive), defaults to today (UTC)
    pub from: Option<NaiveDate>,
    /// Last day (inclusive), defaults to `from` plus 30 days
    pub to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let from = self.from.unwrap_or(today);
        let to = self
            .to
            .unwrap_or_else(|| from.checked_add_signed(Duration::days(DEFAULT_WINDOW_DAYS)).unwrap_or(NaiveDate::MAX));
        (from, to)
    }

    fn pagination(&self) -> Pagination {
        let default = Pagination::default();
        Pagination { page: self.page.unwrap_or(default.page), per_page: self.per_page.unwrap_or(default.per_page) }
    }
}

fn not_found() -> JsonApiError {
    ServiceError::not_found("store_hours").into()
}

#[utoipa::path(
    get, path = "/api/store-hours", tag = "store_hours",
    params(ListQuery),
    responses(
        (status = 200, description = "Records in range, ordered by date", body = [crate::openapi::StoreHoursDoc]),
        (status = 422, description = "Validation Error")
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Vec<StoreHoursRecord>>, JsonApiError> {
    let (from, to) = q.range(Utc::now().date_naive());
    let rows = state.store_hours.list_between(from, to, q.pagination()).await?;
    info!(%from, %to, count = rows.len(), "list store hours");
    Ok(Json(rows))
}

#[utoipa::path(
    post, path = "/api/store-hours", tag = "store_hours",
    request_body = crate::openapi::StoreHoursInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::StoreHoursDoc),
        (status = 409, description = "Date already has store hours"),
        (status = 422, description = "Validation Error")
    )
)]
pub async fn create(State(state): State<ServerState>, Json(input): Json<StoreHoursInput>) -> Result<(StatusCode, Json<StoreHoursRecord>), JsonApiError> {
    let rec = state.store_hours.create(input).await?;
    Ok((StatusCode::CREATED, Json(rec)))
}

#[utoipa::path(
    get, path = "/api/store-hours/{id}", tag = "store_hours",
    params(("id" = Uuid, Path, description = "Record id")),
    responses((status = 200, description = "Found", body = crate::openapi::StoreHoursDoc), (status = 404, description = "Not Found"))
)]
pub async fn get_one(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<StoreHoursRecord>, JsonApiError> {
    state.store_hours.get(id).await?.map(Json).ok_or_else(not_found)
}

#[utoipa::path(
    get, path = "/api/store-hours/by-date/{date}", tag = "store_hours",
    params(("date" = String, Path, description = "Calendar date, YYYY-MM-DD")),
    responses((status = 200, description = "Found", body = crate::openapi::StoreHoursDoc), (status = 404, description = "Not Found"))
)]
pub async fn by_date(State(state): State<ServerState>, Path(date): Path<NaiveDate>) -> Result<Json<StoreHoursRecord>, JsonApiError> {
    state.store_hours.find_by_date(date).await?.map(Json).ok_or_else(not_found)
}

#[utoipa::path(
    patch, path = "/api/store-hours/{id}", tag = "store_hours",
    params(("id" = Uuid, Path, description = "Record id")),
    request_body = crate::openapi::StoreHoursPatchDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::StoreHoursDoc),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Date already has store hours"),
        (status = 422, description = "Validation Error")
    )
)]
pub async fn update(State(state): State<ServerState>, Path(id): Path<Uuid>, Json(patch): Json<StoreHoursPatch>) -> Result<Json<StoreHoursRecord>, JsonApiError> {
    Ok(Json(state.store_hours.update(id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/store-hours/{id}", tag = "store_hours",
    params(("id" = Uuid, Path, description = "Record id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    state.store_hours.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/store-hours", get(list).post(create))
        .route("/api/store-hours/by-date/:date", get(by_date))
        .route("/api/store-hours/:id", get(get_one).patch(update).delete(delete))
        .route_layer(middleware::from_fn_with_state(Policy::AUTH_VERIFIED, enforce))
}
