//! Scooter HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};

use crate::application::FleetService;
use crate::interfaces::http::common::{api_error, ApiResponse, ApiResult, JsonBody};
use crate::interfaces::http::middleware::AuthenticatedUser;

use super::dto::*;

/// Application state for scooter handlers.
#[derive(Clone)]
pub struct ScooterAppState {
    pub fleet: Arc<FleetService>,
}

#[utoipa::path(
    get,
    path = "/scooter",
    tag = "Scooters",
    security(("basic_auth" = []), ("bearer_auth" = [])),
    params(ScooterQuery),
    responses(
        (status = 200, description = "Scooters ordered by id", body = ApiResponse<Vec<ScooterDto>>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User holds no scooter")
    )
)]
pub async fn list_scooters(
    State(state): State<ScooterAppState>,
    Query(query): Query<ScooterQuery>,
) -> ApiResult<Vec<ScooterDto>> {
    // `?user=` with no value lists the whole fleet
    let views = match query.user.filter(|u| !u.is_empty()) {
        Some(user_id) => vec![state
            .fleet
            .get_scooter_for_user(&user_id)
            .await
            .map_err(api_error)?],
        None => state.fleet.list_scooters().await.map_err(api_error)?,
    };

    Ok(Json(ApiResponse::success(
        views.into_iter().map(ScooterDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/scooter/{id}",
    tag = "Scooters",
    security(("basic_auth" = []), ("bearer_auth" = [])),
    params(("id" = String, Path, description = "Scooter ID")),
    responses(
        (status = 200, description = "Scooter", body = ApiResponse<ScooterDto>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown scooter")
    )
)]
pub async fn get_scooter(
    State(state): State<ScooterAppState>,
    Path(id): Path<String>,
) -> ApiResult<ScooterDto> {
    let view = state.fleet.get_scooter(&id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(view.into())))
}

/// Apply a partial update. `reserved` acts on behalf of the caller.
#[utoipa::path(
    patch,
    path = "/scooter/{id}",
    tag = "Scooters",
    security(("basic_auth" = []), ("bearer_auth" = [])),
    params(("id" = String, Path, description = "Scooter ID")),
    request_body = UpdateScooterRequest,
    responses(
        (status = 200, description = "Updated scooter", body = ApiResponse<ScooterDto>),
        (status = 400, description = "Invalid field or illegal reservation change"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown scooter")
    )
)]
pub async fn update_scooter(
    State(state): State<ScooterAppState>,
    Path(id): Path<String>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    JsonBody(request): JsonBody<UpdateScooterRequest>,
) -> ApiResult<ScooterDto> {
    let view = state
        .fleet
        .apply_update(&id, &user, request.into())
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(view.into())))
}
