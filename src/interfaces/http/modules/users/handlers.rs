//! User HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::{Extension, Json};

use super::dto::UserDto;
use crate::application::IdentityService;
use crate::interfaces::http::common::{api_error, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct UserHandlerState {
    pub identity: Arc<IdentityService>,
}

#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "Users",
    security(("basic_auth" = []), ("bearer_auth" = [])),
    params(("id" = String, Path, description = "Caller's own user ID or name")),
    responses(
        (status = 200, description = "Caller's profile", body = ApiResponse<UserDto>),
        (status = 401, description = "Not authenticated, or another user's profile")
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
    Extension(AuthenticatedUser(caller)): Extension<AuthenticatedUser>,
) -> ApiResult<UserDto> {
    let user = state.identity.profile(&caller, &id).map_err(api_error)?;
    Ok(Json(ApiResponse::success(user.into())))
}
