//! Authentication HTTP handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::dto::LoginResponse;
use crate::application::IdentityService;
use crate::interfaces::http::common::{api_error, ApiResponse};
use crate::interfaces::http::middleware::{
    auth_error_response, parse_authorization, AuthError, Credentials,
};

#[derive(Clone)]
pub struct AuthHandlerState {
    pub identity: Arc<IdentityService>,
}

/// Exchange Basic credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(State(state): State<AuthHandlerState>, headers: HeaderMap) -> Response {
    let (name, password) = match parse_authorization(&headers) {
        Ok(Credentials::Basic { name, password }) => (name, password),
        Ok(Credentials::Bearer(_)) => return auth_error_response(AuthError::UnsupportedScheme),
        Err(e) => return auth_error_response(e),
    };

    match state.identity.login(&name, &password).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ApiResponse::success(LoginResponse::from(result))),
        )
            .into_response(),
        Err(e) if e.is_client_error() => auth_error_response(AuthError::InvalidCredentials),
        Err(e) => api_error::<LoginResponse>(e).into_response(),
    }
}
