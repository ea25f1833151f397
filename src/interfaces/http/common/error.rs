//! Mapping of domain errors onto HTTP responses

use axum::http::StatusCode;
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::shared::DomainError;

/// Error half of every handler result
pub type ApiError<T> = (StatusCode, Json<ApiResponse<T>>);

/// Handler result carrying the response envelope on both sides
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError<T>>;

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) | DomainError::Reservation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Unauthenticated(_) | DomainError::Unauthorized(_) => {
            StatusCode::UNAUTHORIZED
        }
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert a domain error into a status and envelope.
///
/// Storage failures are logged and answered with a generic message.
pub fn api_error<T>(err: DomainError) -> ApiError<T> {
    let status = status_for(&err);
    let message = if err.is_client_error() {
        err.to_string()
    } else {
        error!(error = %err, "Request failed on storage");
        "Internal server error".to_string()
    };
    (status, Json(ApiResponse::error(message)))
}
