//! JSON body extractor for Axum
//!
//! `JsonBody<T>` works like `axum::Json<T>`, but every rejection (syntax
//! error, wrong field type, missing content type) becomes a 400 response in
//! the standard envelope. Field-level rules are checked by the domain.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;

use super::ApiResponse;

/// An extractor that deserializes a JSON request body.
///
/// ```ignore
/// async fn handler(JsonBody(body): JsonBody<UpdateScooterRequest>) {
///     // `body` is well-formed, not yet validated
/// }
/// ```
pub struct JsonBody<T>(pub T);

/// Rejection for `JsonBody` extraction failures.
pub struct JsonBodyRejection(JsonRejection);

impl IntoResponse for JsonBodyRejection {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::error(format!("Invalid JSON: {}", self.0.body_text()));
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonBodyRejection;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(JsonBodyRejection)?;

        Ok(JsonBody(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────
