//! Authentication middleware for Axum
//!
//! Accepts `Authorization: Basic base64(name:secret)` or
//! `Authorization: Bearer <jwt>`. On success the resolved user is stored in
//! request extensions as [`AuthenticatedUser`].

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::application::IdentityService;
use crate::domain::User;
use crate::interfaces::http::common::{api_error, ApiResponse};

/// Challenge sent with every 401
pub const AUTH_CHALLENGE: &str = "Basic realm=\"scooters\", charset=\"UTF-8\"";

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingCredentials,
    UnsupportedScheme,
    MalformedCredentials,
    InvalidCredentials,
    InvalidToken,
}

/// Authentication state
#[derive(Clone)]
pub struct AuthState {
    pub identity: Arc<IdentityService>,
}

/// The user a request was authenticated as
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub User);

/// Credentials carried by an `Authorization` header
#[derive(Debug, PartialEq)]
pub enum Credentials {
    Basic { name: String, password: String },
    Bearer(String),
}

/// Parse the `Authorization` header.
pub fn parse_authorization(headers: &HeaderMap) -> Result<Credentials, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredentials)?;

    if let Some(encoded) = value.strip_prefix("Basic ") {
        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::MalformedCredentials)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;
        let (name, password) = decoded
            .split_once(':')
            .ok_or(AuthError::MalformedCredentials)?;
        return Ok(Credentials::Basic {
            name: name.to_string(),
            password: password.to_string(),
        });
    }

    if let Some(token) = value.strip_prefix("Bearer ") {
        return Ok(Credentials::Bearer(token.trim().to_string()));
    }

    Err(AuthError::UnsupportedScheme)
}

/// Basic / Bearer authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let credentials = match parse_authorization(request.headers()) {
        Ok(c) => c,
        Err(e) => return auth_error_response(e),
    };

    let resolved = match credentials {
        Credentials::Basic { name, password } => auth_state
            .identity
            .authenticate_basic(&name, &password)
            .await
            .map_err(|e| (e, AuthError::InvalidCredentials)),
        Credentials::Bearer(token) => auth_state
            .identity
            .authenticate_bearer(&token)
            .await
            .map_err(|e| (e, AuthError::InvalidToken)),
    };

    match resolved {
        Ok(user) => {
            request.extensions_mut().insert(AuthenticatedUser(user));
            next.run(request).await
        }
        Err((e, kind)) if e.is_client_error() => {
            debug!(error = %e, "Authentication rejected");
            auth_error_response(kind)
        }
        Err((e, _)) => api_error::<()>(e).into_response(),
    }
}

pub fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingCredentials => "Missing authentication credentials",
        AuthError::UnsupportedScheme => "Unsupported authentication scheme",
        AuthError::MalformedCredentials => "Malformed authentication credentials",
        AuthError::InvalidCredentials => "Invalid credentials",
        AuthError::InvalidToken => "Invalid authentication token",
    };

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, AUTH_CHALLENGE)],
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}
