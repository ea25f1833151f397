//! Identity service: application-layer authentication
//!
//! HTTP middleware resolves every request's credentials through this
//! service; handlers never touch password hashes or tokens directly.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{DomainError, DomainResult, RepositoryProvider, User};
use crate::infrastructure::crypto::jwt::{create_token, verify_token, JwtConfig};
use crate::infrastructure::crypto::password::verify_password;

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

pub struct IdentityService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
}

impl IdentityService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig) -> Self {
        Self { repos, jwt_config }
    }

    // ── Authentication ──────────────────────────────────────────

    /// Resolve HTTP Basic credentials (user name + secret) to a user.
    pub async fn authenticate_basic(&self, name: &str, password: &str) -> DomainResult<User> {
        let Some(user) = self.repos.users().find_by_name(name).await? else {
            debug!(name, "Unknown user");
            return Err(invalid_credentials());
        };

        // bcrypt is CPU-bound; keep it off the async workers.
        // A malformed stored hash counts as a failed match.
        let candidate = password.to_owned();
        let hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || {
            verify_password(&candidate, &hash).unwrap_or(false)
        })
        .await
        .map_err(|e| DomainError::Storage(format!("Password check failed: {}", e)))?;
        if !valid {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(invalid_credentials());
        }

        Ok(user)
    }

    /// Resolve a bearer token issued by [`IdentityService::login`] to a user.
    pub async fn authenticate_bearer(&self, token: &str) -> DomainResult<User> {
        let claims = verify_token(token, &self.jwt_config)
            .map_err(|e| DomainError::Unauthenticated(format!("Invalid token: {}", e)))?;

        self.repos
            .users()
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| DomainError::Unauthenticated("Token subject no longer exists".into()))
    }

    /// Check Basic credentials and issue a JWT for them.
    pub async fn login(&self, name: &str, password: &str) -> DomainResult<AuthResult> {
        let user = self.authenticate_basic(name, password).await?;

        let token = create_token(&user.id, &user.name, &self.jwt_config)
            .map_err(|e| DomainError::Storage(format!("Failed to create token: {}", e)))?;

        info!(user_id = %user.id, "User logged in");
        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Profile lookup. Users may only read their own record, addressed by
    /// id or by name.
    pub fn profile(&self, caller: &User, id_or_name: &str) -> DomainResult<User> {
        if caller.is_identified_by(id_or_name) {
            Ok(caller.clone())
        } else {
            Err(DomainError::Unauthorized(
                "Cannot access another user's profile".into(),
            ))
        }
    }
}

fn invalid_credentials() -> DomainError {
    DomainError::Unauthenticated("Invalid credentials".into())
}

// ── Tests ──────────────────────────────────────────────────────
