use async_trait::async_trait;

use super::User;
use crate::domain::DomainResult;

/// Read access to the user directory
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;

    /// Look up a user by login name
    async fn find_by_name(&self, name: &str) -> DomainResult<Option<User>>;
}
