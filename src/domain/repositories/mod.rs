//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to the per-aggregate repositories
//! - `ScooterRepository`: fleet reads plus the entry point for transactional updates
//! - `FleetTransaction`: one open unit of work over scooters, users and reservations
//! - `DomainResult`: standard result type for domain operations

use async_trait::async_trait;

use super::reservation::Reservation;
use super::scooter::{Location, ScooterView};
use super::user::UserRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) -> DomainResult<()> {
///     let scooter = repos.scooters().find_by_id("abc123").await?;
///     let user = repos.users().find_by_name("basic").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    fn scooters(&self) -> &dyn ScooterRepository;
    fn users(&self) -> &dyn UserRepository;

    /// Cheap round trip to the backing store
    async fn ping(&self) -> DomainResult<()>;
}

#[async_trait]
pub trait ScooterRepository: Send + Sync {
    /// All scooters with their active reservation, ordered by id
    async fn find_all(&self) -> DomainResult<Vec<ScooterView>>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ScooterView>>;

    /// The scooter the given user actively reserves
    async fn find_reserved_by(&self, user_id: &str) -> DomainResult<Option<ScooterView>>;

    /// Open a transaction. Dropping it without `commit` discards every
    /// staged write.
    async fn begin(&self) -> DomainResult<Box<dyn FleetTransaction>>;
}

/// A single atomic unit of work.
///
/// The `lock_*` methods must be called before reading state that a later
/// write depends on: they hold the touched rows until commit or rollback so
/// that two transitions on the same scooter or by the same user cannot
/// interleave.
#[async_trait]
pub trait FleetTransaction: Send {
    /// Lock the scooter row and load it with its active reservation.
    /// `None` when the scooter does not exist.
    async fn lock_scooter(&mut self, id: &str) -> DomainResult<Option<ScooterView>>;

    /// Lock the user row and load the user's active reservation.
    async fn lock_user_reservation(&mut self, user_id: &str) -> DomainResult<Option<Reservation>>;

    async fn update_battery(&mut self, scooter_id: &str, battery: i32) -> DomainResult<()>;

    async fn update_location(&mut self, scooter_id: &str, location: Location) -> DomainResult<()>;

    /// Insert a new active reservation. Fails with a reservation conflict if
    /// the scooter or the user already has one.
    async fn insert_reservation(&mut self, reservation: &Reservation) -> DomainResult<()>;

    /// End the active reservation of `reservation.scooter_id` held by
    /// `reservation.user_id`, stamping `reservation.ended_at`.
    async fn end_reservation(&mut self, reservation: &Reservation) -> DomainResult<()>;

    async fn commit(self: Box<Self>) -> DomainResult<()>;

    async fn rollback(self: Box<Self>) -> DomainResult<()>;
}
