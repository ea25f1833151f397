//! In-memory fleet store for development and testing
//!
//! All state lives in one arena behind an async mutex. A transaction holds
//! the mutex for its whole lifetime and works on a private copy of the
//! arena; commit writes the copy back, rollback (or drop) discards it.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    DomainError, DomainResult, FleetTransaction, Location, RepositoryProvider, Reservation,
    ReservationConflict, Scooter, ScooterRepository, ScooterView, User, UserRepository,
};
use crate::infrastructure::database::FleetSeed;

#[derive(Debug, Clone, Default)]
struct FleetArena {
    scooters: BTreeMap<String, Scooter>,
    users: BTreeMap<String, User>,
    /// Full history, in insertion order
    reservations: Vec<Reservation>,
}

impl FleetArena {
    fn active_for_scooter(&self, scooter_id: &str) -> Option<&Reservation> {
        self.reservations
            .iter()
            .find(|r| r.is_active() && r.is_for(scooter_id))
    }

    fn active_for_user(&self, user_id: &str) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.is_held_by(user_id))
    }

    fn view(&self, scooter: &Scooter) -> ScooterView {
        ScooterView::new(
            scooter.clone(),
            self.active_for_scooter(&scooter.id).cloned(),
        )
    }
}

type SharedArena = Arc<Mutex<FleetArena>>;

/// In-memory implementation of every repository
pub struct InMemoryRepositoryProvider {
    arena: SharedArena,
    scooters: InMemoryScooterRepository,
    users: InMemoryUserRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::with_arena(FleetArena::default())
    }

    pub fn from_seed(seed: &FleetSeed) -> Self {
        let mut arena = FleetArena::default();
        for s in &seed.scooters {
            arena.scooters.insert(s.id.clone(), s.clone());
        }
        for u in &seed.users {
            arena.users.insert(u.id.clone(), u.clone());
        }
        arena.reservations.extend(seed.reservations.iter().cloned());
        Self::with_arena(arena)
    }

    fn with_arena(arena: FleetArena) -> Self {
        let arena = Arc::new(Mutex::new(arena));
        Self {
            scooters: InMemoryScooterRepository {
                arena: arena.clone(),
            },
            users: InMemoryUserRepository {
                arena: arena.clone(),
            },
            arena,
        }
    }

    pub async fn add_scooter(&self, scooter: Scooter) {
        self.arena
            .lock()
            .await
            .scooters
            .insert(scooter.id.clone(), scooter);
    }

    pub async fn add_user(&self, user: User) {
        self.arena.lock().await.users.insert(user.id.clone(), user);
    }

    /// Append a reservation as-is, without any rule checks.
    pub async fn add_reservation(&self, reservation: Reservation) {
        self.arena.lock().await.reservations.push(reservation);
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepositoryProvider for InMemoryRepositoryProvider {
    fn scooters(&self) -> &dyn ScooterRepository {
        &self.scooters
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}

// ── Scooters ────────────────────────────────────────────────────

pub struct InMemoryScooterRepository {
    arena: SharedArena,
}

#[async_trait]
impl ScooterRepository for InMemoryScooterRepository {
    async fn find_all(&self) -> DomainResult<Vec<ScooterView>> {
        let arena = self.arena.lock().await;
        Ok(arena.scooters.values().map(|s| arena.view(s)).collect())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ScooterView>> {
        let arena = self.arena.lock().await;
        Ok(arena.scooters.get(id).map(|s| arena.view(s)))
    }

    async fn find_reserved_by(&self, user_id: &str) -> DomainResult<Option<ScooterView>> {
        let arena = self.arena.lock().await;
        let Some(held) = arena.active_for_user(user_id) else {
            return Ok(None);
        };
        Ok(arena
            .scooters
            .get(&held.scooter_id)
            .map(|s| ScooterView::new(s.clone(), Some(held.clone()))))
    }

    async fn begin(&self) -> DomainResult<Box<dyn FleetTransaction>> {
        let guard = self.arena.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryFleetTransaction { guard, working }))
    }
}

// ── Users ───────────────────────────────────────────────────────

pub struct InMemoryUserRepository {
    arena: SharedArena,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.arena.lock().await.users.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<User>> {
        let arena = self.arena.lock().await;
        Ok(arena.users.values().find(|u| u.name == name).cloned())
    }
}

// ── Transactions ────────────────────────────────────────────────

pub struct InMemoryFleetTransaction {
    guard: OwnedMutexGuard<FleetArena>,
    working: FleetArena,
}

impl InMemoryFleetTransaction {
    fn scooter_mut(&mut self, id: &str) -> DomainResult<&mut Scooter> {
        self.working
            .scooters
            .get_mut(id)
            .ok_or_else(|| DomainError::scooter_not_found(id))
    }
}

#[async_trait]
impl FleetTransaction for InMemoryFleetTransaction {
    async fn lock_scooter(&mut self, id: &str) -> DomainResult<Option<ScooterView>> {
        Ok(self.working.scooters.get(id).map(|s| self.working.view(s)))
    }

    async fn lock_user_reservation(&mut self, user_id: &str) -> DomainResult<Option<Reservation>> {
        if !self.working.users.contains_key(user_id) {
            return Err(DomainError::user_not_found(user_id));
        }
        Ok(self.working.active_for_user(user_id).cloned())
    }

    async fn update_battery(&mut self, scooter_id: &str, battery: i32) -> DomainResult<()> {
        self.scooter_mut(scooter_id)?.battery = battery;
        Ok(())
    }

    async fn update_location(&mut self, scooter_id: &str, location: Location) -> DomainResult<()> {
        self.scooter_mut(scooter_id)?.location = location;
        Ok(())
    }

    async fn insert_reservation(&mut self, reservation: &Reservation) -> DomainResult<()> {
        if self
            .working
            .active_for_scooter(&reservation.scooter_id)
            .is_some()
        {
            return Err(ReservationConflict::AlreadyReserved {
                scooter_id: reservation.scooter_id.clone(),
            }
            .into());
        }
        if self.working.active_for_user(&reservation.user_id).is_some() {
            let user = self
                .working
                .users
                .get(&reservation.user_id)
                .map_or_else(|| reservation.user_id.clone(), |u| u.name.clone());
            return Err(ReservationConflict::UserAlreadyReserving { user }.into());
        }

        self.working.reservations.push(reservation.clone());
        Ok(())
    }

    async fn end_reservation(&mut self, reservation: &Reservation) -> DomainResult<()> {
        let Some(active) = self.working.reservations.iter_mut().find(|r| {
            r.is_held_by(&reservation.user_id) && r.is_for(&reservation.scooter_id)
        }) else {
            return Err(DomainError::Storage(format!(
                "no active reservation of {} by {}",
                reservation.scooter_id, reservation.user_id
            )));
        };

        active.ended_at = Some(reservation.ended_at.unwrap_or(active.started_at));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DomainResult<()> {
        let InMemoryFleetTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DomainResult<()> {
        Ok(())
    }
}
