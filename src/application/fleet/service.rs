//! Fleet service: scooter queries and the update orchestrator
//!
//! A partial update is applied as one transaction: the scooter row (and the
//! requesting user's row when the reservation changes) is locked, every
//! present field is validated and staged in the order battery, reservation,
//! location, and the whole set is committed at once. Any rejection rolls the
//! transaction back, so no earlier staged write survives.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::reservation::{self, ReservationChange, ReservationIntent};
use crate::domain::scooter::{validate_battery, validate_location};
use crate::domain::{
    DomainError, DomainResult, FleetTransaction, RepositoryProvider, ScooterPatch, ScooterView,
    User,
};

/// Outcome of a staged update, before commit
struct StagedUpdate {
    view: ScooterView,
    change: Option<ReservationChange>,
}

pub struct FleetService {
    repos: Arc<dyn RepositoryProvider>,
}

impl FleetService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list_scooters(&self) -> DomainResult<Vec<ScooterView>> {
        self.repos.scooters().find_all().await
    }

    pub async fn get_scooter(&self, id: &str) -> DomainResult<ScooterView> {
        self.repos
            .scooters()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::scooter_not_found(id))
    }

    /// The scooter `user_id` currently holds.
    pub async fn get_scooter_for_user(&self, user_id: &str) -> DomainResult<ScooterView> {
        self.repos
            .scooters()
            .find_reserved_by(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Scooter",
                field: "reserved_by",
                value: user_id.to_string(),
            })
    }

    // ── Commands ────────────────────────────────────────────────

    /// Apply `patch` to scooter `scooter_id` on behalf of `user`.
    ///
    /// Returns the scooter as committed by this update.
    pub async fn apply_update(
        &self,
        scooter_id: &str,
        user: &User,
        patch: ScooterPatch,
    ) -> DomainResult<ScooterView> {
        self.apply_update_at(scooter_id, user, patch, Utc::now()).await
    }

    pub async fn apply_update_at(
        &self,
        scooter_id: &str,
        user: &User,
        patch: ScooterPatch,
        now: DateTime<Utc>,
    ) -> DomainResult<ScooterView> {
        // Nothing to stage, so nothing to lock
        if patch.is_empty() {
            return self.get_scooter(scooter_id).await;
        }

        let mut tx = self.repos.scooters().begin().await?;

        let staged = match stage_update(tx.as_mut(), scooter_id, user, patch, now).await {
            Ok(staged) => staged,
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(scooter_id, error = %rollback_err, "Rollback failed");
                }
                debug!(scooter_id, user_id = %user.id, error = %e, "Scooter update rejected");
                return Err(e);
            }
        };

        tx.commit().await?;

        if let Some(change) = &staged.change {
            let action = change.intent().as_str();
            metrics::counter!("scooter_reservations_total", "action" => action).increment(1);
            info!(scooter_id, user_id = %user.id, action, "Reservation updated");
        }
        debug!(scooter_id, "Scooter update committed");

        Ok(staged.view)
    }
}

async fn stage_update(
    tx: &mut dyn FleetTransaction,
    scooter_id: &str,
    user: &User,
    patch: ScooterPatch,
    now: DateTime<Utc>,
) -> DomainResult<StagedUpdate> {
    let Some(mut view) = tx.lock_scooter(scooter_id).await? else {
        return Err(DomainError::scooter_not_found(scooter_id));
    };

    if let Some(level) = patch.battery.require("battery")? {
        let battery = validate_battery(level)?;
        tx.update_battery(scooter_id, battery).await?;
        view.scooter.battery = battery;
    }

    let mut change = None;
    if let Some(reserved) = patch.reserved.require("reserved")? {
        let held = tx.lock_user_reservation(&user.id).await?;
        let decided = reservation::transition(
            ReservationIntent::from(reserved),
            user,
            &view,
            held.as_ref(),
            now,
        )?;

        match &decided {
            ReservationChange::Started(r) => {
                tx.insert_reservation(r).await?;
                view.reservation = Some(r.clone());
            }
            ReservationChange::Ended(r) => {
                tx.end_reservation(r).await?;
                view.reservation = None;
            }
        }
        change = Some(decided);
    }

    if let Some(location) = patch.location.require("location")? {
        validate_location(&location)?;
        tx.update_location(scooter_id, location).await?;
        view.scooter.location = location;
    }

    Ok(StagedUpdate { view, change })
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reservation::ReservationConflict;
    use crate::domain::scooter::{Location, LocationAxis, Scooter, ValidationError};
    use crate::domain::Reservation;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::shared::Patch;

    struct Fixture {
        repos: Arc<InMemoryRepositoryProvider>,
        service: FleetService,
        u1: User,
        u2: User,
    }

    async fn fixture() -> Fixture {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        repos
            .add_scooter(Scooter::new("S1", 80, Location::new(49.26, -123.14)))
            .await;
        repos
            .add_scooter(Scooter::new("S2", 50, Location::new(49.27, -123.13)))
            .await;

        let u1 = User::new("a1", "pay2go", "hash");
        let u2 = User::new("b2", "basic", "hash");
        repos.add_user(u1.clone()).await;
        repos.add_user(u2.clone()).await;

        let service = FleetService::new(repos.clone());
        Fixture {
            repos,
            service,
            u1,
            u2,
        }
    }

    fn conflict(result: DomainResult<ScooterView>) -> ReservationConflict {
        match result {
            Err(DomainError::Reservation(c)) => c,
            other => panic!("expected reservation conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn battery_round_trip_leaves_other_fields() {
        let f = fixture().await;
        let before = f.service.get_scooter("S1").await.unwrap();

        let updated = f
            .service
            .apply_update("S1", &f.u1, ScooterPatch::battery(42))
            .await
            .unwrap();
        assert_eq!(updated.scooter.battery, 42);

        let after = f.service.get_scooter("S1").await.unwrap();
        assert_eq!(after.scooter.battery, 42);
        assert_eq!(after.scooter.location, before.scooter.location);
        assert_eq!(after.reservation, before.reservation);
    }

    #[tokio::test]
    async fn battery_accepted_iff_in_range() {
        let f = fixture().await;
        for level in [-50, -1, 0, 1, 99, 100, 101, 250] {
            let result = f
                .service
                .apply_update("S1", &f.u1, ScooterPatch::battery(level))
                .await;
            let stored = f.service.get_scooter("S1").await.unwrap().scooter.battery;

            if (0..=100).contains(&level) {
                assert_eq!(result.unwrap().scooter.battery, level as i32);
                assert_eq!(stored, level as i32);
            } else {
                assert_eq!(
                    result.unwrap_err(),
                    DomainError::Validation(ValidationError::InvalidBattery(level))
                );
                assert_ne!(stored, level as i32);
            }
        }
    }

    #[tokio::test]
    async fn unknown_scooter_is_not_found() {
        let f = fixture().await;
        let err = f
            .service
            .apply_update("nope", &f.u1, ScooterPatch::battery(10))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Scooter", .. }));

        assert!(matches!(
            f.service.get_scooter("nope").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn null_field_is_rejected() {
        let f = fixture().await;
        let patch = ScooterPatch {
            battery: Patch::Null,
            ..ScooterPatch::default()
        };
        let err = f.service.apply_update("S1", &f.u1, patch).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation(ValidationError::NullField("battery"))
        );
    }

    #[tokio::test]
    async fn location_error_names_axis() {
        let f = fixture().await;
        let err = f
            .service
            .apply_update(
                "S1",
                &f.u1,
                ScooterPatch::location(Location::new(10.0, 200.0)),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation(ValidationError::InvalidLocation(LocationAxis::Longitude))
        );

        let moved = f
            .service
            .apply_update(
                "S1",
                &f.u1,
                ScooterPatch::location(Location::new(-170.0, 170.0)),
            )
            .await
            .unwrap();
        assert_eq!(moved.scooter.location, Location::new(-170.0, 170.0));
    }

    #[tokio::test]
    async fn reserve_release_scenario() {
        let f = fixture().await;

        let reserved = f
            .service
            .apply_update("S1", &f.u1, ScooterPatch::reserve())
            .await
            .unwrap();
        assert!(reserved.is_reserved());
        assert_eq!(reserved.holder(), Some("a1"));
        assert_eq!(
            f.service.get_scooter_for_user("a1").await.unwrap().id(),
            "S1"
        );

        let c = conflict(
            f.service
                .apply_update("S1", &f.u2, ScooterPatch::reserve())
                .await,
        );
        assert!(matches!(c, ReservationConflict::AlreadyReserved { .. }));

        let released = f
            .service
            .apply_update("S1", &f.u1, ScooterPatch::release())
            .await
            .unwrap();
        assert!(!released.is_reserved());
        assert!(f.service.get_scooter_for_user("a1").await.is_err());

        let taken = f
            .service
            .apply_update("S1", &f.u2, ScooterPatch::reserve())
            .await
            .unwrap();
        assert_eq!(taken.holder(), Some("b2"));
    }

    #[tokio::test]
    async fn start_time_is_recorded() {
        let f = fixture().await;
        let now = Utc::now();
        let view = f
            .service
            .apply_update_at("S2", &f.u1, ScooterPatch::reserve(), now)
            .await
            .unwrap();
        assert_eq!(view.reservation.unwrap().started_at, now);

        let stored = f.service.get_scooter("S2").await.unwrap();
        assert_eq!(stored.reservation.unwrap().started_at, now);
    }

    #[tokio::test]
    async fn user_holds_at_most_one_scooter() {
        let f = fixture().await;
        f.service
            .apply_update("S1", &f.u1, ScooterPatch::reserve())
            .await
            .unwrap();

        let c = conflict(
            f.service
                .apply_update("S2", &f.u1, ScooterPatch::reserve())
                .await,
        );
        assert_eq!(
            c,
            ReservationConflict::UserAlreadyReserving {
                user: "pay2go".into()
            }
        );

        let reserved: Vec<_> = f
            .service
            .list_scooters()
            .await
            .unwrap()
            .into_iter()
            .filter(|v| v.holder() == Some("a1"))
            .collect();
        assert_eq!(reserved.len(), 1);
    }

    #[tokio::test]
    async fn release_rules() {
        let f = fixture().await;

        let c = conflict(
            f.service
                .apply_update("S1", &f.u1, ScooterPatch::release())
                .await,
        );
        assert!(matches!(c, ReservationConflict::NotReserved { .. }));

        f.service
            .apply_update("S1", &f.u1, ScooterPatch::reserve())
            .await
            .unwrap();
        let c = conflict(
            f.service
                .apply_update("S1", &f.u2, ScooterPatch::release())
                .await,
        );
        assert!(matches!(c, ReservationConflict::NotOwner { .. }));

        // Owner still holds it
        assert_eq!(
            f.service.get_scooter("S1").await.unwrap().holder(),
            Some("a1")
        );
    }

    #[tokio::test]
    async fn failing_location_rolls_back_earlier_fields() {
        let f = fixture().await;
        let patch = ScooterPatch {
            battery: Patch::Value(5),
            reserved: Patch::Value(true),
            location: Patch::Value(Location::new(500.0, 0.0)),
        };

        let err = f.service.apply_update("S1", &f.u1, patch).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let after = f.service.get_scooter("S1").await.unwrap();
        assert_eq!(after.scooter.battery, 80);
        assert!(!after.is_reserved());
        assert!(f.service.get_scooter_for_user("a1").await.is_err());
    }

    #[tokio::test]
    async fn failing_reservation_rolls_back_battery() {
        let f = fixture().await;
        let patch = ScooterPatch {
            battery: Patch::Value(5),
            reserved: Patch::Value(false),
            ..ScooterPatch::default()
        };

        let c = conflict(f.service.apply_update("S1", &f.u1, patch).await);
        assert!(matches!(c, ReservationConflict::NotReserved { .. }));
        assert_eq!(f.service.get_scooter("S1").await.unwrap().scooter.battery, 80);
    }

    #[tokio::test]
    async fn combined_update_applies_every_field() {
        let f = fixture().await;
        let patch = ScooterPatch {
            battery: Patch::Value(33),
            reserved: Patch::Value(true),
            location: Patch::Value(Location::new(1.0, 2.0)),
        };

        let view = f.service.apply_update("S2", &f.u2, patch).await.unwrap();
        assert_eq!(view.scooter.battery, 33);
        assert_eq!(view.scooter.location, Location::new(1.0, 2.0));
        assert_eq!(view.holder(), Some("b2"));

        assert_eq!(f.service.get_scooter("S2").await.unwrap(), view);
    }

    #[tokio::test]
    async fn inconsistent_store_is_a_storage_error() {
        let f = fixture().await;
        // Scooter points at a1 but a1's own lookup is routed elsewhere
        f.repos
            .add_reservation(Reservation::start("S1", "a1", Utc::now()))
            .await;
        f.repos
            .add_reservation(Reservation::start("S2", "a1", Utc::now()))
            .await;

        let err = f
            .service
            .apply_update("S2", &f.u1, ScooterPatch::release())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
    }

    #[tokio::test]
    async fn empty_patch_returns_current_view() {
        let f = fixture().await;
        f.service
            .apply_update("S1", &f.u1, ScooterPatch::reserve())
            .await
            .unwrap();

        let view = f
            .service
            .apply_update("S1", &f.u2, ScooterPatch::default())
            .await
            .unwrap();
        assert_eq!(view, f.service.get_scooter("S1").await.unwrap());
        assert_eq!(view.holder(), Some("a1"));

        let err = f
            .service
            .apply_update("nope", &f.u1, ScooterPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Scooter", .. }));
    }

    #[tokio::test]
    async fn concurrent_reserves_have_one_winner() {
        let f = fixture().await;
        let service = Arc::new(f.service);

        let first = {
            let service = service.clone();
            let user = f.u1.clone();
            tokio::spawn(async move {
                service
                    .apply_update("S1", &user, ScooterPatch::reserve())
                    .await
            })
        };
        let second = {
            let service = service.clone();
            let user = f.u2.clone();
            tokio::spawn(async move {
                service
                    .apply_update("S1", &user, ScooterPatch::reserve())
                    .await
            })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);

        let loser = results.into_iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            loser,
            Err(DomainError::Reservation(ReservationConflict::AlreadyReserved { .. }))
        ));
    }
}
