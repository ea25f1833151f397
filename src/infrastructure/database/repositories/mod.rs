//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod fleet_transaction;
pub mod repository_provider;
pub mod scooter_repository;
pub mod user_repository;

pub use fleet_transaction::SeaOrmFleetTransaction;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use scooter_repository::SeaOrmScooterRepository;
pub use user_repository::SeaOrmUserRepository;

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Utc};

    use super::SeaOrmRepositoryProvider;
    use crate::application::FleetService;
    use crate::domain::{
        DomainError, Location, RepositoryProvider, Reservation, ReservationConflict, ScooterPatch,
        User,
    };
    use crate::infrastructure::database::{
        init_database, prepare_schema, seed_database, test_database, DatabaseConfig, FleetSeed,
    };
    use crate::shared::Patch;

    async fn seeded() -> SeaOrmRepositoryProvider {
        let db = test_database().await;
        seed_database(&db, &FleetSeed::demo("hash")).await.unwrap();
        SeaOrmRepositoryProvider::new(db)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn lists_scooters_with_reservations() {
        let repos = seeded().await;
        let all = repos.scooters().find_all().await.unwrap();

        let ids: Vec<_> = all.iter().map(|v| v.id()).collect();
        assert_eq!(ids, ["abc123", "def456", "ghi789", "jkl012"]);

        let reserved: Vec<_> = all.iter().filter(|v| v.is_reserved()).collect();
        assert_eq!(reserved.len(), 1);
        assert_eq!(reserved[0].id(), "ghi789");
        assert_eq!(reserved[0].holder(), Some("c3"));
        assert_eq!(
            reserved[0].reservation.as_ref().unwrap().started_at.timestamp(),
            1_742_182_920
        );
    }

    #[tokio::test]
    async fn finds_by_id_and_holder() {
        let repos = seeded().await;

        let view = repos.scooters().find_by_id("abc123").await.unwrap().unwrap();
        assert_eq!(view.scooter.battery, 99);
        assert_eq!(view.scooter.location, Location::new(49.26227, -123.14242));
        assert!(repos.scooters().find_by_id("zzz").await.unwrap().is_none());

        let held = repos.scooters().find_reserved_by("c3").await.unwrap().unwrap();
        assert_eq!(held.id(), "ghi789");
        assert!(repos.scooters().find_reserved_by("a1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn finds_users() {
        let repos = seeded().await;
        assert_eq!(
            repos.users().find_by_name("basic").await.unwrap().unwrap().id,
            "b2"
        );
        assert_eq!(
            repos.users().find_by_id("a1").await.unwrap().unwrap().name,
            "pay2go"
        );
        assert!(repos.users().find_by_name("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ping_succeeds() {
        let repos = seeded().await;
        repos.ping().await.unwrap();
    }

    #[tokio::test]
    async fn lock_missing_scooter_is_none() {
        let repos = seeded().await;
        let mut tx = repos.scooters().begin().await.unwrap();
        assert!(tx.lock_scooter("zzz").await.unwrap().is_none());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn rollback_discards_writes() {
        let repos = seeded().await;

        let mut tx = repos.scooters().begin().await.unwrap();
        tx.lock_scooter("abc123").await.unwrap().unwrap();
        tx.update_battery("abc123", 1).await.unwrap();
        tx.update_location("abc123", Location::new(0.0, 0.0)).await.unwrap();
        tx.rollback().await.unwrap();

        let view = repos.scooters().find_by_id("abc123").await.unwrap().unwrap();
        assert_eq!(view.scooter.battery, 99);
        assert_eq!(view.scooter.location, Location::new(49.26227, -123.14242));
    }

    #[tokio::test]
    async fn unique_indexes_reject_second_active_reservation() {
        let repos = seeded().await;

        // Scooter already held by c3
        let mut tx = repos.scooters().begin().await.unwrap();
        let err = tx
            .insert_reservation(&Reservation::start("ghi789", "a1", at(100)))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Reservation(ReservationConflict::AlreadyReserved {
                scooter_id: "ghi789".into()
            })
        );
        tx.rollback().await.unwrap();

        // User c3 already holds ghi789
        let mut tx = repos.scooters().begin().await.unwrap();
        let err = tx
            .insert_reservation(&Reservation::start("abc123", "c3", at(100)))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Reservation(ReservationConflict::UserAlreadyReserving {
                user: "premium".into()
            })
        );
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn ended_reservation_frees_both_sides() {
        let repos = seeded().await;

        let mut tx = repos.scooters().begin().await.unwrap();
        let view = tx.lock_scooter("ghi789").await.unwrap().unwrap();
        let mut held = tx.lock_user_reservation("c3").await.unwrap().unwrap();
        assert_eq!(Some(&held), view.reservation.as_ref());

        held.end(at(1_742_190_000));
        tx.end_reservation(&held).await.unwrap();
        // Ending twice finds nothing to end
        assert!(matches!(
            tx.end_reservation(&held).await,
            Err(DomainError::Storage(_))
        ));
        tx.commit().await.unwrap();

        assert!(!repos
            .scooters()
            .find_by_id("ghi789")
            .await
            .unwrap()
            .unwrap()
            .is_reserved());
        assert!(repos.scooters().find_reserved_by("c3").await.unwrap().is_none());

        // History is kept, so a new reservation can be made
        let mut tx = repos.scooters().begin().await.unwrap();
        tx.insert_reservation(&Reservation::start("ghi789", "a1", at(1_742_190_100)))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(
            repos.scooters().find_reserved_by("a1").await.unwrap().unwrap().id(),
            "ghi789"
        );
    }

    #[tokio::test]
    async fn unknown_user_cannot_be_locked() {
        let repos = seeded().await;
        let mut tx = repos.scooters().begin().await.unwrap();
        assert!(matches!(
            tx.lock_user_reservation("nobody").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn fleet_service_scenario_over_sqlite() {
        let repos = Arc::new(seeded().await);
        let service = FleetService::new(repos.clone());
        let a1 = User::new("a1", "pay2go", "hash");
        let b2 = User::new("b2", "basic", "hash");
        let c3 = User::new("c3", "premium", "hash");

        // c3 cannot take a second scooter
        let err = service
            .apply_update("abc123", &c3, ScooterPatch::reserve())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Reservation(ReservationConflict::UserAlreadyReserving { .. })
        ));

        service
            .apply_update("abc123", &a1, ScooterPatch::reserve())
            .await
            .unwrap();
        let err = service
            .apply_update("abc123", &b2, ScooterPatch::reserve())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Reservation(ReservationConflict::AlreadyReserved { .. })
        ));

        let err = service
            .apply_update("abc123", &b2, ScooterPatch::release())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Reservation(ReservationConflict::NotOwner { .. })
        ));

        service
            .apply_update("abc123", &a1, ScooterPatch::release())
            .await
            .unwrap();
        let view = service
            .apply_update("abc123", &b2, ScooterPatch::reserve())
            .await
            .unwrap();
        assert_eq!(view.holder(), Some("b2"));
        let stored = service.get_scooter("abc123").await.unwrap();
        assert_eq!(stored.holder(), Some("b2"));
        assert_eq!(stored.scooter, view.scooter);
    }

    #[tokio::test]
    async fn failed_update_leaves_sqlite_untouched() {
        let repos = Arc::new(seeded().await);
        let service = FleetService::new(repos.clone());
        let a1 = User::new("a1", "pay2go", "hash");

        let patch = ScooterPatch {
            battery: Patch::Value(10),
            reserved: Patch::Value(true),
            location: Patch::Value(Location::new(0.0, 999.0)),
        };
        assert!(service.apply_update("def456", &a1, patch).await.is_err());

        let view = service.get_scooter("def456").await.unwrap();
        assert_eq!(view.scooter.battery, 88);
        assert!(!view.is_reserved());
        assert!(repos.scooters().find_reserved_by("a1").await.unwrap().is_none());
    }

    /// Seeded database in a temporary file, so the pool hands out separate
    /// connections that really contend for SQLite's write lock.
    async fn seeded_file() -> (SeaOrmRepositoryProvider, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("scooters-{}.db", uuid::Uuid::new_v4()));
        let config = DatabaseConfig::sqlite(&path.to_string_lossy());
        let db = init_database(&config).await.unwrap();
        prepare_schema(&db, true).await.unwrap();
        seed_database(&db, &FleetSeed::demo("hash")).await.unwrap();
        (SeaOrmRepositoryProvider::new(db), path)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reserves_over_sqlite_have_one_winner() {
        let (repos, path) = seeded_file().await;
        let service = Arc::new(FleetService::new(Arc::new(repos)));
        let a1 = User::new("a1", "pay2go", "hash");
        let b2 = User::new("b2", "basic", "hash");

        for _ in 0..5 {
            let spawn_reserve = |user: User| {
                let service = service.clone();
                tokio::spawn(async move {
                    let result = service
                        .apply_update("abc123", &user, ScooterPatch::reserve())
                        .await;
                    (user, result)
                })
            };
            let first = spawn_reserve(a1.clone());
            let second = spawn_reserve(b2.clone());
            let outcomes = [first.await.unwrap(), second.await.unwrap()];

            let winners: Vec<_> = outcomes.iter().filter(|(_, r)| r.is_ok()).collect();
            assert_eq!(winners.len(), 1);
            let loser = outcomes.iter().find(|(_, r)| r.is_err()).unwrap();
            assert!(matches!(
                loser.1,
                Err(DomainError::Reservation(ReservationConflict::AlreadyReserved { .. }))
            ));

            let winner = &winners[0].0;
            let stored = service.get_scooter("abc123").await.unwrap();
            assert_eq!(stored.holder(), Some(winner.id.as_str()));

            service
                .apply_update("abc123", winner, ScooterPatch::release())
                .await
                .unwrap();
        }

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
