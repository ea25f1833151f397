//! Demo fleet loaded into an empty store

use chrono::DateTime;
use log::info;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Set,
    TransactionTrait,
};

use super::entities::{reservation, scooter, user};
use crate::domain::{Location, Reservation, Scooter, User};

/// Unix time at which the demo reservation started
const DEMO_RESERVATION_START: i64 = 1_742_182_920;

/// Initial contents of the fleet store
#[derive(Debug, Clone, Default)]
pub struct FleetSeed {
    pub scooters: Vec<Scooter>,
    pub users: Vec<User>,
    pub reservations: Vec<Reservation>,
}

impl FleetSeed {
    /// Four scooters around Vancouver, three users and one standing
    /// reservation (`ghi789` held by `c3`). Every user gets `password_hash`.
    pub fn demo(password_hash: &str) -> Self {
        let scooters = vec![
            Scooter::new("abc123", 99, Location::new(49.26227, -123.14242)),
            Scooter::new("def456", 88, Location::new(49.26636, -123.14226)),
            Scooter::new("ghi789", 77, Location::new(49.26532, -123.13659)),
            Scooter::new("jkl012", 9, Location::new(49.26443, -123.13469)),
        ];
        let users = vec![
            User::new("a1", "pay2go", password_hash),
            User::new("b2", "basic", password_hash),
            User::new("c3", "premium", password_hash),
        ];
        let started = DateTime::from_timestamp(DEMO_RESERVATION_START, 0).unwrap_or_default();
        let reservations = vec![Reservation::start("ghi789", "c3", started)];

        Self {
            scooters,
            users,
            reservations,
        }
    }
}

/// Insert `seed` if the store holds no scooters yet. Returns whether
/// anything was written.
pub async fn seed_database(db: &DatabaseConnection, seed: &FleetSeed) -> Result<bool, DbErr> {
    if scooter::Entity::find().count(db).await? > 0 {
        info!("Store already populated, skipping seed");
        return Ok(false);
    }

    let txn = db.begin().await?;
    insert_seed(&txn, seed).await?;
    txn.commit().await?;

    info!(
        "Seeded {} scooters, {} users, {} reservations",
        seed.scooters.len(),
        seed.users.len(),
        seed.reservations.len()
    );
    Ok(true)
}

async fn insert_seed<C: ConnectionTrait>(conn: &C, seed: &FleetSeed) -> Result<(), DbErr> {
    for s in &seed.scooters {
        let model = scooter::ActiveModel {
            id: Set(s.id.clone()),
            battery_level: Set(s.battery),
            latitude: Set(s.location.latitude),
            longitude: Set(s.location.longitude),
        };
        scooter::Entity::insert(model).exec(conn).await?;
    }

    for u in &seed.users {
        let model = user::ActiveModel {
            id: Set(u.id.clone()),
            name: Set(u.name.clone()),
            password_hash: Set(u.password_hash.clone()),
        };
        user::Entity::insert(model).exec(conn).await?;
    }

    for r in &seed.reservations {
        let model = reservation::ActiveModel {
            scooter_id: Set(r.scooter_id.clone()),
            user_id: Set(r.user_id.clone()),
            start_time: Set(r.started_at),
            end_time: Set(r.ended_at),
            active: Set(r.is_active()),
            ..Default::default()
        };
        reservation::Entity::insert(model).exec(conn).await?;
    }

    Ok(())
}
