//! SeaORM implementation of ScooterRepository

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use super::fleet_transaction::SeaOrmFleetTransaction;
use crate::domain::{
    DomainResult, FleetTransaction, Location, Reservation, Scooter, ScooterRepository,
    ScooterView,
};
use crate::infrastructure::database::entities::{reservation, scooter};

pub struct SeaOrmScooterRepository {
    db: DatabaseConnection,
}

impl SeaOrmScooterRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(super) fn scooter_to_domain(m: scooter::Model) -> Scooter {
    Scooter {
        id: m.id,
        battery: m.battery_level,
        location: Location::new(m.latitude, m.longitude),
    }
}

pub(super) fn reservation_to_domain(m: reservation::Model) -> Reservation {
    Reservation {
        scooter_id: m.scooter_id,
        user_id: m.user_id,
        started_at: m.start_time,
        ended_at: if m.active {
            None
        } else {
            // Inactive rows always carry an end time; fall back to start if not
            Some(m.end_time.unwrap_or(m.start_time))
        },
    }
}

// ── ScooterRepository impl ──────────────────────────────────────

#[async_trait]
impl ScooterRepository for SeaOrmScooterRepository {
    async fn find_all(&self) -> DomainResult<Vec<ScooterView>> {
        let scooters = scooter::Entity::find()
            .order_by_asc(scooter::Column::Id)
            .all(&self.db)
            .await?;

        let mut active: HashMap<String, Reservation> = reservation::Entity::find()
            .filter(reservation::Column::Active.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.scooter_id.clone(), reservation_to_domain(m)))
            .collect();

        debug!("Loaded {} scooters, {} reserved", scooters.len(), active.len());

        Ok(scooters
            .into_iter()
            .map(|m| {
                let held = active.remove(&m.id);
                ScooterView::new(scooter_to_domain(m), held)
            })
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ScooterView>> {
        let Some(model) = scooter::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let held = reservation::Entity::find()
            .filter(reservation::Column::ScooterId.eq(id))
            .filter(reservation::Column::Active.eq(true))
            .one(&self.db)
            .await?;

        Ok(Some(ScooterView::new(
            scooter_to_domain(model),
            held.map(reservation_to_domain),
        )))
    }

    async fn find_reserved_by(&self, user_id: &str) -> DomainResult<Option<ScooterView>> {
        let Some(held) = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .filter(reservation::Column::Active.eq(true))
            .order_by_asc(reservation::Column::Id)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let model = scooter::Entity::find_by_id(held.scooter_id.as_str())
            .one(&self.db)
            .await?;

        Ok(model.map(|m| ScooterView::new(scooter_to_domain(m), Some(reservation_to_domain(held)))))
    }

    async fn begin(&self) -> DomainResult<Box<dyn FleetTransaction>> {
        let txn = self.db.begin().await?;
        Ok(Box::new(SeaOrmFleetTransaction::new(txn)))
    }
}
