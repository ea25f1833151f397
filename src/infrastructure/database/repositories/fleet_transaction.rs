//! SeaORM implementation of FleetTransaction
//!
//! SQLite has no `SELECT ... FOR UPDATE`. Each lock is taken with a no-op
//! update of the row (`SET col = col`), which acquires the database write
//! lock before anything is read. Every transaction therefore starts with a
//! write, so a second writer waits on the busy timeout instead of failing a
//! lock upgrade after it has already read.

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use super::scooter_repository::{reservation_to_domain, scooter_to_domain};
use crate::domain::{
    DomainError, DomainResult, FleetTransaction, Location, Reservation, ReservationConflict,
    ScooterView,
};
use crate::infrastructure::database::entities::{reservation, scooter, user};

pub struct SeaOrmFleetTransaction {
    txn: DatabaseTransaction,
}

impl SeaOrmFleetTransaction {
    pub fn new(txn: DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Translate a failed insert into the reservation rule it broke.
    async fn insert_conflict(&self, e: DbErr, r: &Reservation) -> DomainError {
        let Some(SqlErr::UniqueConstraintViolation(msg)) = e.sql_err() else {
            return e.into();
        };
        debug!("Reservation insert rejected: {}", msg);

        if msg.contains("user_id") {
            let name = match user::Entity::find_by_id(r.user_id.as_str()).one(&self.txn).await {
                Ok(Some(u)) => u.name,
                _ => r.user_id.clone(),
            };
            ReservationConflict::UserAlreadyReserving { user: name }.into()
        } else {
            ReservationConflict::AlreadyReserved {
                scooter_id: r.scooter_id.clone(),
            }
            .into()
        }
    }
}

#[async_trait]
impl FleetTransaction for SeaOrmFleetTransaction {
    async fn lock_scooter(&mut self, id: &str) -> DomainResult<Option<ScooterView>> {
        let touched = scooter::Entity::update_many()
            .col_expr(
                scooter::Column::BatteryLevel,
                SimpleExpr::from(Expr::col(scooter::Column::BatteryLevel)),
            )
            .filter(scooter::Column::Id.eq(id))
            .exec(&self.txn)
            .await?;
        if touched.rows_affected == 0 {
            return Ok(None);
        }

        let Some(model) = scooter::Entity::find_by_id(id).one(&self.txn).await? else {
            return Ok(None);
        };
        let held = reservation::Entity::find()
            .filter(reservation::Column::ScooterId.eq(id))
            .filter(reservation::Column::Active.eq(true))
            .one(&self.txn)
            .await?;

        Ok(Some(ScooterView::new(
            scooter_to_domain(model),
            held.map(reservation_to_domain),
        )))
    }

    async fn lock_user_reservation(&mut self, user_id: &str) -> DomainResult<Option<Reservation>> {
        let touched = user::Entity::update_many()
            .col_expr(
                user::Column::Name,
                SimpleExpr::from(Expr::col(user::Column::Name)),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.txn)
            .await?;
        if touched.rows_affected == 0 {
            return Err(DomainError::user_not_found(user_id));
        }

        let held = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .filter(reservation::Column::Active.eq(true))
            .order_by_asc(reservation::Column::Id)
            .one(&self.txn)
            .await?;
        Ok(held.map(reservation_to_domain))
    }

    async fn update_battery(&mut self, scooter_id: &str, battery: i32) -> DomainResult<()> {
        debug!("Updating battery: {} -> {}", scooter_id, battery);

        let model = scooter::ActiveModel {
            id: Set(scooter_id.to_string()),
            battery_level: Set(battery),
            ..Default::default()
        };
        model.update(&self.txn).await?;
        Ok(())
    }

    async fn update_location(&mut self, scooter_id: &str, location: Location) -> DomainResult<()> {
        debug!(
            "Updating location: {} -> ({}, {})",
            scooter_id, location.latitude, location.longitude
        );

        let model = scooter::ActiveModel {
            id: Set(scooter_id.to_string()),
            latitude: Set(location.latitude),
            longitude: Set(location.longitude),
            ..Default::default()
        };
        model.update(&self.txn).await?;
        Ok(())
    }

    async fn insert_reservation(&mut self, r: &Reservation) -> DomainResult<()> {
        debug!("Inserting reservation: {} by {}", r.scooter_id, r.user_id);

        let model = reservation::ActiveModel {
            id: NotSet,
            scooter_id: Set(r.scooter_id.clone()),
            user_id: Set(r.user_id.clone()),
            start_time: Set(r.started_at),
            end_time: Set(r.ended_at),
            active: Set(r.is_active()),
        };

        if let Err(e) = reservation::Entity::insert(model).exec(&self.txn).await {
            return Err(self.insert_conflict(e, r).await);
        }
        Ok(())
    }

    async fn end_reservation(&mut self, r: &Reservation) -> DomainResult<()> {
        debug!("Ending reservation: {} by {}", r.scooter_id, r.user_id);

        let ended = reservation::Entity::update_many()
            .col_expr(reservation::Column::Active, Expr::value(false))
            .col_expr(reservation::Column::EndTime, Expr::value(r.ended_at))
            .filter(reservation::Column::ScooterId.eq(r.scooter_id.as_str()))
            .filter(reservation::Column::UserId.eq(r.user_id.as_str()))
            .filter(reservation::Column::Active.eq(true))
            .exec(&self.txn)
            .await?;

        if ended.rows_affected != 1 {
            return Err(DomainError::Storage(format!(
                "expected one active reservation of {} by {}, found {}",
                r.scooter_id, r.user_id, ended.rows_affected
            )));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DomainResult<()> {
        self.txn.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DomainResult<()> {
        self.txn.rollback().await?;
        Ok(())
    }
}
