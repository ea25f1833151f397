//! Reservation state machine
//!
//! A scooter is either `Free` or `Reserved(by = U)`. The only transitions are
//! `Reserve(U, S)` from `Free` (when U holds nothing else) and `Release(U, S)`
//! from `Reserved(by = U)`. Everything else is rejected, including reserving
//! a scooter the caller already holds and releasing a free scooter.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::model::{Reservation, ReservationChange, ReservationIntent};
use crate::domain::scooter::ScooterView;
use crate::domain::user::User;
use crate::domain::{DomainError, DomainResult};

/// Business-rule violation of a reservation transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationConflict {
    #[error("scooter {scooter_id} is already reserved")]
    AlreadyReserved { scooter_id: String },

    #[error("user {user} already has a scooter reserved")]
    UserAlreadyReserving { user: String },

    #[error("scooter is not reserved")]
    NotReserved { scooter_id: String },

    #[error("user does not own reservation")]
    NotOwner { scooter_id: String },
}

/// Decide whether `user` may apply `intent` to `scooter`.
///
/// `held` is the user's own active reservation as loaded in the same
/// transaction. On success returns the change the store must persist.
pub fn transition(
    intent: ReservationIntent,
    user: &User,
    scooter: &ScooterView,
    held: Option<&Reservation>,
    now: DateTime<Utc>,
) -> DomainResult<ReservationChange> {
    check_cross_references(user, scooter, held)?;

    match intent {
        ReservationIntent::Reserve => {
            if scooter.is_reserved() {
                return Err(ReservationConflict::AlreadyReserved {
                    scooter_id: scooter.id().to_string(),
                }
                .into());
            }
            if held.is_some() {
                return Err(ReservationConflict::UserAlreadyReserving {
                    user: user.name.clone(),
                }
                .into());
            }
            Ok(ReservationChange::Started(Reservation::start(
                scooter.id(),
                &user.id,
                now,
            )))
        }
        ReservationIntent::Release => {
            let Some(active) = scooter.reservation.as_ref() else {
                return Err(ReservationConflict::NotReserved {
                    scooter_id: scooter.id().to_string(),
                }
                .into());
            };
            if !active.is_held_by(&user.id) {
                return Err(ReservationConflict::NotOwner {
                    scooter_id: scooter.id().to_string(),
                }
                .into());
            }
            let mut ended = active.clone();
            ended.end(now);
            Ok(ReservationChange::Ended(ended))
        }
    }
}

/// Scooter -> user and user -> scooter links must agree in both directions.
fn check_cross_references(
    user: &User,
    scooter: &ScooterView,
    held: Option<&Reservation>,
) -> DomainResult<()> {
    if let Some(held) = held {
        if !held.is_held_by(&user.id) {
            return Err(DomainError::Storage(format!(
                "reservation loaded for user {} belongs to {}",
                user.id, held.user_id
            )));
        }
    }

    let scooter_points_at_user = scooter.holder() == Some(user.id.as_str());
    let user_points_at_scooter = held.is_some_and(|r| r.is_for(scooter.id()));

    if scooter_points_at_user != user_points_at_scooter {
        return Err(DomainError::Storage(format!(
            "inconsistent reservation state between scooter {} and user {}",
            scooter.id(),
            user.id
        )));
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────
