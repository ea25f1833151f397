//! Scooter DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Location, Reservation, ScooterPatch, ScooterView};
use crate::shared::Patch;

/// GPS position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationDto {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Location> for LocationDto {
    fn from(l: Location) -> Self {
        Self {
            latitude: l.latitude,
            longitude: l.longitude,
        }
    }
}

impl From<LocationDto> for Location {
    fn from(l: LocationDto) -> Self {
        Location::new(l.latitude, l.longitude)
    }
}

/// Active reservation details
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub active: bool,
    /// Unix seconds
    pub start_time: i64,
}

impl From<&Reservation> for ReservationDto {
    fn from(r: &Reservation) -> Self {
        Self {
            active: r.is_active(),
            start_time: r.started_at.timestamp(),
        }
    }
}

/// Scooter as returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScooterDto {
    pub id: String,
    /// Charge in percent
    pub battery: i32,
    pub location: LocationDto,
    pub reserved: bool,
    /// Present only while reserved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<ReservationDto>,
}

impl From<ScooterView> for ScooterDto {
    fn from(view: ScooterView) -> Self {
        Self {
            reserved: view.is_reserved(),
            reservation: view.reservation.as_ref().map(ReservationDto::from),
            id: view.scooter.id,
            battery: view.scooter.battery,
            location: view.scooter.location.into(),
        }
    }
}

/// Partial update. Absent fields are left untouched; `null` is rejected.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateScooterRequest {
    /// New charge in percent (0-100)
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub battery: Patch<i64>,
    /// New position
    #[serde(default)]
    #[schema(value_type = Option<LocationDto>)]
    pub location: Patch<LocationDto>,
    /// `true` reserves the scooter for the caller, `false` releases it
    #[serde(default)]
    #[schema(value_type = Option<bool>)]
    pub reserved: Patch<bool>,
}

impl From<UpdateScooterRequest> for ScooterPatch {
    fn from(req: UpdateScooterRequest) -> Self {
        Self {
            battery: req.battery,
            location: req.location.map(Location::from),
            reserved: req.reserved,
        }
    }
}

/// Query filter for `GET /scooter`
#[derive(Debug, Deserialize, IntoParams)]
pub struct ScooterQuery {
    /// Only the scooter this user currently reserves
    pub user: Option<String>,
}
