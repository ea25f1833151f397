//! Scooter domain entity

use validator::Validate;

use crate::domain::reservation::Reservation;
use crate::shared::Patch;

/// GPS position of a scooter.
///
/// Both axes are bounded to [-180, 180]. Latitude intentionally uses the
/// same loose bound as longitude.
#[derive(Debug, Clone, Copy, PartialEq, Validate)]
pub struct Location {
    /// North/South
    #[validate(range(min = -180.0, max = 180.0))]
    pub latitude: f64,
    /// East/West
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Scooter record as persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Scooter {
    /// Opaque identifier, immutable after provisioning
    pub id: String,
    /// Battery charge in percent (0..=100)
    pub battery: i32,
    pub location: Location,
}

impl Scooter {
    pub fn new(id: impl Into<String>, battery: i32, location: Location) -> Self {
        Self {
            id: id.into(),
            battery,
            location,
        }
    }
}

/// A scooter joined with its active reservation, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ScooterView {
    pub scooter: Scooter,
    pub reservation: Option<Reservation>,
}

impl ScooterView {
    pub fn new(scooter: Scooter, reservation: Option<Reservation>) -> Self {
        Self {
            scooter,
            reservation: reservation.filter(Reservation::is_active),
        }
    }

    pub fn id(&self) -> &str {
        &self.scooter.id
    }

    pub fn is_reserved(&self) -> bool {
        self.reservation.is_some()
    }

    /// The user currently holding this scooter.
    pub fn holder(&self) -> Option<&str> {
        self.reservation.as_ref().map(|r| r.user_id.as_str())
    }
}

/// Partial update of a scooter. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScooterPatch {
    pub battery: Patch<i64>,
    pub location: Patch<Location>,
    /// `true` reserves the scooter, `false` releases it
    pub reserved: Patch<bool>,
}

impl ScooterPatch {
    pub fn battery(level: i64) -> Self {
        Self {
            battery: Patch::Value(level),
            ..Self::default()
        }
    }

    pub fn location(location: Location) -> Self {
        Self {
            location: Patch::Value(location),
            ..Self::default()
        }
    }

    pub fn reserve() -> Self {
        Self {
            reserved: Patch::Value(true),
            ..Self::default()
        }
    }

    pub fn release() -> Self {
        Self {
            reserved: Patch::Value(false),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.battery.is_absent() && self.location.is_absent() && self.reserved.is_absent()
    }
}
