//! Field validators for scooter updates

use std::fmt;

use thiserror::Error;
use validator::Validate;

use super::model::Location;

pub const BATTERY_MIN: i64 = 0;
pub const BATTERY_MAX: i64 = 100;

/// Which coordinate(s) of a location are out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationAxis {
    Latitude,
    Longitude,
    Both,
}

impl fmt::Display for LocationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latitude => write!(f, "value for location.latitude must be in range [-180, 180]"),
            Self::Longitude => {
                write!(f, "value for location.longitude must be in range [-180, 180]")
            }
            Self::Both => write!(
                f,
                "values for location.latitude and location.longitude must be in range [-180, 180]"
            ),
        }
    }
}

/// Rejected user input on a scooter update.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field 'battery' must be in range [0, 100]")]
    InvalidBattery(i64),

    #[error("{0}")]
    InvalidLocation(LocationAxis),

    #[error("Field '{0}' must not be null")]
    NullField(&'static str),
}

/// Check a requested battery level and narrow it to the stored width.
pub fn validate_battery(level: i64) -> Result<i32, ValidationError> {
    if !(BATTERY_MIN..=BATTERY_MAX).contains(&level) {
        return Err(ValidationError::InvalidBattery(level));
    }
    i32::try_from(level).map_err(|_| ValidationError::InvalidBattery(level))
}

/// Check both coordinates independently and report every failing axis.
pub fn validate_location(location: &Location) -> Result<(), ValidationError> {
    // NaN compares false against both bounds, so range checks alone let it through
    let mut bad_latitude = !location.latitude.is_finite();
    let mut bad_longitude = !location.longitude.is_finite();

    if let Err(errors) = location.validate() {
        let fields = errors.field_errors();
        bad_latitude |= fields.contains_key("latitude");
        bad_longitude |= fields.contains_key("longitude");
    }

    let axis = match (bad_latitude, bad_longitude) {
        (false, false) => return Ok(()),
        (true, true) => LocationAxis::Both,
        (true, false) => LocationAxis::Latitude,
        (false, true) => LocationAxis::Longitude,
    };
    Err(ValidationError::InvalidLocation(axis))
}
