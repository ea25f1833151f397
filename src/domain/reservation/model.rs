//! Reservation domain entity

use chrono::{DateTime, Utc};

/// A user's hold on a scooter.
///
/// Active while `ended_at` is `None`. Created on an accepted reserve and
/// ended on an accepted release; never changed otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub scooter_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Reservation {
    /// Open a new active reservation
    pub fn start(
        scooter_id: impl Into<String>,
        user_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            scooter_id: scooter_id.into(),
            user_id: user_id.into(),
            started_at: now,
            ended_at: None,
        }
    }

    /// Close this reservation
    pub fn end(&mut self, now: DateTime<Utc>) {
        self.ended_at = Some(now);
    }

    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    pub fn is_held_by(&self, user_id: &str) -> bool {
        self.is_active() && self.user_id == user_id
    }

    pub fn is_for(&self, scooter_id: &str) -> bool {
        self.scooter_id == scooter_id
    }
}

/// Requested reservation transition, decoded from the `reserved` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationIntent {
    Reserve,
    Release,
}

impl ReservationIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reserve => "reserve",
            Self::Release => "release",
        }
    }
}

impl From<bool> for ReservationIntent {
    fn from(reserved: bool) -> Self {
        if reserved {
            Self::Reserve
        } else {
            Self::Release
        }
    }
}

impl std::fmt::Display for ReservationIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Store mutation produced by an accepted transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ReservationChange {
    /// Insert this new active reservation
    Started(Reservation),
    /// Mark the matching active reservation ended (carries the ended copy)
    Ended(Reservation),
}

impl ReservationChange {
    pub fn intent(&self) -> ReservationIntent {
        match self {
            Self::Started(_) => ReservationIntent::Reserve,
            Self::Ended(_) => ReservationIntent::Release,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
