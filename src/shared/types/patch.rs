//! Tri-state field for partial updates
//!
//! JSON distinguishes a missing key, an explicit `null` and a value.
//! `Option<T>` collapses the first two, so update payloads use `Patch<T>`
//! together with `#[serde(default)]`:
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct Update {
//!     #[serde(default)]
//!     battery: Patch<i64>,
//! }
//! ```

use serde::{Deserialize, Deserializer};

use crate::domain::scooter::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Key not present: leave the field untouched
    #[default]
    Absent,
    /// Key present with `null`
    Null,
    /// Key present with a value
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)),
        }
    }

    /// Resolve a field that cannot be cleared: `null` is rejected.
    pub fn require(self, field: &'static str) -> Result<Option<T>, ValidationError> {
        match self {
            Patch::Absent => Ok(None),
            Patch::Null => Err(ValidationError::NullField(field)),
            Patch::Value(v) => Ok(Some(v)),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; `Absent` comes from `#[serde(default)]`
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        battery: Patch<i64>,
        #[serde(default)]
        reserved: Patch<bool>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let body: Body = serde_json::from_str(r#"{"battery": null, "reserved": true}"#).unwrap();
        assert_eq!(body.battery, Patch::Null);
        assert_eq!(body.reserved, Patch::Value(true));

        let body: Body = serde_json::from_str("{}").unwrap();
        assert!(body.battery.is_absent());
        assert!(body.reserved.is_absent());
    }

    #[test]
    fn wrong_type_is_an_error() {
        assert!(serde_json::from_str::<Body>(r#"{"battery": "full"}"#).is_err());
    }

    #[test]
    fn require_rejects_null() {
        assert_eq!(Patch::<i64>::Absent.require("battery"), Ok(None));
        assert_eq!(Patch::Value(5).require("battery"), Ok(Some(5)));
        assert_eq!(
            Patch::<i64>::Null.require("battery"),
            Err(ValidationError::NullField("battery"))
        );
    }

    #[test]
    fn map_preserves_state() {
        assert_eq!(Patch::Value(2).map(|v| v * 10), Patch::Value(20));
        assert_eq!(Patch::<i32>::Null.map(|v| v * 10), Patch::Null);
        assert_eq!(Patch::<i32>::Absent.map(|v| v * 10), Patch::Absent);
    }
}
