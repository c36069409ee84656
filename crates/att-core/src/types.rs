//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new value after validation.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                if value.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(value))
            }

            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated employee name.
    ///
    /// Employee names must be non-empty. They are unique across the system
    /// and serve as the key for attendance events and daily summaries.
    EmployeeName, "employee name"
);

define_string_id!(
    /// A validated badge identifier, as produced by a barcode scan.
    ///
    /// Badge IDs must be non-empty and are bound to exactly one employee.
    BadgeId, "badge ID"
);

define_string_id!(
    /// A validated attendance event identifier.
    ///
    /// Event IDs are opaque; the storage layer assigns a fresh UUID on
    /// append so that same-second duplicate scans never overwrite each
    /// other. Uniqueness is enforced at the database level.
    EventId, "event ID"
);

/// A registered employee.
///
/// Created by registration and immutable thereafter. Employees are never
/// deleted in the normal flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub name: EmployeeName,
    pub badge_id: BadgeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_name_rejects_empty() {
        assert!(EmployeeName::new("").is_err());
        assert!(EmployeeName::new("Ada Lovelace").is_ok());
    }

    #[test]
    fn badge_id_rejects_empty() {
        assert!(BadgeId::new("").is_err());
        assert!(BadgeId::new("B-0042").is_ok());
    }

    #[test]
    fn event_id_serde_roundtrip() {
        let id = EventId::new("evt-123").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"evt-123\"");
        let parsed: EventId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn event_id_serde_rejects_empty() {
        let result: Result<EventId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn badge_id_as_ref() {
        let id = BadgeId::new("B-7").unwrap();
        let s: &str = id.as_ref();
        assert_eq!(s, "B-7");
    }

    #[test]
    fn employee_serde_roundtrip() {
        let employee = Employee {
            name: EmployeeName::new("Ada").unwrap(),
            badge_id: BadgeId::new("B-1").unwrap(),
        };
        let json = serde_json::to_string(&employee).unwrap();
        let parsed: Employee = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, employee);
    }
}
