//! Domain identifier types
//!
//! Canvas identifies every entity with a numeric id. Depending on the
//! `Accept` header the API returns those ids either as JSON numbers or as
//! strings, so every id type here accepts both on input and always
//! serializes as a number.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Accepts an id as a JSON number or a numeric string
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn into_u64(self) -> Result<u64, String> {
        match self {
            RawId::Number(n) => Ok(n),
            RawId::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("Invalid numeric id: '{s}'")),
        }
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new id from its numeric value
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the numeric value
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| format!("Invalid {}: '{}'", $label, s))
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u64(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer)?
                    .into_u64()
                    .map(Self)
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

numeric_id!(
    /// Canvas course identifier
    CourseId,
    "course id"
);
numeric_id!(
    /// Canvas user identifier (a student, for enrollments)
    UserId,
    "user id"
);
numeric_id!(
    /// Canvas enrollment identifier
    EnrollmentId,
    "enrollment id"
);
numeric_id!(
    /// Canvas assignment identifier
    AssignmentId,
    "assignment id"
);
numeric_id!(
    /// Canvas quiz identifier (distinct from the quiz's assignment id)
    QuizId,
    "quiz id"
);
numeric_id!(
    /// Canvas module identifier
    ModuleId,
    "module id"
);
numeric_id!(
    /// Canvas module item identifier
    ModuleItemId,
    "module item id"
);
