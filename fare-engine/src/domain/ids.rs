//! Opaque feed identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when constructing an invalid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {reason}")]
pub struct InvalidId {
    kind: &'static str,
    reason: &'static str,
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier.
            ///
            /// Returns an error if the string is empty.
            pub fn new(s: impl Into<String>) -> Result<Self, InvalidId> {
                let s = s.into();
                if s.is_empty() {
                    return Err(InvalidId {
                        kind: $kind,
                        reason: "cannot be empty",
                    });
                }
                Ok($name(s))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier and returns the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidId;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                $name::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a fare product (GTFS `fare_id`).
    ///
    /// Fare ids are unique within a feed. They order lexically, which is
    /// the order candidate products are scanned in during pricing.
    ///
    /// # Examples
    ///
    /// ```
    /// use fare_engine::domain::FareId;
    ///
    /// let id = FareId::new("regular").unwrap();
    /// assert_eq!(id.as_str(), "regular");
    ///
    /// // Empty strings are rejected
    /// assert!(FareId::new("").is_err());
    /// ```
    FareId,
    "fare id"
);

opaque_id!(
    /// Identifier of a fare zone (GTFS `zone_id`).
    ZoneId,
    "zone id"
);

opaque_id!(
    /// Identifier of a route (GTFS `route_id`).
    RouteId,
    "route id"
);

opaque_id!(
    /// Identifier of an agency (GTFS `agency_id`).
    AgencyId,
    "agency id"
);

opaque_id!(
    /// Identifier of a stop (GTFS `stop_id`).
    StopId,
    "stop id"
);
