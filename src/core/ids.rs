use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::HelpdeskError;

/// Declares a UUID-backed identifier newtype
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse from the hyphenated string form
            pub fn parse_str(s: &str) -> std::result::Result<Self, uuid::Error> {
                Uuid::parse_str(s).map(Self)
            }

            /// First eight characters, for compact display
            #[must_use]
            pub fn short(&self) -> String {
                self.0.simple().to_string()[..8].to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = HelpdeskError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse_str(s.trim()).map_err(|_| {
                    HelpdeskError::InvalidInput(format!("'{s}' is not a valid {} ID", $entity))
                })
            }
        }
    };
}

define_id!(
    /// Identifier of a support ticket
    TicketId,
    "ticket"
);
define_id!(
    /// Identifier of a technician profile
    TechnicianId,
    "technician"
);
define_id!(
    /// Identifier of a client profile
    ClientId,
    "client"
);
define_id!(
    /// Identifier of a ticket category
    CategoryId,
    "category"
);
define_id!(
    /// Identifier of a user account (the identity behind a principal)
    UserId,
    "user"
);
