//! UUID-backed identifier newtypes for domain entities.
//!
//! Each entity gets its own identifier type so a donation id can never be
//! passed where a volunteer id is expected.

use uuid::Uuid;

/// Validation error returned when parsing an identifier from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// The identifier was empty.
    #[error("{kind} id must not be empty")]
    Empty {
        /// Entity kind, used in messages.
        kind: &'static str,
    },
    /// The identifier was not a canonical UUID.
    #[error("{kind} id must be a valid UUID")]
    Invalid {
        /// Entity kind, used in messages.
        kind: &'static str,
    },
}

pub(crate) fn parse_identifier(raw: &str, kind: &'static str) -> Result<Uuid, IdentifierError> {
    if raw.is_empty() {
        return Err(IdentifierError::Empty { kind });
    }
    if raw.trim() != raw {
        return Err(IdentifierError::Invalid { kind });
    }
    Uuid::parse_str(raw).map_err(|_| IdentifierError::Invalid { kind })
}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Validate and construct an identifier from text.
            ///
            /// # Errors
            /// Returns [`IdentifierError`] for empty or non-UUID input.
            pub fn new(id: impl AsRef<str>) -> Result<Self, $crate::domain::IdentifierError> {
                $crate::domain::identifiers::parse_identifier(id.as_ref(), $kind).map(Self)
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

uuid_identifier!(
    /// Stable user identifier.
    UserId,
    "user"
);
uuid_identifier!(
    /// Donation identifier, embedded in the gateway callback URLs.
    DonationId,
    "donation"
);
uuid_identifier!(
    /// Volunteer identifier.
    VolunteerId,
    "volunteer"
);
uuid_identifier!(
    /// Volunteer activity identifier.
    ActivityId,
    "activity"
);
uuid_identifier!(
    /// Volunteer schedule identifier.
    ScheduleId,
    "schedule"
);
uuid_identifier!(
    /// Publication identifier.
    PublicationId,
    "publication"
);
