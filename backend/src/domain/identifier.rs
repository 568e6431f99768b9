//! UUID-backed identifiers for accounts and healthcare records.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raised when an identifier string is not a hyphenated UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct IdentifierError {
    kind: &'static str,
}

impl IdentifierError {
    /// Label of the identifier that failed to parse.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identifier from its string form.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdentifierError> {
                let raw = id.as_ref();
                if raw.trim() != raw {
                    return Err(IdentifierError { kind: $label });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdentifierError { kind: $label })
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

uuid_identifier!(
    /// Stable user account identifier.
    UserId,
    "user id"
);
uuid_identifier!(
    /// Patient record identifier.
    PatientId,
    "patient id"
);
uuid_identifier!(
    /// Doctor record identifier.
    DoctorId,
    "doctor id"
);
uuid_identifier!(
    /// Patient-doctor mapping identifier.
    MappingId,
    "mapping id"
);
