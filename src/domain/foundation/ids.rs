//! Strongly-typed identifier value objects.
//!
//! The content service identifies every object with a UUID that it prints
//! either hyphenated or in the compact 32-character form. Both forms parse to
//! the same identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Defines a UUID-backed identifier newtype.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parses either the hyphenated or the compact form.
            pub fn parse(value: &str) -> Result<Self, ValidationError> {
                Uuid::parse_str(value.trim())
                    .map(Self)
                    .map_err(|e| ValidationError::invalid_format($field, e.to_string()))
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the 32-character form without hyphens.
            pub fn compact(&self) -> String {
                self.0.simple().to_string()
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
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a source collection (a database of pages).
    SourceId,
    "source_id"
);

uuid_id!(
    /// Identifier of an exportable page.
    PageId,
    "page_id"
);

uuid_id!(
    /// Identifier of a block in a page's content tree.
    BlockId,
    "block_id"
);

/// A page is the root block of its own content tree.
impl From<PageId> for BlockId {
    fn from(id: PageId) -> Self {
        BlockId(id.0)
    }
}
