//! Strongly-typed ID wrappers for all entity types
//!
//! Using newtype wrappers prevents accidentally mixing up IDs from different
//! entity types at compile time. Item lines are addressed by their cost code
//! rather than a UUID; see `models::cost_code`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generates a UUID-backed id newtype with a short display prefix.
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Borrow the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            // Short form: prefix plus the first UUID field, e.g. "prj-550e8400"
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let (head, _, _, _) = self.0.as_fields();
                write!(f, "{}{:08x}", $display_prefix, head)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            // Accepts a bare UUID or one carrying this type's display prefix
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bare = s.strip_prefix($display_prefix).unwrap_or(s);
                Uuid::parse_str(bare).map(Self)
            }
        }
    };
}

define_id!(ProjectId, "prj-");
define_id!(EventId, "evt-");
define_id!(BackstopId, "bks-");
define_id!(DocumentId, "doc-");

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_display_short_form() {
        let id = ProjectId::from(Uuid::parse_str(RAW).unwrap());
        assert_eq!(id.to_string(), "prj-550e8400");

        let id = BackstopId::from(Uuid::parse_str(RAW).unwrap());
        assert_eq!(id.to_string(), "bks-550e8400");
    }

    #[test]
    fn test_fresh_ids_are_distinct() {
        let a = EventId::new();
        let b = EventId::new();
        assert_ne!(a, b);
        assert!(!a.as_uuid().is_nil());
    }

    #[test]
    fn test_serializes_as_bare_uuid() {
        let id = DocumentId::from(Uuid::parse_str(RAW).unwrap());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", RAW));

        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_parse_accepts_bare_and_prefixed() {
        let bare: EventId = RAW.parse().unwrap();
        let prefixed: EventId = format!("evt-{}", RAW).parse().unwrap();
        assert_eq!(bare, prefixed);

        // Another type's prefix is not stripped
        assert!(format!("prj-{}", RAW).parse::<EventId>().is_err());
    }

    #[test]
    fn test_short_display_form_does_not_round_trip() {
        let id = ProjectId::new();
        assert!(id.to_string().parse::<ProjectId>().is_err());
    }
}
