//! Strongly-typed identifiers used across the domain.
//!
//! Every document gets a [`DocumentId`] from the store. The per-resource ids wrap the
//! same UUID so a reference field (`customer_id`, `site_id`, ...) can't be mixed up
//! with another resource's id at compile time.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Store-assigned document key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

/// Identifier of a customer document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(Uuid);

/// Identifier of a site document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(Uuid);

/// Identifier of an infrastructure location document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(Uuid);

/// Identifier of an asset document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s.trim())
                    .map_err(|_| DomainError::invalid_id(format!("{} format: {}", $name, s)))?;
                Ok(Self(uuid))
            }
        }
    };
}

macro_rules! impl_document_ref {
    ($t:ty) => {
        impl From<DocumentId> for $t {
            fn from(value: DocumentId) -> Self {
                Self(value.0)
            }
        }

        impl From<$t> for DocumentId {
            fn from(value: $t) -> Self {
                DocumentId(value.0)
            }
        }
    };
}

impl_uuid_newtype!(DocumentId, "document id");
impl_uuid_newtype!(CustomerId, "customer id");
impl_uuid_newtype!(SiteId, "site id");
impl_uuid_newtype!(LocationId, "infrastructure location id");
impl_uuid_newtype!(AssetId, "asset id");

impl_document_ref!(CustomerId);
impl_document_ref!(SiteId);
impl_document_ref!(LocationId);
impl_document_ref!(AssetId);

/// Parse an optional id field where an empty string means "absent".
pub fn parse_optional<I>(raw: Option<&str>) -> Result<Option<I>, DomainError>
where
    I: FromStr<Err = DomainError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_invalid_format() {
        let err = "not-a-uuid".parse::<CustomerId>().unwrap_err();
        assert_eq!(err.to_string(), "invalid customer id format: not-a-uuid");
    }

    #[test]
    fn typed_ids_round_trip_through_document_id() {
        let site = SiteId::new();
        let doc: DocumentId = site.into();
        assert_eq!(SiteId::from(doc), site);
        assert_eq!(doc.to_string(), site.to_string());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = AssetId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }

    #[test]
    fn parse_optional_treats_blank_as_absent() {
        assert_eq!(parse_optional::<SiteId>(None).unwrap(), None);
        assert_eq!(parse_optional::<SiteId>(Some("  ")).unwrap(), None);
        assert!(parse_optional::<SiteId>(Some("nope")).is_err());
        let id = SiteId::new();
        assert_eq!(
            parse_optional::<SiteId>(Some(&id.to_string())).unwrap(),
            Some(id)
        );
    }
}
