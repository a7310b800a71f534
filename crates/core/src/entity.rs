//! Entity trait: identity + the collection a document lives in.

use core::fmt;
use core::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::id::DocumentId;

/// The four resource kinds tracked by the inventory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Customer,
    Site,
    InfrastructureLocation,
    Asset,
}

impl EntityKind {
    /// Name of the document-store collection holding this kind.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::Site => "sites",
            EntityKind::InfrastructureLocation => "infrastructure",
            EntityKind::Asset => "assets",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Customer => "Customer",
            EntityKind::Site => "Site",
            EntityKind::InfrastructureLocation => "Infrastructure location",
            EntityKind::Asset => "Asset",
        };
        f.write_str(label)
    }
}

/// A document body persisted in one collection.
///
/// The body never carries its own id; the store assigns one and [`Record`] pairs them.
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// Strongly-typed identifier of this entity.
    type Id: Copy
        + Eq
        + Hash
        + fmt::Debug
        + fmt::Display
        + Serialize
        + From<DocumentId>
        + Into<DocumentId>
        + Send
        + Sync;

    const KIND: EntityKind;
}

/// A stored document together with its identifier.
///
/// Serializes as the flattened body with an extra `id` field (string form).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<T: Entity> {
    pub id: T::Id,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Entity> Record<T> {
    pub fn new(id: impl Into<T::Id>, body: T) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }
}
