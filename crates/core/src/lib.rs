//! `assetdesk-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every resource crate
//! (identifiers, the error taxonomy, the entity/document contract). No storage and
//! no HTTP concerns live here.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::{Entity, EntityKind, Record};
pub use error::{DomainError, DomainResult, ValidationError};
pub use id::{AssetId, CustomerId, DocumentId, LocationId, SiteId};
pub use value_object::ValueObject;
