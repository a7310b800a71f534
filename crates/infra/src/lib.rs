//! Infrastructure layer: document store, repositories, cross-document rules, config.

pub mod config;
pub mod document_store;
pub mod error;
pub mod integrity;
pub mod lifecycle;
pub mod placement;
pub mod repository;


pub use config::{AppConfig, ConfigError, StoreConfig};
pub use document_store::{DocumentStore, Filter, StoredDocument};
pub use error::{ServiceError, ServiceResult, StoreError};
pub use integrity::ReferentialIntegrity;
pub use lifecycle::Lifecycle;
pub use placement::Placement;
pub use repository::Repository;
