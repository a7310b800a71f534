//! Creating and updating infrastructure locations and assets.
//!
//! Each write builds the complete candidate document, validates it, checks its
//! references, and only then persists it.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use assetdesk_assets::{Asset, AssetUpdate, NewAsset};
use assetdesk_core::{AssetId, DomainError, EntityKind, LocationId, Record};
use assetdesk_infrastructure::{InfrastructureLocation, InfrastructureUpdate, NewInfrastructure};

use crate::document_store::DocumentStore;
use crate::error::ServiceResult;
use crate::integrity::ReferentialIntegrity;
use crate::repository::Repository;

pub struct Placement {
    locations: Repository<InfrastructureLocation>,
    assets: Repository<Asset>,
    integrity: ReferentialIntegrity,
}

impl Placement {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            locations: Repository::new(store.clone()),
            assets: Repository::new(store.clone()),
            integrity: ReferentialIntegrity::new(store),
        }
    }

    #[instrument(skip_all, fields(customer_id = %new_location.customer_id), err)]
    pub async fn create_location(
        &self,
        new_location: NewInfrastructure,
    ) -> ServiceResult<Record<InfrastructureLocation>> {
        let location = new_location.into_location()?;
        self.integrity.check_location(&location).await?;
        let record = self.locations.insert(location).await?;
        info!(location_id = %record.id, location_type = %record.body.location_type, "infrastructure location created");
        Ok(record)
    }

    /// Partial update. Type and owner stay fixed; a new site must belong to the owner.
    #[instrument(skip(self, update), err)]
    pub async fn update_location(
        &self,
        raw_id: &str,
        update: InfrastructureUpdate,
    ) -> ServiceResult<Record<InfrastructureLocation>> {
        let id: LocationId = raw_id.parse()?;
        let existing = self.locations.fetch(id).await?;
        let merged = update.apply_to(&existing.body)?;
        self.integrity.check_location_placement(&merged).await?;

        self.locations
            .update(id, &merged)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::InfrastructureLocation).into())
    }

    #[instrument(skip_all, fields(customer_id = %new_asset.customer_id, asset_type = %new_asset.asset_type), err)]
    pub async fn create_asset(&self, new_asset: NewAsset) -> ServiceResult<Record<Asset>> {
        let asset = new_asset.into_asset(Utc::now())?;
        self.integrity.check_asset(&asset).await?;
        let record = self.assets.insert(asset).await?;
        info!(asset_id = %record.id, "asset created");
        Ok(record)
    }

    /// Partial update; the merged asset is re-validated and its references re-checked.
    #[instrument(skip(self, update), err)]
    pub async fn update_asset(
        &self,
        raw_id: &str,
        update: AssetUpdate,
    ) -> ServiceResult<Record<Asset>> {
        let id: AssetId = raw_id.parse()?;
        let existing = self.assets.fetch(id).await?;
        let merged = update.apply_to(&existing.body, Utc::now())?;
        self.integrity.check_asset_placement(&merged).await?;

        self.assets
            .update(id, &merged)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Asset).into())
    }
}
