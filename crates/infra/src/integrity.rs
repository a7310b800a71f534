//! Referential integrity checks across documents.
//!
//! The store does not know that a site belongs to a customer; every create/update that
//! references a parent goes through here first. Checks are read-then-verify: they do
//! not lock anything themselves.

use std::sync::Arc;

use tracing::instrument;

use assetdesk_assets::Asset;
use assetdesk_core::{CustomerId, DomainError, Entity, EntityKind, LocationId, Record, SiteId};
use assetdesk_customers::{Customer, Site};
use assetdesk_infrastructure::InfrastructureLocation;

use crate::document_store::DocumentStore;
use crate::error::ServiceResult;
use crate::repository::Repository;

#[derive(Clone)]
pub struct ReferentialIntegrity {
    customers: Repository<Customer>,
    sites: Repository<Site>,
    locations: Repository<InfrastructureLocation>,
}

impl ReferentialIntegrity {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            customers: Repository::new(store.clone()),
            sites: Repository::new(store.clone()),
            locations: Repository::new(store),
        }
    }

    /// Parse a raw customer reference and load the customer.
    #[instrument(skip(self), err)]
    pub async fn resolve_customer(&self, raw_id: &str) -> ServiceResult<Record<Customer>> {
        let id: CustomerId = raw_id.parse()?;
        self.customer(id).await
    }

    pub async fn customer(&self, id: CustomerId) -> ServiceResult<Record<Customer>> {
        self.customers.fetch(id).await
    }

    /// Load a site and verify it belongs to `expected`.
    #[instrument(skip(self), fields(site_id = %id, customer_id = %expected), err)]
    pub async fn resolve_site(
        &self,
        id: SiteId,
        expected: CustomerId,
    ) -> ServiceResult<Record<Site>> {
        let site = self.sites.fetch(id).await?;
        ensure_owner::<Site>(site.body.customer_id, expected)?;
        Ok(site)
    }

    /// Load an infrastructure location and verify it belongs to `expected`.
    #[instrument(skip(self), fields(location_id = %id, customer_id = %expected), err)]
    pub async fn resolve_location(
        &self,
        id: LocationId,
        expected: CustomerId,
    ) -> ServiceResult<Record<InfrastructureLocation>> {
        let location = self.locations.fetch(id).await?;
        ensure_owner::<InfrastructureLocation>(location.body.customer_id, expected)?;
        Ok(location)
    }

    /// Full check for a new location: the customer exists and any site is theirs.
    pub async fn check_location(&self, location: &InfrastructureLocation) -> ServiceResult<()> {
        self.customer(location.customer_id).await?;
        self.check_location_placement(location).await
    }

    /// Only the site reference (used on update, where the owner is already fixed).
    pub async fn check_location_placement(
        &self,
        location: &InfrastructureLocation,
    ) -> ServiceResult<()> {
        if let Some(site_id) = location.site_id {
            self.resolve_site(site_id, location.customer_id).await?;
        }
        Ok(())
    }

    /// Full check for a new asset: customer, site and hosting location.
    pub async fn check_asset(&self, asset: &Asset) -> ServiceResult<()> {
        self.customer(asset.customer_id).await?;
        self.check_asset_placement(asset).await
    }

    pub async fn check_asset_placement(&self, asset: &Asset) -> ServiceResult<()> {
        if let Some(site_id) = asset.site_id {
            self.resolve_site(site_id, asset.customer_id).await?;
        }
        if let Some(location_id) = asset.specs.infrastructure_location_id() {
            self.resolve_location(location_id, asset.customer_id).await?;
        }
        Ok(())
    }
}

fn ensure_owner<T: Entity>(actual: CustomerId, expected: CustomerId) -> Result<(), DomainError> {
    if actual != expected {
        return Err(DomainError::ownership(T::KIND));
    }
    Ok(())
}
