//! Customer and site lifecycle: the multi-document rules the store cannot enforce.
//!
//! - creating a customer with an address also creates its primary "Main Site"
//! - additional sites get the combined `"<Customer> - <Site>"` name, unique per customer
//! - a customer's last site cannot be deleted on its own
//! - deleting a customer deletes its sites first
//!
//! Check-then-act sequences on a customer's sites run under a per-customer async lock,
//! and customer registration (duplicate check + insert) under a single lock. This only
//! serialises requests within one process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::OwnedMutexGuard;
use tracing::{info, instrument, warn};

use assetdesk_core::{CustomerId, DomainError, EntityKind, Record, SiteId};
use assetdesk_customers::{Customer, CustomerUpdate, NewSite, Site, SiteUpdate};

use crate::document_store::{DocumentStore, Filter};
use crate::error::ServiceResult;
use crate::integrity::ReferentialIntegrity;
use crate::repository::Repository;

/// Registry of per-customer async locks.
///
/// Idle entries (held only by the registry) are pruned on every acquisition.
#[derive(Debug, Default)]
struct CustomerLocks {
    inner: Mutex<HashMap<CustomerId, Arc<tokio::sync::Mutex<()>>>>,
}

impl CustomerLocks {
    async fn acquire(&self, customer_id: CustomerId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(customer_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

pub struct Lifecycle {
    customers: Repository<Customer>,
    sites: Repository<Site>,
    integrity: ReferentialIntegrity,
    registration: tokio::sync::Mutex<()>,
    locks: CustomerLocks,
}

impl Lifecycle {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            customers: Repository::new(store.clone()),
            sites: Repository::new(store.clone()),
            integrity: ReferentialIntegrity::new(store),
            registration: tokio::sync::Mutex::new(()),
            locks: CustomerLocks::default(),
        }
    }

    fn sites_of(customer_id: CustomerId) -> Filter {
        Filter::new().eq("customer_id", customer_id.to_string())
    }

    /// Register a customer (and its main site when it has an address).
    ///
    /// A customer with the same name and contact email is returned unchanged instead
    /// of creating a second one.
    #[instrument(skip_all, fields(name = %customer.name), err)]
    pub async fn create_customer(&self, customer: Customer) -> ServiceResult<Record<Customer>> {
        customer.validate()?;
        let _registration = self.registration.lock().await;

        let (name, email) = customer.identity();
        let identity = Filter::new().eq("name", name).eq("contact_email", email);
        if let Some(existing) = self.customers.find_one(&identity).await? {
            info!(customer_id = %existing.id, "customer already registered");
            return Ok(existing);
        }

        let record = self.customers.insert(customer).await?;
        if let Some(address) = record.body.address.clone() {
            let main_site = Site::main_site(record.id, &record.body, address, Utc::now());
            if let Err(err) = self.sites.insert(main_site).await {
                warn!(customer_id = %record.id, error = %err, "main site creation failed; rolling back customer");
                self.roll_back_registration(record.id).await;
                return Err(err);
            }
        }

        info!(customer_id = %record.id, "customer created");
        Ok(record)
    }

    /// Compensating deletes for a half-created customer. Safe to repeat.
    async fn roll_back_registration(&self, customer_id: CustomerId) {
        if let Err(err) = self.customers.delete(customer_id).await {
            warn!(customer_id = %customer_id, error = %err, "rollback: customer delete failed");
        }
        if let Err(err) = self.sites.delete_many(&Self::sites_of(customer_id)).await {
            warn!(customer_id = %customer_id, error = %err, "rollback: site cleanup failed");
        }
    }

    /// Partial update; rejects a (name, email) pair already used by another customer.
    #[instrument(skip(self, update), err)]
    pub async fn update_customer(
        &self,
        raw_id: &str,
        update: CustomerUpdate,
    ) -> ServiceResult<Record<Customer>> {
        let id: CustomerId = raw_id.parse()?;
        update.validate()?;
        if update.is_empty() {
            return self.customers.fetch(id).await;
        }
        let _registration = self.registration.lock().await;

        if let Some((name, email)) = update.identity() {
            let clash = Filter::new()
                .eq("name", name)
                .eq("contact_email", email)
                .excluding(id);
            if self.customers.count(&clash).await? > 0 {
                return Err(DomainError::duplicate_name(
                    "another customer with the same name and email already exists",
                )
                .into());
            }
        }

        self.customers
            .update(id, &update)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Customer).into())
    }

    /// Delete the customer's sites, then the customer.
    ///
    /// Site deletions are not restored if the customer delete fails afterwards.
    #[instrument(skip(self), err)]
    pub async fn delete_customer(&self, raw_id: &str) -> ServiceResult<()> {
        let id: CustomerId = raw_id.parse()?;
        let _guard = self.locks.acquire(id).await;

        let removed_sites = self.sites.delete_many(&Self::sites_of(id)).await?;
        if !self.customers.delete(id).await? {
            return Err(DomainError::not_found(EntityKind::Customer).into());
        }

        info!(customer_id = %id, removed_sites, "customer deleted");
        Ok(())
    }

    /// Add a site to a customer that already has its main site.
    #[instrument(skip(self, new_site), fields(customer_id = %new_site.customer_id), err)]
    pub async fn create_site(&self, new_site: NewSite) -> ServiceResult<Record<Site>> {
        new_site.validate()?;
        let customer = self.integrity.resolve_customer(&new_site.customer_id).await?;
        let customer_id = customer.id;
        // A customer deleted after resolution has no sites left, so the count below rejects.
        let _guard = self.locks.acquire(customer_id).await;

        if self.sites.count(&Self::sites_of(customer_id)).await? == 0 {
            return Err(DomainError::FirstSiteAutoCreated.into());
        }

        let site = new_site.into_site(customer_id, &customer.body.name, Utc::now());
        self.ensure_unique_name(customer_id, &site.name, None).await?;
        self.sites.insert(site).await
    }

    /// Partial update; a new name is re-combined with the customer's current name.
    #[instrument(skip(self, update), err)]
    pub async fn update_site(&self, raw_id: &str, update: SiteUpdate) -> ServiceResult<Record<Site>> {
        let id: SiteId = raw_id.parse()?;
        update.validate()?;
        let customer_id = self.sites.fetch(id).await?.body.customer_id;
        let _guard = self.locks.acquire(customer_id).await;
        let customer = self.integrity.customer(customer_id).await?;

        let patch = update.into_patch(&customer.body.name, Utc::now());
        if let Some(name) = &patch.name {
            self.ensure_unique_name(customer_id, name, Some(id)).await?;
        }

        self.sites
            .update(id, &patch)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Site).into())
    }

    /// Delete a site unless it is the customer's last one.
    #[instrument(skip(self), err)]
    pub async fn delete_site(&self, raw_id: &str) -> ServiceResult<()> {
        let id: SiteId = raw_id.parse()?;
        let customer_id = self.sites.fetch(id).await?.body.customer_id;
        let _guard = self.locks.acquire(customer_id).await;

        // A concurrent delete of the same site may have won the lock first.
        if self.sites.get(id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Site).into());
        }
        if self.sites.count(&Self::sites_of(customer_id)).await? <= 1 {
            return Err(DomainError::LastSiteProtected.into());
        }
        if !self.sites.delete(id).await? {
            return Err(DomainError::not_found(EntityKind::Site).into());
        }
        Ok(())
    }

    async fn ensure_unique_name(
        &self,
        customer_id: CustomerId,
        name: &str,
        exclude: Option<SiteId>,
    ) -> ServiceResult<()> {
        let mut filter = Self::sites_of(customer_id).eq("name", name);
        if let Some(id) = exclude {
            filter = filter.excluding(id);
        }
        if self.sites.count(&filter).await? > 0 {
            return Err(DomainError::duplicate_name(format!(
                "site with name '{name}' already exists for this customer"
            ))
            .into());
        }
        Ok(())
    }
}
