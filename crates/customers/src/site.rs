use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use assetdesk_core::error::require_text;
use assetdesk_core::{CustomerId, Entity, EntityKind, SiteId, ValidationError};

use crate::customer::{Address, Customer};

/// Suffix of the site created together with a customer.
pub const MAIN_SITE_NAME: &str = "Main Site";

/// Stored site name: `"<CustomerName> - <SiteName>"`.
pub fn combined_site_name(customer_name: &str, site_name: &str) -> String {
    format!("{} - {}", customer_name.trim(), site_name.trim())
}

/// Site document. References its customer by id (no embedded ownership).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    #[serde(default)]
    pub address: Option<Address>,
    pub customer_id: CustomerId,
    #[serde(default)]
    pub is_primary: bool,
    pub added: DateTime<Utc>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Entity for Site {
    type Id = SiteId;
    const KIND: EntityKind = EntityKind::Site;
}

impl Site {
    /// The primary site created alongside a customer that has an address.
    pub fn main_site(
        customer_id: CustomerId,
        customer: &Customer,
        address: Address,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: combined_site_name(&customer.name, MAIN_SITE_NAME),
            address: Some(address),
            customer_id,
            is_primary: true,
            added: now,
            modified: None,
            notes: None,
        }
    }
}

/// Payload for creating an additional site.
///
/// `customer_id` stays a raw string until the integrity engine resolves it, so a
/// malformed id surfaces as an id-format error rather than a body parse error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewSite {
    pub name: String,
    #[serde(default)]
    pub address: Option<Address>,
    pub customer_id: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

impl NewSite {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }

    pub fn into_site(self, customer_id: CustomerId, customer_name: &str, now: DateTime<Utc>) -> Site {
        Site {
            name: combined_site_name(customer_name, &self.name),
            address: self.address,
            customer_id,
            is_primary: self.is_primary,
            added: now,
            modified: None,
            notes: self.notes,
        }
    }
}

/// Partial site update. The owning customer cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SiteUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_primary: Option<bool>,
}

impl SiteUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        Ok(())
    }

    /// Build the stored patch; a supplied name is combined with the customer's name.
    pub fn into_patch(self, customer_name: &str, now: DateTime<Utc>) -> SitePatch {
        SitePatch {
            name: self.name.map(|n| combined_site_name(customer_name, &n)),
            address: self.address,
            notes: self.notes,
            is_primary: self.is_primary,
            modified: now,
        }
    }
}

/// Fields written by a site update (absent fields are left untouched).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
    pub modified: DateTime<Utc>,
}
