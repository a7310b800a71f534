use core::fmt;
use core::str::FromStr;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use assetdesk_core::error::require_text;
use assetdesk_core::id::parse_optional;
use assetdesk_core::{
    AssetId, CustomerId, DomainError, Entity, EntityKind, LocationId, SiteId, ValidationError,
    ValueObject,
};

const VM_LOCATION_REQUIRED: &str = "VM assets require infrastructure_location_id in specs";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Host,
    Switch,
    Firewall,
    Vm,
}

impl AssetType {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Host => "host",
            AssetType::Switch => "switch",
            AssetType::Firewall => "firewall",
            AssetType::Vm => "vm",
        }
    }

    /// Physical hardware has to be placed at a site.
    pub fn is_physical(self) -> bool {
        !matches!(self, AssetType::Vm)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "host" => Ok(AssetType::Host),
            "switch" => Ok(AssetType::Switch),
            "firewall" => Ok(AssetType::Firewall),
            "vm" => Ok(AssetType::Vm),
            other => Err(ValidationError::invalid_field(
                "asset_type",
                format!("unknown asset type '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmSpecs {
    pub cpu_cores: u32,
    pub ram_gb: u32,
    pub os: String,
    pub os_version: String,
    /// Location hosting the VM.
    pub infrastructure_location_id: LocationId,
    /// Identifier on the cloud platform, if any.
    #[serde(default)]
    pub vm_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDeviceSpecs {
    pub manufacturer: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSpecs {
    pub manufacturer: String,
    pub cpu_cores: u32,
    pub ram_gb: u32,
}

/// Hardware/OS details; the variant is selected by the sibling `asset_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AssetSpecs {
    Vm(VmSpecs),
    NetworkDevice(NetworkDeviceSpecs),
    Host(HostSpecs),
}

impl ValueObject for AssetSpecs {}

impl AssetSpecs {
    /// Decode raw specs as the variant `asset_type` calls for.
    ///
    /// A VM without `infrastructure_location_id` is a spec failure; a present but
    /// malformed one is an id-format failure.
    pub fn parse(asset_type: AssetType, raw: Value) -> Result<Self, DomainError> {
        match asset_type {
            AssetType::Vm => {
                let location = raw
                    .get("infrastructure_location_id")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| ValidationError::invalid_spec(VM_LOCATION_REQUIRED))?;
                location.parse::<LocationId>()?;
                Ok(AssetSpecs::Vm(decode(asset_type, raw)?))
            }
            AssetType::Switch | AssetType::Firewall => {
                Ok(AssetSpecs::NetworkDevice(decode(asset_type, raw)?))
            }
            AssetType::Host => Ok(AssetSpecs::Host(decode(asset_type, raw)?)),
        }
    }

    pub fn fits(&self, asset_type: AssetType) -> bool {
        matches!(
            (self, asset_type),
            (AssetSpecs::Vm(_), AssetType::Vm)
                | (
                    AssetSpecs::NetworkDevice(_),
                    AssetType::Switch | AssetType::Firewall
                )
                | (AssetSpecs::Host(_), AssetType::Host)
        )
    }

    pub fn infrastructure_location_id(&self) -> Option<LocationId> {
        match self {
            AssetSpecs::Vm(vm) => Some(vm.infrastructure_location_id),
            _ => None,
        }
    }
}

fn decode<T: DeserializeOwned>(asset_type: AssetType, raw: Value) -> Result<T, ValidationError> {
    serde_json::from_value(raw).map_err(|e| {
        ValidationError::invalid_spec(format!("specs do not fit a {asset_type} asset: {e}"))
    })
}

/// Asset document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredAsset")]
pub struct Asset {
    pub hostname: String,
    pub ip_address: String,
    pub asset_type: AssetType,
    pub customer_id: CustomerId,
    pub site_id: Option<SiteId>,
    pub notes: Option<String>,
    pub specs: AssetSpecs,
    pub added: DateTime<Utc>,
    pub modified: Option<DateTime<Utc>>,
}

impl Entity for Asset {
    type Id = AssetId;
    const KIND: EntityKind = EntityKind::Asset;
}

impl Asset {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("hostname", &self.hostname)?;
        if self.ip_address.trim().parse::<IpAddr>().is_err() {
            return Err(ValidationError::invalid_field(
                "ip_address",
                format!("'{}' is not an IP address", self.ip_address),
            ));
        }
        if !self.specs.fits(self.asset_type) {
            return Err(ValidationError::invalid_spec(format!(
                "specs do not fit a {} asset",
                self.asset_type
            )));
        }
        if self.asset_type.is_physical() && self.site_id.is_none() {
            return Err(ValidationError::missing_site(format!(
                "{} asset",
                self.asset_type
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct StoredAsset {
    hostname: String,
    ip_address: String,
    asset_type: AssetType,
    customer_id: CustomerId,
    #[serde(default)]
    site_id: Option<SiteId>,
    #[serde(default)]
    notes: Option<String>,
    specs: Value,
    added: DateTime<Utc>,
    #[serde(default)]
    modified: Option<DateTime<Utc>>,
}

impl TryFrom<StoredAsset> for Asset {
    type Error = DomainError;

    fn try_from(stored: StoredAsset) -> Result<Self, Self::Error> {
        Ok(Self {
            specs: AssetSpecs::parse(stored.asset_type, stored.specs)?,
            hostname: stored.hostname,
            ip_address: stored.ip_address,
            asset_type: stored.asset_type,
            customer_id: stored.customer_id,
            site_id: stored.site_id,
            notes: stored.notes,
            added: stored.added,
            modified: stored.modified,
        })
    }
}

/// Payload for creating an asset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewAsset {
    pub hostname: String,
    pub ip_address: String,
    pub asset_type: AssetType,
    pub customer_id: String,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub specs: Value,
}

impl NewAsset {
    pub fn into_asset(self, now: DateTime<Utc>) -> Result<Asset, DomainError> {
        let customer_id: CustomerId = self.customer_id.parse()?;
        let site_id = parse_optional::<SiteId>(self.site_id.as_deref())?;
        let asset = Asset {
            specs: AssetSpecs::parse(self.asset_type, self.specs)?,
            hostname: self.hostname,
            ip_address: self.ip_address.trim().to_string(),
            asset_type: self.asset_type,
            customer_id,
            site_id,
            notes: self.notes,
            added: now,
            modified: None,
        };
        asset.validate()?;
        Ok(asset)
    }
}

/// Partial asset update. The owning customer is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssetUpdate {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub asset_type: Option<AssetType>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub specs: Option<Value>,
}

impl AssetUpdate {
    /// Merge into `existing`, returning the validated candidate document.
    ///
    /// Changing `asset_type` without new specs re-reads the stored specs under the new
    /// type, so e.g. a host cannot silently become a VM.
    pub fn apply_to(self, existing: &Asset, now: DateTime<Utc>) -> Result<Asset, DomainError> {
        let mut merged = existing.clone();
        if let Some(hostname) = self.hostname {
            merged.hostname = hostname;
        }
        if let Some(ip_address) = self.ip_address {
            merged.ip_address = ip_address.trim().to_string();
        }
        if let Some(asset_type) = self.asset_type {
            merged.asset_type = asset_type;
        }
        if let Some(site_id) = parse_optional::<SiteId>(self.site_id.as_deref())? {
            merged.site_id = Some(site_id);
        }
        if let Some(notes) = self.notes {
            merged.notes = Some(notes);
        }
        let raw_specs = match self.specs {
            Some(specs) => Some(specs),
            None if merged.asset_type != existing.asset_type => {
                Some(serde_json::to_value(&existing.specs).map_err(|e| {
                    ValidationError::invalid_spec(format!("stored specs unreadable: {e}"))
                })?)
            }
            None => None,
        };
        if let Some(raw) = raw_specs {
            merged.specs = AssetSpecs::parse(merged.asset_type, raw)?;
        }
        merged.modified = Some(now);
        merged.validate()?;
        Ok(merged)
    }
}
