use core::fmt;
use core::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use assetdesk_core::error::require_text;
use assetdesk_core::id::parse_optional;
use assetdesk_core::{
    CustomerId, DomainError, Entity, EntityKind, LocationId, SiteId, ValidationError,
    ValueObject,
};

/// Where an infrastructure location lives.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Azure,
    Aws,
    OnPremise,
    Datacenter,
}

impl LocationType {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationType::Azure => "azure",
            LocationType::Aws => "aws",
            LocationType::OnPremise => "on_premise",
            LocationType::Datacenter => "datacenter",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "azure" => Ok(LocationType::Azure),
            "aws" => Ok(LocationType::Aws),
            "on_premise" => Ok(LocationType::OnPremise),
            "datacenter" => Ok(LocationType::Datacenter),
            other => Err(ValidationError::invalid_field(
                "location_type",
                format!("unknown location type '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureConfig {
    pub subscription_id: String,
    pub resource_group: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub vpc_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatacenterConfig {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnPremiseConfig {
    pub location: String,
}

/// Location configuration; the variant is selected by the sibling `type` field.
///
/// Serialized without a tag (the document's `type` already is one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LocationConfig {
    Azure(AzureConfig),
    Aws(AwsConfig),
    Datacenter(DatacenterConfig),
    OnPremise(OnPremiseConfig),
}

impl ValueObject for LocationConfig {}

impl LocationConfig {
    /// Decode a raw config payload as the variant `location_type` calls for.
    pub fn parse(location_type: LocationType, raw: Value) -> Result<Self, ValidationError> {
        Ok(match location_type {
            LocationType::Azure => LocationConfig::Azure(decode(location_type, raw)?),
            LocationType::Aws => LocationConfig::Aws(decode(location_type, raw)?),
            LocationType::Datacenter => LocationConfig::Datacenter(decode(location_type, raw)?),
            LocationType::OnPremise => LocationConfig::OnPremise(decode(location_type, raw)?),
        })
    }

    pub fn location_type(&self) -> LocationType {
        match self {
            LocationConfig::Azure(_) => LocationType::Azure,
            LocationConfig::Aws(_) => LocationType::Aws,
            LocationConfig::Datacenter(_) => LocationType::Datacenter,
            LocationConfig::OnPremise(_) => LocationType::OnPremise,
        }
    }
}

fn decode<T: DeserializeOwned>(
    location_type: LocationType,
    raw: Value,
) -> Result<T, ValidationError> {
    serde_json::from_value(raw)
        .map_err(|e| ValidationError::type_mismatch(location_type.as_str(), e.to_string()))
}

/// Infrastructure location document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredLocation")]
pub struct InfrastructureLocation {
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub customer_id: CustomerId,
    pub description: Option<String>,
    pub config: LocationConfig,
    pub is_active: bool,
    pub site_id: Option<SiteId>,
}

impl Entity for InfrastructureLocation {
    type Id = LocationId;
    const KIND: EntityKind = EntityKind::InfrastructureLocation;
}

impl InfrastructureLocation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        if self.config.location_type() != self.location_type {
            return Err(ValidationError::type_mismatch(
                self.location_type.as_str(),
                format!("got a {} config", self.config.location_type()),
            ));
        }
        if self.location_type == LocationType::OnPremise && self.site_id.is_none() {
            return Err(ValidationError::missing_site(
                "on_premise infrastructure location",
            ));
        }
        Ok(())
    }
}

/// Shape read back from the store: config stays raw until the tag is known.
#[derive(Deserialize)]
struct StoredLocation {
    name: String,
    #[serde(rename = "type")]
    location_type: LocationType,
    customer_id: CustomerId,
    #[serde(default)]
    description: Option<String>,
    config: Value,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    site_id: Option<SiteId>,
}

impl TryFrom<StoredLocation> for InfrastructureLocation {
    type Error = ValidationError;

    fn try_from(stored: StoredLocation) -> Result<Self, Self::Error> {
        Ok(Self {
            config: LocationConfig::parse(stored.location_type, stored.config)?,
            name: stored.name,
            location_type: stored.location_type,
            customer_id: stored.customer_id,
            description: stored.description,
            is_active: stored.is_active,
            site_id: stored.site_id,
        })
    }
}

fn default_active() -> bool {
    true
}

/// Payload for creating an infrastructure location.
///
/// Ids and config are kept raw so malformed ids and config mismatches map to their own
/// error kinds instead of a generic body rejection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewInfrastructure {
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub customer_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub config: Value,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub site_id: Option<String>,
}

impl NewInfrastructure {
    /// Parse ids and config, then validate the resulting document.
    pub fn into_location(self) -> Result<InfrastructureLocation, DomainError> {
        let customer_id: CustomerId = self.customer_id.parse()?;
        let site_id = parse_optional::<SiteId>(self.site_id.as_deref())?;
        let location = InfrastructureLocation {
            config: LocationConfig::parse(self.location_type, self.config)?,
            name: self.name,
            location_type: self.location_type,
            customer_id,
            description: self.description,
            is_active: self.is_active,
            site_id,
        };
        location.validate()?;
        Ok(location)
    }
}

/// Partial update of a location. Type and owning customer are fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InfrastructureUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: Option<Value>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub site_id: Option<String>,
}

impl InfrastructureUpdate {
    /// Merge into `existing`, returning the validated candidate document.
    pub fn apply_to(
        self,
        existing: &InfrastructureLocation,
    ) -> Result<InfrastructureLocation, DomainError> {
        let mut merged = existing.clone();
        if let Some(name) = self.name {
            merged.name = name;
        }
        if let Some(description) = self.description {
            merged.description = Some(description);
        }
        if let Some(config) = self.config {
            merged.config = LocationConfig::parse(merged.location_type, config)?;
        }
        if let Some(is_active) = self.is_active {
            merged.is_active = is_active;
        }
        if let Some(site_id) = parse_optional::<SiteId>(self.site_id.as_deref())? {
            merged.site_id = Some(site_id);
        }
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn on_prem_payload(site_id: Option<String>) -> NewInfrastructure {
        NewInfrastructure {
            name: "Server room".to_string(),
            location_type: LocationType::OnPremise,
            customer_id: CustomerId::new().to_string(),
            description: None,
            config: json!({ "location": "Basement" }),
            is_active: true,
            site_id,
        }
    }

    #[test]
    fn on_premise_without_site_is_missing_site() {
        let err = on_prem_payload(None).into_location().unwrap_err();
        match err {
            DomainError::Validation(v) => assert_eq!(v.rule(), "missing_site"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn on_premise_with_blank_site_is_missing_site() {
        let err = on_prem_payload(Some(" ".to_string()))
            .into_location()
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::MissingSite { .. })
        ));
    }

    #[test]
    fn on_premise_with_site_is_accepted() {
        let site_id = SiteId::new();
        let location = on_prem_payload(Some(site_id.to_string()))
            .into_location()
            .unwrap();
        assert_eq!(location.site_id, Some(site_id));
        assert_eq!(
            location.config,
            LocationConfig::OnPremise(OnPremiseConfig {
                location: "Basement".to_string()
            })
        );
    }

    #[test]
    fn malformed_site_id_is_an_id_error() {
        let err = on_prem_payload(Some("not-a-uuid".to_string()))
            .into_location()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidIdFormat(_)));
    }

    #[test]
    fn config_must_match_type() {
        let err = LocationConfig::parse(LocationType::Aws, json!({ "location": "Basement" }))
            .unwrap_err();
        assert_eq!(err.rule(), "type_mismatch");
        assert_eq!(err.field(), "config");
    }

    #[test]
    fn azure_config_round_trips_through_document() {
        let location = NewInfrastructure {
            name: "Prod".to_string(),
            location_type: LocationType::Azure,
            customer_id: CustomerId::new().to_string(),
            description: Some("main subscription".to_string()),
            config: json!({
                "subscription_id": "sub-1",
                "resource_group": "rg",
                "region": "westeurope"
            }),
            is_active: true,
            site_id: None,
        }
        .into_location()
        .unwrap();

        let doc = serde_json::to_value(&location).unwrap();
        assert_eq!(doc["type"], "azure");
        assert_eq!(doc["config"]["region"], "westeurope");
        let back: InfrastructureLocation = serde_json::from_value(doc).unwrap();
        assert_eq!(back, location);
    }

    #[test]
    fn is_active_defaults_to_true() {
        let payload: NewInfrastructure = serde_json::from_value(json!({
            "name": "DC",
            "type": "datacenter",
            "customer_id": CustomerId::new().to_string(),
            "config": { "name": "FRA1" }
        }))
        .unwrap();
        assert!(payload.is_active);
    }

    #[test]
    fn update_reparses_config_under_existing_type() {
        let existing = on_prem_payload(Some(SiteId::new().to_string()))
            .into_location()
            .unwrap();
        let update = InfrastructureUpdate {
            config: Some(json!({ "region": "eu-west-1", "vpc_id": "vpc-1" })),
            ..Default::default()
        };
        let err = update.apply_to(&existing).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn update_merges_present_fields_only() {
        let existing = on_prem_payload(Some(SiteId::new().to_string()))
            .into_location()
            .unwrap();
        let update: InfrastructureUpdate =
            serde_json::from_value(json!({ "is_active": false, "name": null })).unwrap();
        let merged = update.apply_to(&existing).unwrap();
        assert!(!merged.is_active);
        assert_eq!(merged.name, existing.name);
        assert_eq!(merged.site_id, existing.site_id);
    }

    #[test]
    fn location_type_parses_query_values() {
        assert_eq!("on_premise".parse::<LocationType>().unwrap(), LocationType::OnPremise);
        assert!("mainframe".parse::<LocationType>().is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_location_type() -> impl Strategy<Value = LocationType> {
            prop_oneof![
                Just(LocationType::Azure),
                Just(LocationType::Aws),
                Just(LocationType::OnPremise),
                Just(LocationType::Datacenter),
            ]
        }

        proptest! {
            /// Property: a datacenter config is only ever accepted for the datacenter type.
            #[test]
            fn datacenter_config_only_fits_datacenter(
                location_type in any_location_type(),
                name in "[a-zA-Z0-9]{1,12}"
            ) {
                let parsed = LocationConfig::parse(location_type, json!({ "name": name }));
                prop_assert_eq!(parsed.is_ok(), location_type == LocationType::Datacenter);
            }

            /// Property: only on_premise locations demand a site.
            #[test]
            fn only_on_premise_requires_site(location_type in any_location_type()) {
                let config = match location_type {
                    LocationType::Azure => json!({"subscription_id": "s", "resource_group": "r", "region": "x"}),
                    LocationType::Aws => json!({"region": "x", "vpc_id": "v"}),
                    LocationType::OnPremise => json!({"location": "l"}),
                    LocationType::Datacenter => json!({"name": "n"}),
                };
                let result = NewInfrastructure {
                    name: "loc".to_string(),
                    location_type,
                    customer_id: CustomerId::new().to_string(),
                    description: None,
                    config,
                    is_active: true,
                    site_id: None,
                }
                .into_location();
                prop_assert_eq!(result.is_err(), location_type == LocationType::OnPremise);
            }
        }
    }
}
