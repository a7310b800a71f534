use serde::{Deserialize, Serialize};

use assetdesk_core::error::require_text;
use assetdesk_core::{CustomerId, Entity, EntityKind, ValidationError, ValueObject};

/// Postal address shared by customers and sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub country: String,
    pub city: String,
    pub street_address: String,
    pub postal_code: String,
}

impl ValueObject for Address {}

/// Customer document (the ownership root).
///
/// Also used as the creation payload: creating a customer takes exactly the stored
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub contact_email: String,
    pub contact_phone: String,
    #[serde(default)]
    pub address: Option<Address>,
}

impl Entity for Customer {
    type Id = CustomerId;
    const KIND: EntityKind = EntityKind::Customer;
}

impl Customer {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        validate_email(&self.contact_email)
    }

    /// Identity used for duplicate detection: (name, contact email).
    pub fn identity(&self) -> (&str, &str) {
        (&self.name, &self.contact_email)
    }
}

/// Partial customer update. Absent (or null) fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl CustomerUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(email) = &self.contact_email {
            validate_email(email)?;
        }
        Ok(())
    }

    /// The (name, email) pair to check for duplicates; only when both are supplied.
    pub fn identity(&self) -> Option<(&str, &str)> {
        match (&self.name, &self.contact_email) {
            (Some(name), Some(email)) => Some((name, email)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    require_text("contact_email", email)?;
    if !email.contains('@') {
        return Err(ValidationError::invalid_field(
            "contact_email",
            "must be an email address",
        ));
    }
    Ok(())
}
