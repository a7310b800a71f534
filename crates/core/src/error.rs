//! Domain error model.

use thiserror::Error;

use crate::entity::EntityKind;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// referential integrity, lifecycle rules). Store failures belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier was malformed (parse failure).
    #[error("invalid {0}")]
    InvalidIdFormat(String),

    /// The target or a referenced document does not exist.
    #[error("{0} not found")]
    NotFound(EntityKind),

    /// A structural or cross-field rule was violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another document already uses the requested name.
    #[error("{0}")]
    DuplicateName(String),

    /// A referenced child belongs to a different customer.
    #[error("{child} does not belong to the specified customer")]
    OwnershipMismatch { child: EntityKind },

    /// The first site is created together with its customer.
    #[error(
        "first site is automatically created with the customer; edit the existing site instead"
    )]
    FirstSiteAutoCreated,

    /// A customer's only remaining site cannot be removed on its own.
    #[error("cannot delete the only site for a customer; delete the customer instead")]
    LastSiteProtected,
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidIdFormat(msg.into())
    }

    pub fn not_found(kind: EntityKind) -> Self {
        Self::NotFound(kind)
    }

    pub fn duplicate_name(msg: impl Into<String>) -> Self {
        Self::DuplicateName(msg.into())
    }

    pub fn ownership(child: EntityKind) -> Self {
        Self::OwnershipMismatch { child }
    }
}

/// Structured validation failure: names the violated field and rule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Physical placement requires a site.
    #[error("{subject} requires site_id")]
    MissingSite { subject: String },

    /// Asset specs do not fit the declared asset type.
    #[error("invalid specs: {0}")]
    InvalidSpec(String),

    /// Location config does not fit the declared location type.
    #[error("config does not match location type '{expected}': {reason}")]
    TypeMismatch { expected: String, reason: String },

    /// A plain field carries an unusable value.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn missing_site(subject: impl Into<String>) -> Self {
        Self::MissingSite {
            subject: subject.into(),
        }
    }

    pub fn invalid_spec(msg: impl Into<String>) -> Self {
        Self::InvalidSpec(msg.into())
    }

    pub fn type_mismatch(expected: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingSite { .. } => "site_id",
            Self::InvalidSpec(_) => "specs",
            Self::TypeMismatch { .. } => "config",
            Self::InvalidField { field, .. } => field,
        }
    }

    /// Stable rule code (used in API error bodies).
    pub fn rule(&self) -> &'static str {
        match self {
            Self::MissingSite { .. } => "missing_site",
            Self::InvalidSpec(_) => "invalid_spec",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::InvalidField { .. } => "invalid_field",
        }
    }
}

/// Reject empty / whitespace-only text.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::invalid_field(field, "must not be empty"));
    }
    Ok(())
}
