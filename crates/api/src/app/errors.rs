use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use assetdesk_core::{DomainError, ValidationError};
use assetdesk_infra::ServiceError;

/// Build a JSON error response with a stable code and a human-readable detail.
pub fn json_error(status: StatusCode, code: &'static str, detail: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "detail": detail.into(),
        })),
    )
        .into_response()
}

/// Validation failures also name the offending field.
pub fn validation_error(err: &ValidationError) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": err.rule(),
            "detail": err.to_string(),
            "field": err.field(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match &err {
        DomainError::InvalidIdFormat(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", err.to_string())
        }
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        DomainError::Validation(v) => validation_error(v),
        DomainError::DuplicateName(_) => {
            json_error(StatusCode::BAD_REQUEST, "duplicate_name", err.to_string())
        }
        DomainError::OwnershipMismatch { .. } => {
            json_error(StatusCode::BAD_REQUEST, "ownership_mismatch", err.to_string())
        }
        DomainError::FirstSiteAutoCreated => json_error(
            StatusCode::BAD_REQUEST,
            "first_site_auto_created",
            err.to_string(),
        ),
        DomainError::LastSiteProtected => {
            json_error(StatusCode::BAD_REQUEST, "last_site_protected", err.to_string())
        }
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "document store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}
