use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    routing::{get, post},
    Router,
};

use assetdesk_assets::AssetType;
use assetdesk_core::{DomainError, EntityKind, LocationId};
use assetdesk_infra::Filter;
use assetdesk_infrastructure::{InfrastructureUpdate, NewInfrastructure};

use crate::app::dto::{self, InfrastructureListQuery, Payload};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/infrastructure", post(create_location).get(list_locations))
        .route("/infrastructure/", post(create_location).get(list_locations))
        .route(
            "/infrastructure/:id",
            get(get_location).put(update_location).delete(delete_location),
        )
        .route("/infrastructure/:id/vms", get(list_location_vms))
}

pub async fn list_locations(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<InfrastructureListQuery>,
) -> axum::response::Response {
    let filter = match query.filter() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.locations.find(&filter).await {
        Ok(items) => dto::ok(items),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_location(
    Extension(services): Extension<Arc<AppServices>>,
    Payload(body): Payload<NewInfrastructure>,
) -> axum::response::Response {
    match services.placement.create_location(body).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_location(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: LocationId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.locations.fetch(id).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_location(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Payload(body): Payload<InfrastructureUpdate>,
) -> axum::response::Response {
    match services.placement.update_location(&id, body).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Assets referencing the location are left in place.
pub async fn delete_location(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: LocationId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.locations.delete(id).await {
        Ok(true) => dto::message("Infrastructure location deleted successfully"),
        Ok(false) => errors::domain_error_to_response(DomainError::not_found(
            EntityKind::InfrastructureLocation,
        )),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// VMs whose specs reference this location.
pub async fn list_location_vms(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: LocationId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(e) = services.locations.fetch(id).await {
        return errors::service_error_to_response(e);
    }

    let filter = Filter::new()
        .eq("asset_type", AssetType::Vm.as_str())
        .eq("specs.infrastructure_location_id", id.to_string());
    match services.assets.find(&filter).await {
        Ok(items) => dto::ok(items),
        Err(e) => errors::service_error_to_response(e),
    }
}
