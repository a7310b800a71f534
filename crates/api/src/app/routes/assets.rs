use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    routing::{get, post},
    Router,
};

use assetdesk_assets::{AssetUpdate, NewAsset};
use assetdesk_core::{AssetId, DomainError, EntityKind, SiteId};
use assetdesk_infra::Filter;

use crate::app::dto::{self, AssetListQuery, Payload};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/assets", post(create_asset).get(list_assets))
        .route("/assets/", post(create_asset).get(list_assets))
        .route(
            "/assets/:id",
            get(get_asset).put(update_asset).delete(delete_asset),
        )
        .route("/assets/site/:site_id", get(list_site_assets))
}

pub async fn list_assets(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<AssetListQuery>,
) -> axum::response::Response {
    let filter = match query.filter() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.assets.find(&filter).await {
        Ok(items) => dto::ok(items),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_asset(
    Extension(services): Extension<Arc<AppServices>>,
    Payload(body): Payload<NewAsset>,
) -> axum::response::Response {
    match services.placement.create_asset(body).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_asset(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AssetId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.assets.fetch(id).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_asset(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Payload(body): Payload<AssetUpdate>,
) -> axum::response::Response {
    match services.placement.update_asset(&id, body).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_asset(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AssetId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.assets.delete(id).await {
        Ok(true) => dto::message("Asset deleted successfully"),
        Ok(false) => errors::domain_error_to_response(DomainError::not_found(EntityKind::Asset)),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Assets placed at a site. An unknown site simply has no assets.
pub async fn list_site_assets(
    Extension(services): Extension<Arc<AppServices>>,
    Path(site_id): Path<String>,
) -> axum::response::Response {
    let site_id: SiteId = match dto::parse_id(&site_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let filter = Filter::new().eq("site_id", site_id.to_string());
    match services.assets.find(&filter).await {
        Ok(items) => dto::ok(items),
        Err(e) => errors::service_error_to_response(e),
    }
}
