use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    routing::{get, post},
    Router,
};

use assetdesk_core::SiteId;
use assetdesk_customers::{NewSite, SiteUpdate};

use crate::app::dto::{self, Payload, SiteListQuery};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/sites", post(create_site).get(list_sites))
        .route("/sites/", post(create_site).get(list_sites))
        .route(
            "/sites/:id",
            get(get_site).put(update_site).delete(delete_site),
        )
}

pub async fn list_sites(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<SiteListQuery>,
) -> axum::response::Response {
    let filter = match query.filter() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.sites.find(&filter).await {
        Ok(items) => dto::ok(items),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_site(
    Extension(services): Extension<Arc<AppServices>>,
    Payload(body): Payload<NewSite>,
) -> axum::response::Response {
    match services.lifecycle.create_site(body).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_site(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SiteId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.sites.fetch(id).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_site(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Payload(body): Payload<SiteUpdate>,
) -> axum::response::Response {
    match services.lifecycle.update_site(&id, body).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_site(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.lifecycle.delete_site(&id).await {
        Ok(()) => dto::message("Site deleted successfully"),
        Err(e) => errors::service_error_to_response(e),
    }
}
