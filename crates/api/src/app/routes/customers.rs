use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    routing::{get, post},
    Router,
};

use assetdesk_core::CustomerId;
use assetdesk_customers::{Customer, CustomerUpdate};
use assetdesk_infra::Filter;

use crate::app::dto::{self, Payload};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/customers", post(create_customer).get(list_customers))
        .route("/customers/", post(create_customer).get(list_customers))
        .route(
            "/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.customers.find(&Filter::new()).await {
        Ok(items) => dto::ok(items),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Payload(body): Payload<Customer>,
) -> axum::response::Response {
    match services.lifecycle.create_customer(body).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CustomerId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.customers.fetch(id).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Payload(body): Payload<CustomerUpdate>,
) -> axum::response::Response {
    match services.lifecycle.update_customer(&id, body).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Deletes the customer's sites too. Infrastructure and assets are left in place.
pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.lifecycle.delete_customer(&id).await {
        Ok(()) => dto::message("Customer and associated sites deleted successfully"),
        Err(e) => errors::service_error_to_response(e),
    }
}
