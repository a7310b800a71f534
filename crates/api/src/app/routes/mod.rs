use axum::Router;

pub mod assets;
pub mod customers;
pub mod infrastructure;
pub mod sites;
pub mod system;

/// Router for all resource endpoints.
///
/// Collection routes are registered with and without a trailing slash.
pub fn router() -> Router {
    Router::new()
        .merge(customers::router())
        .merge(sites::router())
        .merge(infrastructure::router())
        .merge(assets::router())
}
