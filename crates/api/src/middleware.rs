//! HTTP middleware shared by every route.

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// CORS layer for the configured origins.
///
/// `*` allows any origin (without credentials). An explicit list allows credentials;
/// entries that are not valid header values are skipped. An empty list denies all
/// cross-origin requests.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600));

    if allowed_origins.iter().any(|origin| origin.trim() == "*") {
        info!("CORS allowing any origin");
        return base.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "skipping invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        info!("no CORS origins configured; cross-origin requests are denied");
        return base.allow_origin(AllowOrigin::predicate(|_, _| false));
    }

    info!(count = origins.len(), "CORS configured with allowed origins");
    base.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
