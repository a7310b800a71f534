use std::str::FromStr;

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use assetdesk_assets::AssetType;
use assetdesk_core::id::parse_optional;
use assetdesk_core::{CustomerId, DomainError, SiteId, ValidationError};
use assetdesk_infra::Filter;
use assetdesk_infrastructure::LocationType;

use super::errors;

/// JSON body extractor whose rejection uses the API error shape.
pub struct Payload<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_payload",
                rejection.body_text(),
            )),
        }
    }
}

/// 200 with a JSON body.
pub fn ok<T: Serialize>(body: T) -> axum::response::Response {
    (StatusCode::OK, axum::Json(body)).into_response()
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub fn message(message: &'static str) -> axum::response::Response {
    ok(MessageResponse { message })
}

pub fn parse_id<I>(raw: &str) -> Result<I, axum::response::Response>
where
    I: FromStr<Err = DomainError>,
{
    raw.parse().map_err(errors::domain_error_to_response)
}

fn parse_ref<I>(raw: Option<&str>) -> Result<Option<String>, DomainError>
where
    I: FromStr<Err = DomainError> + ToString,
{
    Ok(parse_optional::<I>(raw)?.map(|id| id.to_string()))
}

fn parse_kind<K>(
    raw: Option<&str>,
    as_str: fn(K) -> &'static str,
) -> Result<Option<&'static str>, DomainError>
where
    K: FromStr<Err = ValidationError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Ok(Some(as_str(s.parse::<K>()?))),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SiteListQuery {
    pub customer_id: Option<String>,
}

impl SiteListQuery {
    pub fn filter(&self) -> Result<Filter, DomainError> {
        let customer_id = parse_ref::<CustomerId>(self.customer_id.as_deref())?;
        Ok(Filter::new().eq_opt("customer_id", customer_id))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InfrastructureListQuery {
    pub customer_id: Option<String>,
    pub site_id: Option<String>,
    pub location_type: Option<String>,
}

impl InfrastructureListQuery {
    pub fn filter(&self) -> Result<Filter, DomainError> {
        let customer_id = parse_ref::<CustomerId>(self.customer_id.as_deref())?;
        let site_id = parse_ref::<SiteId>(self.site_id.as_deref())?;
        let location_type = parse_kind(self.location_type.as_deref(), LocationType::as_str)?;
        Ok(Filter::new()
            .eq_opt("customer_id", customer_id)
            .eq_opt("site_id", site_id)
            .eq_opt("type", location_type))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AssetListQuery {
    pub customer_id: Option<String>,
    pub asset_type: Option<String>,
}

impl AssetListQuery {
    pub fn filter(&self) -> Result<Filter, DomainError> {
        let customer_id = parse_ref::<CustomerId>(self.customer_id.as_deref())?;
        let asset_type = parse_kind(self.asset_type.as_deref(), AssetType::as_str)?;
        Ok(Filter::new()
            .eq_opt("customer_id", customer_id)
            .eq_opt("asset_type", asset_type))
    }
}
