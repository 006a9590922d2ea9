//! Axum extractors that reject with [`ShopError`] instead of axum's
//! plain-text rejections, so every failure uses the JSON error envelope.

use crate::core::error::{ShopError, ValidationError};
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has been deserialized and validated
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn insert_customer(
///     State(state): State<AppState>,
///     ValidatedJson(input): ValidatedJson<CustomerInput>,
/// ) -> ShopResult<ApiResponse<Created>> {
///     // input already passed `Validate::validate`
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ShopError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationError::InvalidJson {
                message: rejection.body_text(),
            })?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Path parameters, e.g. `ShopPath(id): ShopPath<i64>`
#[derive(Debug, Clone)]
pub struct ShopPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ShopPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ShopError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ValidationError::InvalidPath {
                message: rejection.body_text(),
            })?;
        Ok(ShopPath(value))
    }
}

/// Query string parameters
#[derive(Debug, Clone)]
pub struct ShopQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ShopQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ShopError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ValidationError::InvalidParameter {
                name: "query".to_string(),
                message: rejection.body_text(),
            })?;
        Ok(ShopQuery(value))
    }
}
