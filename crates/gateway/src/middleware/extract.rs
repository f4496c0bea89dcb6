//! Extractors that report malformed input as `AppError::Validation`

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use scholardemon_common::errors::{AppError, Result};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Query string deserialized into `T` and checked with its validator rules
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

/// JSON body deserialized into `T` and checked with its validator rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

/// Path parameters; a value of the wrong type is a 400 with the usual body
#[derive(Debug, Clone)]
pub struct ValidatedPath<T>(pub T);

fn rejected(message: String) -> AppError {
    AppError::Validation { message, field: None }
}

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| rejected(e.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| rejected(e.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| rejected(e.body_text()))?;
        Ok(Self(value))
    }
}
