//! Bearer-token authentication extractors
//!
//! `AuthUser` rejects the request when the token is missing, malformed,
//! expired or names a user that no longer exists. `OptionalUser` treats all
//! of those as an anonymous caller.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use scholardemon_common::{
    auth::extract_bearer_token,
    db::models::User,
    errors::{AppError, Result},
};

use crate::AppState;

/// The signed-in user behind a valid bearer token
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// The signed-in user when a valid token was sent, otherwise `None`
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer_token)
}

async fn resolve_user(token: &str, state: &AppState) -> Result<User> {
    let claims = state.jwt.validate_token(token)?;
    let user_id = claims.user_id()?;

    state.repo().find_user(user_id).await?.ok_or_else(|| {
        tracing::warn!(user_id, "Token names an unknown user");
        AppError::InvalidToken
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(parts).ok_or_else(|| AppError::Unauthorized {
            message: "Missing bearer token".to_string(),
        })?;

        resolve_user(token, state).await.map(AuthUser)
    }
}

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Some(token) = bearer_token(parts) else {
            return Ok(OptionalUser(None));
        };

        match resolve_user(token, state).await {
            Ok(user) => Ok(OptionalUser(Some(user))),
            Err(AppError::InvalidToken | AppError::ExpiredToken) => Ok(OptionalUser(None)),
            Err(e) => Err(e),
        }
    }
}
