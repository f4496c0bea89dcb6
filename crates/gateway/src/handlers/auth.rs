//! Registration, login and profile handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::handlers::MessageResponse;
use crate::middleware::{AuthUser, ValidatedJson};
use crate::AppState;
use scholardemon_common::{
    auth::Role,
    db::{
        models::{SearchHistory, User},
        repository::NewUser,
    },
    errors::{AppError, Result},
    metrics,
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 255))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 6, max = 128))]
    pub new_password: String,
}

/// Signed-in user plus a fresh bearer token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

fn issue(state: &AppState, user: User) -> Result<AuthResponse> {
    let token = state.jwt.generate_token(user.user_id, user.role())?;
    Ok(AuthResponse { user, token })
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let role = body.role.unwrap_or(Role::User);

    let user = state
        .repo()
        .register(NewUser {
            name: body.name,
            email: body.email,
            password: body.password,
            role,
        })
        .await?;

    metrics::record_registration(role.as_str());
    Ok((StatusCode::CREATED, Json(issue(&state, user)?)))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = state.repo().authenticate(&body.email, &body.password).await?;
    Ok(Json(issue(&state, user)?))
}

pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let name = body.name.ok_or_else(|| AppError::Validation {
        message: "No updates provided".to_string(),
        field: None,
    })?;

    let user = state.repo().update_profile(user, name).await?;
    Ok(Json(user))
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(body): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .repo()
        .change_password(user, &body.current_password, &body.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

pub async fn search_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<SearchHistory>>> {
    let history = state.repo().search_history(user.user_id).await?;
    Ok(Json(history))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_rules() {
        let body: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "A",
            "email": "not-an-email",
            "password": "123"
        }))
        .unwrap();
        let errors = body.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_change_password_uses_camel_case() {
        let body: ChangePasswordRequest = serde_json::from_value(serde_json::json!({
            "currentPassword": "old secret",
            "newPassword": "new secret"
        }))
        .unwrap();
        assert_eq!(body.current_password, "old secret");
        assert!(body.validate().is_ok());
    }
}
