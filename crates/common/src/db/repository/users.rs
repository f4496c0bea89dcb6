//! Accounts, credentials and search history

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::Repository;
use crate::auth::{hash_password, verify_password, Role};
use crate::db::models::*;
use crate::errors::{AppError, Result};

/// Searches shown on the profile page
const SEARCH_HISTORY_LIMIT: u64 = 20;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Repository {
    /// Create an account. Admin accounts cannot be self-registered.
    pub async fn register(&self, input: NewUser) -> Result<User> {
        if !input.role.is_self_assignable() {
            return Err(AppError::validation("role", "Role cannot be self-assigned"));
        }

        let email = normalize_email(&input.email);
        let password_hash = hash_password(&input.password)?;

        let user = UserActiveModel {
            name: Set(input.name.trim().to_string()),
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            role: Set(input.role.into()),
            is_verified: Set(false),
            created_at: Set(chrono::Utc::now().fixed_offset()),
            last_login: Set(None),
            ..Default::default()
        }
        .insert(self.write_conn())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Duplicate { .. } => AppError::DuplicateEmail { email: email.clone() },
            err => err,
        })?;

        tracing::info!(user_id = user.user_id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Check credentials and stamp `last_login`
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let user = UserEntity::find()
            .filter(UserColumn::Email.eq(normalize_email(email)))
            .one(self.read_conn())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            tracing::warn!(user_id = user.user_id, "Login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let mut active: UserActiveModel = user.into();
        active.last_login = Set(Some(chrono::Utc::now().fixed_offset()));
        let user = active.update(self.write_conn()).await?;

        tracing::info!(user_id = user.user_id, "User logged in");
        Ok(user)
    }

    pub async fn find_user(&self, user_id: i32) -> Result<Option<User>> {
        UserEntity::find_by_id(user_id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn update_profile(&self, user: User, name: String) -> Result<User> {
        let mut active: UserActiveModel = user.into();
        active.name = Set(name.trim().to_string());
        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Replace the password after checking the current one
    pub async fn change_password(&self, user: User, current: &str, new: &str) -> Result<()> {
        if !verify_password(current, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        let user_id = user.user_id;
        let mut active: UserActiveModel = user.into();
        active.password_hash = Set(hash_password(new)?);
        active.update(self.write_conn()).await?;

        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    /// Latest searches, newest first
    pub async fn search_history(&self, user_id: i32) -> Result<Vec<SearchHistory>> {
        SearchHistoryEntity::find()
            .filter(SearchHistoryColumn::UserId.eq(user_id))
            .order_by_desc(SearchHistoryColumn::SearchedAt)
            .order_by_desc(SearchHistoryColumn::SearchId)
            .limit(SEARCH_HISTORY_LIMIT)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use sea_orm::{DbErr, RuntimeErr};

    fn stored_user(password: &str) -> User {
        User {
            user_id: 7,
            name: "Grace".into(),
            email: "grace@example.com".into(),
            password_hash: hash_password(password).unwrap(),
            role: "user".into(),
            is_verified: false,
            created_at: chrono::Utc::now().fixed_offset(),
            last_login: None,
        }
    }

    fn new_user(role: Role) -> NewUser {
        NewUser {
            name: "Grace".into(),
            email: " Grace@Example.com ".into(),
            password: "correct horse".into(),
            role,
        }
    }

    #[test]
    fn test_email_normalized() {
        assert_eq!(normalize_email(" Grace@Example.COM "), "grace@example.com");
    }

    #[tokio::test]
    async fn test_admin_registration_rejected() {
        let err = repo(mock()).register(new_user(Role::Admin)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_register_returns_created_user() {
        let db = mock().append_query_results([vec![stored_user("correct horse")]]);
        let user = repo(db).register(new_user(Role::Author)).await.unwrap();
        assert_eq!(user.user_id, 7);
        assert_eq!(user.email, "grace@example.com");
    }

    #[tokio::test]
    async fn test_register_surfaces_database_failure() {
        let db = mock().append_query_errors([DbErr::Query(RuntimeErr::Internal("down".into()))]);
        let err = repo(db).register(new_user(Role::User)).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let db = mock().append_query_results([vec![stored_user("correct horse")]]);
        let err = repo(db).authenticate("grace@example.com", "battery").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unknown_email_rejected() {
        let db = mock().append_query_results([Vec::<User>::new()]);
        let err = repo(db).authenticate("nobody@example.com", "x").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_change_password_checks_current() {
        let err = repo(mock())
            .change_password(stored_user("old secret"), "not it", "new secret")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }
}
