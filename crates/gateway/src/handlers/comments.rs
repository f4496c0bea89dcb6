//! Comment thread handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::handlers::MessageResponse;
use crate::middleware::{AuthUser, ValidatedJson, ValidatedPath};
use crate::AppState;
use scholardemon_common::{
    db::{
        repository::NewComment,
        views::{CommentView, ThreadedComment, UserComment},
    },
    errors::Result,
};

fn not_blank(text: &str) -> std::result::Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Comment text is required".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub paper_id: i32,
    pub parent_comment_id: Option<i32>,
    #[validate(length(min = 1, max = 5000), custom(function = "not_blank"))]
    pub comment_text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 5000), custom(function = "not_blank"))]
    pub comment_text: String,
}

/// Whole thread of a paper in display order
pub async fn paper_comments(
    State(state): State<AppState>,
    ValidatedPath(paper_id): ValidatedPath<i32>,
) -> Result<Json<Vec<ThreadedComment>>> {
    let thread = state.repo().comment_thread(paper_id).await?;
    Ok(Json(thread))
}

pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(body): ValidatedJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentView>)> {
    let comment = state
        .repo()
        .create_comment(
            &user,
            NewComment {
                paper_id: body.paper_id,
                parent_comment_id: body.parent_comment_id,
                comment_text: body.comment_text.trim().to_string(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedPath(comment_id): ValidatedPath<i32>,
    ValidatedJson(body): ValidatedJson<UpdateCommentRequest>,
) -> Result<Json<CommentView>> {
    let comment = state
        .repo()
        .update_comment(&user, comment_id, body.comment_text.trim().to_string())
        .await?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedPath(comment_id): ValidatedPath<i32>,
) -> Result<Json<MessageResponse>> {
    state.repo().delete_comment(&user, comment_id).await?;
    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}

/// The caller's latest comments
pub async fn my_comments(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<UserComment>>> {
    let comments = state.repo().user_comments(user.user_id).await?;
    Ok(Json(comments))
}
