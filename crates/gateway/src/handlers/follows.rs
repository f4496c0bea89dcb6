//! Follow handlers and the follow feed

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::handlers::{MessageResponse, PageQuery};
use crate::middleware::{AuthUser, ValidatedPath, ValidatedQuery};
use crate::AppState;
use scholardemon_common::{
    db::{
        repository::FollowOutcome,
        views::{FeedItem, FollowedAuthor, FollowedVenue},
        Paginated,
    },
    errors::Result,
};

#[derive(Debug, Serialize)]
pub struct FollowCheck {
    pub is_following: bool,
}

/// 201 for a new follow, 200 when it already existed
fn follow_response(outcome: FollowOutcome, target: &str) -> (StatusCode, Json<MessageResponse>) {
    match outcome {
        FollowOutcome::Followed => (
            StatusCode::CREATED,
            Json(MessageResponse::new(format!("Successfully followed {target}"))),
        ),
        FollowOutcome::AlreadyFollowing => (
            StatusCode::OK,
            Json(MessageResponse::new(format!("Already following this {target}"))),
        ),
    }
}

pub async fn follow_author(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedPath(author_id): ValidatedPath<i32>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let outcome = state.repo().follow_author(user.user_id, author_id).await?;
    Ok(follow_response(outcome, "author"))
}

pub async fn unfollow_author(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedPath(author_id): ValidatedPath<i32>,
) -> Result<Json<MessageResponse>> {
    state.repo().unfollow_author(user.user_id, author_id).await?;
    Ok(Json(MessageResponse::new("Successfully unfollowed author")))
}

pub async fn followed_authors(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<FollowedAuthor>>> {
    let authors = state.repo().followed_authors(user.user_id).await?;
    Ok(Json(authors))
}

pub async fn check_author(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedPath(author_id): ValidatedPath<i32>,
) -> Result<Json<FollowCheck>> {
    let is_following = state.repo().is_following_author(user.user_id, author_id).await?;
    Ok(Json(FollowCheck { is_following }))
}

pub async fn follow_venue(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedPath(venue_id): ValidatedPath<i32>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let outcome = state.repo().follow_venue(user.user_id, venue_id).await?;
    Ok(follow_response(outcome, "venue"))
}

pub async fn unfollow_venue(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedPath(venue_id): ValidatedPath<i32>,
) -> Result<Json<MessageResponse>> {
    state.repo().unfollow_venue(user.user_id, venue_id).await?;
    Ok(Json(MessageResponse::new("Successfully unfollowed venue")))
}

pub async fn followed_venues(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<FollowedVenue>>> {
    let venues = state.repo().followed_venues(user.user_id).await?;
    Ok(Json(venues))
}

pub async fn check_venue(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedPath(venue_id): ValidatedPath<i32>,
) -> Result<Json<FollowCheck>> {
    let is_following = state.repo().is_following_venue(user.user_id, venue_id).await?;
    Ok(Json(FollowCheck { is_following }))
}

/// Newest papers from followed authors and venues
pub async fn feed(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<Json<Paginated<FeedItem>>> {
    let feed = state.repo().feed(user.user_id, query.page_request()?).await?;
    Ok(Json(feed))
}
