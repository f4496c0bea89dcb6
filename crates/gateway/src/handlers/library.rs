//! Personal library handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::handlers::MessageResponse;
use crate::middleware::{AuthUser, ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::AppState;
use scholardemon_common::{
    db::{
        models::LibraryEntry,
        repository::{LibraryEntryChange, LibrarySort, LibraryUpsert},
        views::{LibraryItem, LibraryStats},
        PageRequest, Paginated,
    },
    errors::Result,
};

#[derive(Debug, Deserialize, Validate)]
pub struct LibraryQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub sort: LibrarySort,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SavePaperRequest {
    pub paper_id: i32,
    #[validate(length(max = 5000))]
    pub user_notes: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEntryRequest {
    #[validate(length(max = 5000))]
    pub user_notes: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct LibraryCheck {
    pub in_library: bool,
    pub entry: Option<LibraryEntry>,
}

fn trimmed(notes: Option<String>) -> Option<String> {
    notes.map(|n| n.trim().to_string())
}

pub async fn list_library(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedQuery(query): ValidatedQuery<LibraryQuery>,
) -> Result<Json<Paginated<LibraryItem>>> {
    let page = PageRequest::new(query.page, query.limit)?;
    let library = state.repo().library(user.user_id, query.sort, page).await?;
    Ok(Json(library))
}

/// Save a paper; saving it again overwrites notes and rating
pub async fn save_paper(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(body): ValidatedJson<SavePaperRequest>,
) -> Result<(StatusCode, Json<LibraryEntry>)> {
    let (entry, created) = state
        .repo()
        .upsert_library_entry(
            user.user_id,
            LibraryUpsert {
                paper_id: body.paper_id,
                user_notes: trimmed(body.user_notes),
                rating: body.rating,
            },
        )
        .await?;

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedPath(paper_id): ValidatedPath<i32>,
    ValidatedJson(body): ValidatedJson<UpdateEntryRequest>,
) -> Result<Json<LibraryEntry>> {
    let entry = state
        .repo()
        .update_library_entry(
            user.user_id,
            paper_id,
            LibraryEntryChange {
                user_notes: trimmed(body.user_notes),
                rating: body.rating,
            },
        )
        .await?;
    Ok(Json(entry))
}

pub async fn remove_entry(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedPath(paper_id): ValidatedPath<i32>,
) -> Result<Json<MessageResponse>> {
    state.repo().remove_library_entry(user.user_id, paper_id).await?;
    Ok(Json(MessageResponse::new("Paper removed from library")))
}

pub async fn check(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedPath(paper_id): ValidatedPath<i32>,
) -> Result<Json<LibraryCheck>> {
    let entry = state.repo().library_entry(user.user_id, paper_id).await?;
    Ok(Json(LibraryCheck {
        in_library: entry.is_some(),
        entry,
    }))
}

pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<LibraryStats>> {
    let stats = state.repo().library_stats(user.user_id).await?;
    Ok(Json(stats))
}
