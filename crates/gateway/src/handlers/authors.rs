//! Author profile handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use std::time::Instant;
use validator::Validate;

use crate::handlers::PageQuery;
use crate::middleware::{ValidatedPath, ValidatedQuery};
use crate::AppState;
use scholardemon_common::{
    db::{
        query::{AuthorFilter, AuthorSort},
        views::{AuthorDetail, AuthorPaper, AuthorSummary, CoAuthor},
        PageRequest, Paginated,
    },
    errors::Result,
    metrics,
};

#[derive(Debug, Deserialize, Validate)]
pub struct ListAuthorsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub sort: AuthorSort,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchAuthorsQuery {
    #[validate(length(max = 255))]
    pub q: Option<String>,
    #[validate(length(max = 255))]
    pub institution: Option<String>,
    #[validate(length(max = 255))]
    pub area: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub sort: AuthorSort,
}

pub async fn list_authors(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListAuthorsQuery>,
) -> Result<Json<Paginated<AuthorSummary>>> {
    let page = PageRequest::new(query.page, query.limit)?;
    let authors = state
        .repo()
        .search_authors(&AuthorFilter::default(), query.sort, page)
        .await?;
    Ok(Json(authors))
}

pub async fn search_authors(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SearchAuthorsQuery>,
) -> Result<Json<Paginated<AuthorSummary>>> {
    let page = PageRequest::new(query.page, query.limit)?;
    let filter = AuthorFilter {
        q: query.q,
        institution: query.institution,
        area: query.area,
    };

    let start = Instant::now();
    let authors = state.repo().search_authors(&filter, query.sort, page).await?;
    metrics::record_search(start.elapsed().as_secs_f64(), "authors", authors.pagination.total);

    Ok(Json(authors))
}

pub async fn get_author(
    State(state): State<AppState>,
    ValidatedPath(author_id): ValidatedPath<i32>,
) -> Result<Json<AuthorDetail>> {
    let author = state.repo().get_author(author_id).await?;
    Ok(Json(author))
}

pub async fn author_papers(
    State(state): State<AppState>,
    ValidatedPath(author_id): ValidatedPath<i32>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<Json<Paginated<AuthorPaper>>> {
    let papers = state
        .repo()
        .author_papers(author_id, query.page_request()?)
        .await?;
    Ok(Json(papers))
}

pub async fn co_authors(
    State(state): State<AppState>,
    ValidatedPath(author_id): ValidatedPath<i32>,
) -> Result<Json<Vec<CoAuthor>>> {
    let co_authors = state.repo().co_authors(author_id).await?;
    Ok(Json(co_authors))
}
