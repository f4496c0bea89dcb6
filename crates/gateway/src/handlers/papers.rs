//! Paper listing, search, detail and recommendation handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use std::time::Instant;
use validator::Validate;

use crate::middleware::{OptionalUser, ValidatedPath, ValidatedQuery};
use crate::AppState;
use scholardemon_common::{
    db::{
        query::{PaperFilter, PaperSort},
        repository::DEFAULT_RECOMMENDATIONS,
        views::{PaperDetail, PaperSummary, Recommendation},
        PageRequest, Paginated,
    },
    errors::Result,
    metrics,
};

#[derive(Debug, Deserialize, Validate)]
pub struct ListPapersQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub sort: PaperSort,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchPapersQuery {
    #[validate(length(max = 500))]
    pub q: Option<String>,
    #[validate(length(max = 255))]
    pub author: Option<String>,
    #[validate(length(max = 255))]
    pub venue: Option<String>,
    pub year: Option<i32>,
    #[validate(length(max = 100))]
    pub keyword: Option<String>,
    #[validate(length(max = 255))]
    pub area: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub sort: PaperSort,
}

impl SearchPapersQuery {
    fn filter(&self) -> PaperFilter {
        PaperFilter {
            q: self.q.clone(),
            author: self.author.clone(),
            venue: self.venue.clone(),
            year: self.year,
            keyword: self.keyword.clone(),
            area: self.area.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecommendationsQuery {
    pub limit: Option<u64>,
}

/// Unfiltered listing; same query as a search with no filters
pub async fn list_papers(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListPapersQuery>,
) -> Result<Json<Paginated<PaperSummary>>> {
    let page = PageRequest::new(query.page, query.limit)?;
    let papers = state
        .repo()
        .search_papers(&PaperFilter::default(), query.sort, page)
        .await?;
    Ok(Json(papers))
}

/// Filtered search. Signed-in callers with a text query get it recorded in
/// their history; a failed write there never fails the search.
pub async fn search_papers(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    ValidatedQuery(query): ValidatedQuery<SearchPapersQuery>,
) -> Result<Json<Paginated<PaperSummary>>> {
    let page = PageRequest::new(query.page, query.limit)?;
    let filter = query.filter();
    let repo = state.repo();

    let start = Instant::now();
    let results = repo.search_papers(&filter, query.sort, page).await?;
    metrics::record_search(start.elapsed().as_secs_f64(), "papers", results.pagination.total);

    tracing::debug!(
        filters = filter.predicates().len(),
        total = results.pagination.total,
        "Paper search completed"
    );

    if let (Some(user), Some(text)) = (user, filter.text_query()) {
        if let Err(e) = repo.record_search(user.user_id, text).await {
            tracing::warn!(user_id = user.user_id, error = %e, "Failed to record search history");
            metrics::record_search_history_failure();
        }
    }

    Ok(Json(results))
}

pub async fn get_paper(
    State(state): State<AppState>,
    ValidatedPath(paper_id): ValidatedPath<i32>,
) -> Result<Json<PaperDetail>> {
    let paper = state.repo().get_paper(paper_id).await?;
    Ok(Json(paper))
}

pub async fn recommendations(
    State(state): State<AppState>,
    ValidatedPath(paper_id): ValidatedPath<i32>,
    ValidatedQuery(query): ValidatedQuery<RecommendationsQuery>,
) -> Result<Json<Vec<Recommendation>>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECOMMENDATIONS);
    let papers = state.repo().recommendations(paper_id, limit).await?;
    Ok(Json(papers))
}
