//! Citation graph handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::middleware::{ValidatedPath, ValidatedQuery};
use crate::AppState;
use scholardemon_common::{
    db::repository::{CitationDirection, CitationList},
    errors::Result,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CitationsQuery {
    /// `cited` (outbound, default) or `citing` (inbound)
    #[serde(rename = "type", default)]
    pub direction: CitationDirection,
}

/// One hop of the citation graph in the requested direction
pub async fn get_citations(
    State(state): State<AppState>,
    ValidatedPath(paper_id): ValidatedPath<i32>,
    ValidatedQuery(query): ValidatedQuery<CitationsQuery>,
) -> Result<Json<CitationList>> {
    let citations = state.repo().citations(paper_id, query.direction).await?;
    Ok(Json(citations))
}
