//! Paper listing, search and detail

use sea_orm::{ActiveModelTrait, DbBackend, FromQueryResult, Set, Statement};

use super::Repository;
use crate::db::models::*;
use crate::db::pagination::{PageRequest, Paginated};
use crate::db::query::{
    paper_search_statements, PaperFilter, PaperSort, PAPER_AREAS_JSON, PAPER_KEYWORDS_JSON,
};
use crate::db::views::{PaperDetail, PaperSummary};
use crate::errors::{AppError, Result};

impl Repository {
    /// Filtered, sorted page of papers. The plain listing is this call
    /// with an empty filter.
    pub async fn search_papers(
        &self,
        filter: &PaperFilter,
        sort: PaperSort,
        page: PageRequest,
    ) -> Result<Paginated<PaperSummary>> {
        let (count, data) = paper_search_statements(filter, sort, page);
        self.fetch_page(count, data, page).await
    }

    /// Paper with venue, full byline, keywords and research areas
    pub async fn get_paper(&self, paper_id: i32) -> Result<PaperDetail> {
        let sql = format!(
            r#"
            SELECT p.paper_id, p.title, p.abstract AS abstract_text, p.year, p.doi,
                   p.pdf_url, p.pages, p.venue_id, p.citation_count, p.created_at,
                   v.name AS venue_name, v.short_name AS venue_short_name,
                   v.type AS venue_type, v.publisher,
                   COALESCE((
                       SELECT json_agg(json_build_object(
                                  'author_id', a.author_id,
                                  'name', a.name,
                                  'affiliation', a.affiliation,
                                  'orcid_id', a.orcid_id,
                                  'order', pa.author_order
                              ) ORDER BY pa.author_order)
                       FROM paper_authors pa
                       JOIN authors a ON a.author_id = pa.author_id
                       WHERE pa.paper_id = p.paper_id
                   ), '[]'::json) AS authors,
                   {PAPER_KEYWORDS_JSON} AS keywords,
                   {PAPER_AREAS_JSON} AS research_areas
            FROM papers p
            LEFT JOIN venues v ON v.venue_id = p.venue_id
            WHERE p.paper_id = $1
            "#
        );

        PaperDetail::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [paper_id.into()],
        ))
        .one(self.read_conn())
        .await?
        .ok_or_else(|| AppError::PaperNotFound { id: paper_id.to_string() })
    }

    /// Append a row to the user's search history
    pub async fn record_search(&self, user_id: i32, query: &str) -> Result<()> {
        let entry = SearchHistoryActiveModel {
            user_id: Set(user_id),
            search_query: Set(query.to_string()),
            searched_at: Set(chrono::Utc::now().fixed_offset()),
            ..Default::default()
        };

        entry.insert(self.write_conn()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_search_page_uses_count_then_rows() {
        let db = mock().append_query_results([vec![count_row(41)]]).append_query_results([vec![
            paper_row(7, "Graph Databases"),
            paper_row(3, "Query Optimizers"),
        ]]);
        let repo = repo(db);

        let page = PageRequest::new(Some(2), Some(20)).unwrap();
        let filter = PaperFilter { q: Some("graph".into()), ..Default::default() };
        let result = repo.search_papers(&filter, PaperSort::default(), page).await.unwrap();

        assert_eq!(result.data.len(), 2);
        assert_eq!(result.data[0].paper_id, 7);
        assert_eq!(result.data[0].authors.0[0].name, "Ada");
        assert_eq!(result.data[1].keywords.0, vec!["databases".to_string()]);
        assert_eq!(result.pagination.total, 41);
        assert_eq!(result.pagination.pages, 3);
        assert_eq!(result.pagination.page, 2);
    }

    #[tokio::test]
    async fn test_missing_paper_is_not_found() {
        let db = mock().append_query_results([Vec::<PaperDetailRow>::new()]);
        let repo = repo(db);

        let err = repo.get_paper(404).await.unwrap_err();
        assert!(matches!(err, AppError::PaperNotFound { .. }));
    }

    type PaperDetailRow = std::collections::BTreeMap<&'static str, sea_orm::Value>;
}
