//! Author profiles, publication lists and collaborators

use sea_orm::{DbBackend, FromQueryResult, Statement};

use super::Repository;
use crate::db::pagination::{PageRequest, Paginated};
use crate::db::query::{
    author_search_statements, AuthorFilter, AuthorSort, AUTHOR_AREAS_JSON, AUTHOR_PAPER_COUNT,
};
use crate::db::views::{AuthorDetail, AuthorPaper, AuthorSummary, CoAuthor};
use crate::errors::{AppError, Result};

/// Collaborators returned for one author
const CO_AUTHOR_LIMIT: i64 = 20;

impl Repository {
    /// Filtered, sorted page of authors; the listing passes an empty filter
    pub async fn search_authors(
        &self,
        filter: &AuthorFilter,
        sort: AuthorSort,
        page: PageRequest,
    ) -> Result<Paginated<AuthorSummary>> {
        let (count, data) = author_search_statements(filter, sort, page);
        self.fetch_page(count, data, page).await
    }

    pub async fn get_author(&self, author_id: i32) -> Result<AuthorDetail> {
        let sql = format!(
            r#"
            SELECT a.author_id, a.name, a.affiliation, a.email, a.orcid_id,
                   a.research_interests, a.institution_id, a.h_index,
                   a.citation_count, a.created_at,
                   i.name AS institution_name, i.country AS institution_country,
                   i.website AS institution_website,
                   {AUTHOR_AREAS_JSON} AS research_areas,
                   {AUTHOR_PAPER_COUNT} AS paper_count
            FROM authors a
            LEFT JOIN institutions i ON i.institution_id = a.institution_id
            WHERE a.author_id = $1
            "#
        );

        AuthorDetail::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [author_id.into()],
        ))
        .one(self.read_conn())
        .await?
        .ok_or_else(|| AppError::AuthorNotFound { id: author_id.to_string() })
    }

    /// Page of the author's papers, newest first, each with its full byline
    pub async fn author_papers(
        &self,
        author_id: i32,
        page: PageRequest,
    ) -> Result<Paginated<AuthorPaper>> {
        if !self.author_exists(author_id).await? {
            return Err(AppError::AuthorNotFound { id: author_id.to_string() });
        }

        let count = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT COUNT(*) AS total FROM paper_authors WHERE author_id = $1",
            [author_id.into()],
        );

        let data = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT p.paper_id, p.title, p.year, p.citation_count, p.doi,
                   v.name AS venue_name, v.type AS venue_type,
                   own.author_order,
                   COALESCE((
                       SELECT json_agg(json_build_object(
                                  'author_id', a.author_id,
                                  'name', a.name,
                                  'order', pa.author_order
                              ) ORDER BY pa.author_order)
                       FROM paper_authors pa
                       JOIN authors a ON a.author_id = pa.author_id
                       WHERE pa.paper_id = p.paper_id
                   ), '[]'::json) AS co_authors
            FROM paper_authors own
            JOIN papers p ON p.paper_id = own.paper_id
            LEFT JOIN venues v ON v.venue_id = p.venue_id
            WHERE own.author_id = $1
            ORDER BY p.year DESC NULLS LAST, p.paper_id ASC
            LIMIT $2 OFFSET $3
            "#,
            [
                author_id.into(),
                (page.limit() as i64).into(),
                (page.offset() as i64).into(),
            ],
        );

        self.fetch_page(count, data, page).await
    }

    /// Authors who share at least one paper, most frequent first
    pub async fn co_authors(&self, author_id: i32) -> Result<Vec<CoAuthor>> {
        if !self.author_exists(author_id).await? {
            return Err(AppError::AuthorNotFound { id: author_id.to_string() });
        }

        CoAuthor::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT a.author_id, a.name, a.affiliation, a.h_index,
                   COUNT(DISTINCT mine.paper_id) AS collaboration_count
            FROM paper_authors mine
            JOIN paper_authors theirs ON theirs.paper_id = mine.paper_id
            JOIN authors a ON a.author_id = theirs.author_id
            WHERE mine.author_id = $1 AND theirs.author_id <> $1
            GROUP BY a.author_id, a.name, a.affiliation, a.h_index
            ORDER BY collaboration_count DESC, a.author_id ASC
            LIMIT $2
            "#,
            [author_id.into(), CO_AUTHOR_LIMIT.into()],
        ))
        .all(self.read_conn())
        .await
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use sea_orm::Value;
    use std::collections::BTreeMap;

    fn author_row(author_id: i32, name: &str, papers: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            ("author_id", author_id.into()),
            ("name", name.to_string().into()),
            ("affiliation", Option::<String>::None.into()),
            ("email", Option::<String>::None.into()),
            ("orcid_id", Option::<String>::None.into()),
            ("h_index", 12.into()),
            ("citation_count", 900.into()),
            ("institution_name", Some("MIT".to_string()).into()),
            ("institution_country", Some("USA".to_string()).into()),
            ("research_areas", serde_json::json!(["Machine Learning"]).into()),
            ("paper_count", Value::BigInt(Some(papers))),
        ])
    }

    #[tokio::test]
    async fn test_author_listing_page() {
        let db = mock()
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![author_row(4, "Yann", 3)]]);

        let page = repo(db)
            .search_authors(&AuthorFilter::default(), AuthorSort::Papers, PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.data[0].paper_count, 3);
        assert_eq!(page.data[0].research_areas.0, vec!["Machine Learning".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_author_papers() {
        let db = mock().append_query_results([vec![BTreeMap::from([(
            "num_items",
            Value::BigInt(Some(0)),
        )])]]);

        let err = repo(db).author_papers(77, PageRequest::default()).await.unwrap_err();
        assert!(matches!(err, AppError::AuthorNotFound { .. }));
    }
}
