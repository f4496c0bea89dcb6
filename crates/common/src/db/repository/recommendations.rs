//! Related-paper recommendations
//!
//! Candidates share at least one keyword with the source or sit one citation
//! hop away from it in either direction. Ranking: citation link first, then
//! shared keyword count, then the candidate's own citation count, then id.

use sea_orm::{DbBackend, FromQueryResult, Statement};

use super::Repository;
use crate::db::query::PAPER_AUTHOR_NAMES_JSON;
use crate::db::views::Recommendation;
use crate::errors::{AppError, Result};

pub const DEFAULT_RECOMMENDATIONS: u64 = 10;
pub const MAX_RECOMMENDATIONS: u64 = 50;

fn recommendation_sql() -> String {
    format!(
        r#"
        WITH source_keywords AS (
            SELECT keyword_id FROM paper_keywords WHERE paper_id = $1
        ),
        shared AS (
            SELECT pk.paper_id, COUNT(*) AS common_keywords
            FROM paper_keywords pk
            JOIN source_keywords sk ON sk.keyword_id = pk.keyword_id
            WHERE pk.paper_id <> $1
            GROUP BY pk.paper_id
        ),
        linked AS (
            SELECT cited_paper_id AS paper_id FROM citations WHERE citing_paper_id = $1
            UNION
            SELECT citing_paper_id AS paper_id FROM citations WHERE cited_paper_id = $1
        ),
        candidates AS (
            SELECT paper_id FROM shared
            UNION
            SELECT paper_id FROM linked
        )
        SELECT p.paper_id, p.title, p.year, p.citation_count,
               v.name AS venue_name,
               {PAPER_AUTHOR_NAMES_JSON} AS authors,
               COALESCE(s.common_keywords, 0) AS common_keywords,
               (l.paper_id IS NOT NULL) AS citation_link
        FROM candidates cand
        JOIN papers p ON p.paper_id = cand.paper_id
        LEFT JOIN venues v ON v.venue_id = p.venue_id
        LEFT JOIN shared s ON s.paper_id = p.paper_id
        LEFT JOIN linked l ON l.paper_id = p.paper_id
        WHERE p.paper_id <> $1
        ORDER BY citation_link DESC, common_keywords DESC, p.citation_count DESC, p.paper_id ASC
        LIMIT $2
        "#
    )
}

impl Repository {
    /// Papers related to `paper_id`, never including it
    pub async fn recommendations(&self, paper_id: i32, limit: u64) -> Result<Vec<Recommendation>> {
        if !(1..=MAX_RECOMMENDATIONS).contains(&limit) {
            return Err(AppError::validation(
                "limit",
                format!("Limit must be 1-{}", MAX_RECOMMENDATIONS),
            ));
        }
        if !self.paper_exists(paper_id).await? {
            return Err(AppError::PaperNotFound { id: paper_id.to_string() });
        }

        let rows = Recommendation::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            recommendation_sql(),
            [paper_id.into(), (limit as i64).into()],
        ))
        .all(self.read_conn())
        .await?;

        tracing::debug!(paper_id, count = rows.len(), "Recommendations computed");
        Ok(rows)
    }
}
