//! One-hop citation graph queries

use sea_orm::{DbBackend, FromQueryResult, Statement};
use serde::{Deserialize, Serialize};

use super::Repository;
use crate::db::query::PAPER_AUTHOR_NAMES_JSON;
use crate::db::views::CitationEntry;
use crate::errors::{AppError, Result};

/// Which end of the citation edge the given paper sits on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationDirection {
    /// Papers the given paper cites
    #[default]
    Cited,
    /// Papers that cite the given paper
    Citing,
}

impl CitationDirection {
    /// (column joined to the neighbour, column matched against the paper)
    fn columns(&self) -> (&'static str, &'static str) {
        match self {
            CitationDirection::Cited => ("cited_paper_id", "citing_paper_id"),
            CitationDirection::Citing => ("citing_paper_id", "cited_paper_id"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CitationList {
    #[serde(rename = "type")]
    pub direction: CitationDirection,
    pub count: usize,
    pub citations: Vec<CitationEntry>,
}

impl Repository {
    pub async fn citations(
        &self,
        paper_id: i32,
        direction: CitationDirection,
    ) -> Result<CitationList> {
        if !self.paper_exists(paper_id).await? {
            return Err(AppError::PaperNotFound { id: paper_id.to_string() });
        }

        let (neighbour, anchor) = direction.columns();
        let sql = format!(
            r#"
            SELECT p.paper_id, p.title, p.year, p.citation_count,
                   c.citation_context,
                   {PAPER_AUTHOR_NAMES_JSON} AS authors
            FROM citations c
            JOIN papers p ON p.paper_id = c.{neighbour}
            WHERE c.{anchor} = $1
            ORDER BY p.year DESC NULLS LAST, p.paper_id ASC
            "#
        );

        let citations = CitationEntry::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [paper_id.into()],
        ))
        .all(self.read_conn())
        .await?;

        Ok(CitationList {
            direction,
            count: citations.len(),
            citations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use sea_orm::Value;
    use std::collections::BTreeMap;

    fn exists(found: bool) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(found as i64)))])
    }

    #[test]
    fn test_direction_columns_never_mix() {
        let (join, filter) = CitationDirection::Cited.columns();
        assert_eq!((join, filter), ("cited_paper_id", "citing_paper_id"));

        let (join, filter) = CitationDirection::Citing.columns();
        assert_eq!((join, filter), ("citing_paper_id", "cited_paper_id"));
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!(CitationDirection::default(), CitationDirection::Cited);
        let parsed: CitationDirection = serde_json::from_str("\"citing\"").unwrap();
        assert_eq!(parsed, CitationDirection::Citing);
        assert!(serde_json::from_str::<CitationDirection>("\"both\"").is_err());
    }

    #[tokio::test]
    async fn test_unknown_paper() {
        let repo = repo(mock().append_query_results([vec![exists(false)]]));
        let err = repo.citations(9, CitationDirection::Citing).await.unwrap_err();
        assert!(matches!(err, AppError::PaperNotFound { .. }));
    }

    #[tokio::test]
    async fn test_citation_list_shape() {
        let row = BTreeMap::from([
            ("paper_id", Value::from(2)),
            ("title", "Cited Work".to_string().into()),
            ("year", Some(2018).into()),
            ("citation_count", 40.into()),
            ("citation_context", Some("builds on".to_string()).into()),
            ("authors", serde_json::json!(["Grace", "Alan"]).into()),
        ]);
        let db = mock()
            .append_query_results([vec![exists(true)]])
            .append_query_results([vec![row]]);

        let list = repo(db).citations(1, CitationDirection::Cited).await.unwrap();
        assert_eq!(list.count, 1);

        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["type"], "cited");
        assert_eq!(json["citations"][0]["authors"][1], "Alan");
    }
}
