//! Personal paper library

use sea_orm::{
    ActiveModelTrait, DbBackend, EntityTrait, FromQueryResult, Set, Statement,
};
use serde::Deserialize;

use super::Repository;
use crate::db::models::*;
use crate::db::pagination::{PageRequest, Paginated};
use crate::db::query::PAPER_AUTHOR_NAMES_JSON;
use crate::db::views::{LibraryItem, LibraryStats, LibraryUpsertRow};
use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibrarySort {
    /// Most recently saved first
    #[default]
    Recent,
    Rating,
    Title,
    Year,
}

impl LibrarySort {
    fn order_by(&self) -> &'static str {
        match self {
            LibrarySort::Recent => "ul.added_at DESC, p.paper_id ASC",
            LibrarySort::Rating => "ul.rating DESC NULLS LAST, p.paper_id ASC",
            LibrarySort::Title => "p.title ASC, p.paper_id ASC",
            LibrarySort::Year => "p.year DESC NULLS LAST, p.paper_id ASC",
        }
    }
}

/// Save or re-save a paper
#[derive(Debug, Clone)]
pub struct LibraryUpsert {
    pub paper_id: i32,
    pub user_notes: Option<String>,
    pub rating: Option<i32>,
}

/// Partial update of a saved paper; absent fields are left alone
#[derive(Debug, Clone, Default)]
pub struct LibraryEntryChange {
    pub user_notes: Option<String>,
    pub rating: Option<i32>,
}

fn check_rating(rating: Option<i32>) -> Result<()> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => {
            Err(AppError::validation("rating", "Rating must be between 1 and 5"))
        }
        _ => Ok(()),
    }
}

fn not_in_library(paper_id: i32) -> AppError {
    AppError::NotFound {
        resource_type: "library entry".to_string(),
        id: paper_id.to_string(),
    }
}

impl Repository {
    pub async fn library(
        &self,
        user_id: i32,
        sort: LibrarySort,
        page: PageRequest,
    ) -> Result<Paginated<LibraryItem>> {
        let count = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT COUNT(*) AS total FROM user_library WHERE user_id = $1",
            [user_id.into()],
        );

        let data = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                r#"
                SELECT p.paper_id, p.title, p.abstract AS abstract_text, p.year,
                       p.citation_count, v.name AS venue_name,
                       {PAPER_AUTHOR_NAMES_JSON} AS authors,
                       ul.added_at, ul.user_notes, ul.rating
                FROM user_library ul
                JOIN papers p ON p.paper_id = ul.paper_id
                LEFT JOIN venues v ON v.venue_id = p.venue_id
                WHERE ul.user_id = $1
                ORDER BY {order}
                LIMIT $2 OFFSET $3
                "#,
                order = sort.order_by(),
            ),
            [
                user_id.into(),
                (page.limit() as i64).into(),
                (page.offset() as i64).into(),
            ],
        );

        self.fetch_page(count, data, page).await
    }

    /// Insert or update the (user, paper) entry. Returns the row and whether
    /// it was newly created.
    pub async fn upsert_library_entry(
        &self,
        user_id: i32,
        input: LibraryUpsert,
    ) -> Result<(LibraryEntry, bool)> {
        check_rating(input.rating)?;

        let row = LibraryUpsertRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO user_library (user_id, paper_id, user_notes, rating)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, paper_id)
            DO UPDATE SET user_notes = EXCLUDED.user_notes, rating = EXCLUDED.rating
            RETURNING user_id, paper_id, user_notes, rating, added_at, (xmax = 0) AS inserted
            "#,
            [
                user_id.into(),
                input.paper_id.into(),
                input.user_notes.into(),
                input.rating.into(),
            ],
        ))
        .one(self.write_conn())
        .await
        .map_err(|e| match AppError::from(e) {
            err if err.is_foreign_key_violation() => {
                AppError::PaperNotFound { id: input.paper_id.to_string() }
            }
            err => err,
        })?
        .ok_or_else(|| AppError::Internal {
            message: "Library upsert returned no row".to_string(),
        })?;

        let (entry, created) = row.into_parts();
        tracing::info!(user_id, paper_id = entry.paper_id, created, "Library entry saved");
        Ok((entry, created))
    }

    pub async fn update_library_entry(
        &self,
        user_id: i32,
        paper_id: i32,
        change: LibraryEntryChange,
    ) -> Result<LibraryEntry> {
        if change.user_notes.is_none() && change.rating.is_none() {
            return Err(AppError::Validation {
                message: "No updates provided".to_string(),
                field: None,
            });
        }
        check_rating(change.rating)?;

        let existing = self
            .library_entry(user_id, paper_id)
            .await?
            .ok_or_else(|| not_in_library(paper_id))?;

        let mut entry: LibraryEntryActiveModel = existing.into();
        if let Some(notes) = change.user_notes {
            entry.user_notes = Set(Some(notes));
        }
        if let Some(rating) = change.rating {
            entry.rating = Set(Some(rating));
        }

        entry.update(self.write_conn()).await.map_err(Into::into)
    }

    pub async fn remove_library_entry(&self, user_id: i32, paper_id: i32) -> Result<()> {
        let result = LibraryEntryEntity::delete_by_id((user_id, paper_id))
            .exec(self.write_conn())
            .await?;

        if result.rows_affected == 0 {
            return Err(not_in_library(paper_id));
        }
        Ok(())
    }

    pub async fn library_entry(&self, user_id: i32, paper_id: i32) -> Result<Option<LibraryEntry>> {
        LibraryEntryEntity::find_by_id((user_id, paper_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn library_stats(&self, user_id: i32) -> Result<LibraryStats> {
        LibraryStats::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT COUNT(*) AS total_papers,
                   COUNT(ul.rating) AS rated_papers,
                   AVG(ul.rating)::float8 AS average_rating,
                   COALESCE((
                       SELECT json_agg(DISTINCT ra.area_name)
                       FROM user_library mine
                       JOIN paper_research_areas pra ON pra.paper_id = mine.paper_id
                       JOIN research_areas ra ON ra.area_id = pra.area_id
                       WHERE mine.user_id = $1
                   ), '[]'::json) AS research_areas
            FROM user_library ul
            WHERE ul.user_id = $1
            "#,
            [user_id.into()],
        ))
        .one(self.read_conn())
        .await?
        .ok_or_else(|| AppError::Internal {
            message: "Library stats returned no row".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use sea_orm::Value;
    use std::collections::BTreeMap;

    fn upsert_row(inserted: bool, rating: Option<i32>) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            ("user_id", 1.into()),
            ("paper_id", 3.into()),
            ("user_notes", Some("read again".to_string()).into()),
            ("rating", rating.into()),
            ("added_at", now()),
            ("inserted", inserted.into()),
        ])
    }

    #[tokio::test]
    async fn test_second_save_updates() {
        let db = mock()
            .append_query_results([vec![upsert_row(true, Some(3))]])
            .append_query_results([vec![upsert_row(false, Some(5))]]);
        let repo = repo(db);

        let input = |rating| LibraryUpsert {
            paper_id: 3,
            user_notes: Some("read again".into()),
            rating: Some(rating),
        };

        let (first, created) = repo.upsert_library_entry(1, input(3)).await.unwrap();
        assert!(created);
        assert_eq!(first.rating, Some(3));

        let (second, created) = repo.upsert_library_entry(1, input(5)).await.unwrap();
        assert!(!created);
        assert_eq!(second.rating, Some(5));
        assert_eq!((second.user_id, second.paper_id), (first.user_id, first.paper_id));
    }

    #[tokio::test]
    async fn test_rating_out_of_range() {
        let repo = repo(mock());
        let err = repo
            .upsert_library_entry(1, LibraryUpsert { paper_id: 3, user_notes: None, rating: Some(6) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = repo
            .update_library_entry(1, 3, LibraryEntryChange { user_notes: None, rating: Some(0) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_empty_change_rejected() {
        let err = repo(mock())
            .update_library_entry(1, 3, LibraryEntryChange::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_sort_order() {
        assert!(LibrarySort::default().order_by().starts_with("ul.added_at DESC"));
        assert!(LibrarySort::Rating.order_by().contains("NULLS LAST"));
    }
}
