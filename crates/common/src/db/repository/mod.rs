//! Repository for database operations
//!
//! One `Repository` type, with its operations split by area. Plain CRUD goes
//! through the SeaORM entities; aggregate read views are raw statements
//! decoded into the row types in [`crate::db::views`].

mod authors;
mod citations;
mod comments;
mod follows;
mod library;
mod papers;
mod recommendations;
mod users;

pub use citations::{CitationDirection, CitationList};
pub use comments::NewComment;
pub use follows::FollowOutcome;
pub use library::{LibraryEntryChange, LibrarySort, LibraryUpsert};
pub use recommendations::{DEFAULT_RECOMMENDATIONS, MAX_RECOMMENDATIONS};
pub use users::NewUser;

use crate::db::models::*;
use crate::db::pagination::{PageRequest, Paginated};
use crate::db::views::CountRow;
use crate::db::DbPool;
use crate::errors::Result;
use sea_orm::{
    DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, Statement,
};

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    /// Run a count statement, then the page statement
    async fn fetch_page<T>(
        &self,
        count: Statement,
        data: Statement,
        page: PageRequest,
    ) -> Result<Paginated<T>>
    where
        T: FromQueryResult,
    {
        let total = CountRow::find_by_statement(count)
            .one(self.read_conn())
            .await?
            .map(|row| row.total.max(0) as u64)
            .unwrap_or(0);

        let rows = T::find_by_statement(data).all(self.read_conn()).await?;

        Ok(Paginated::new(rows, page, total))
    }

    pub async fn paper_exists(&self, paper_id: i32) -> Result<bool> {
        let count = PaperEntity::find_by_id(paper_id)
            .count(self.read_conn())
            .await?;
        Ok(count > 0)
    }

    pub async fn author_exists(&self, author_id: i32) -> Result<bool> {
        let count = AuthorEntity::find_by_id(author_id)
            .count(self.read_conn())
            .await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Row builders for `MockDatabase` results

    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    pub fn repo(db: MockDatabase) -> Repository {
        Repository::new(DbPool::from_connection(db.into_connection()))
    }

    pub fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    pub fn now() -> Value {
        chrono::Utc::now().fixed_offset().into()
    }

    pub fn count_row(total: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("total", Value::BigInt(Some(total)))])
    }

    pub fn paper_row(paper_id: i32, title: &str) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            ("paper_id", paper_id.into()),
            ("title", title.to_string().into()),
            ("abstract_text", Option::<String>::None.into()),
            ("year", Some(2020).into()),
            ("doi", Option::<String>::None.into()),
            ("pdf_url", Option::<String>::None.into()),
            ("citation_count", 5.into()),
            ("created_at", now()),
            ("venue_name", Some("VLDB".to_string()).into()),
            ("venue_type", Some("conference".to_string()).into()),
            ("authors", serde_json::json!([{"author_id": 1, "name": "Ada", "order": 1}]).into()),
            ("keywords", serde_json::json!(["databases"]).into()),
        ])
    }
}
