//! Author and venue follows, and the feed they drive

use sea_orm::{ConnectionTrait, DbBackend, EntityTrait, FromQueryResult, Statement};

use super::Repository;
use crate::db::models::*;
use crate::db::pagination::{PageRequest, Paginated};
use crate::db::query::{Conditions, PAPER_AUTHOR_NAMES_JSON};
use crate::db::views::{FeedItem, FollowedAuthor, FollowedVenue};
use crate::errors::{AppError, Result};

/// What a follow request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
}

/// Something a user can follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FollowTarget {
    Author,
    Venue,
}

impl FollowTarget {
    fn table(&self) -> &'static str {
        match self {
            FollowTarget::Author => "user_follows_authors",
            FollowTarget::Venue => "user_follows_venues",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            FollowTarget::Author => "author_id",
            FollowTarget::Venue => "venue_id",
        }
    }

    fn not_found(&self, id: i32) -> AppError {
        match self {
            FollowTarget::Author => AppError::AuthorNotFound { id: id.to_string() },
            FollowTarget::Venue => AppError::VenueNotFound { id: id.to_string() },
        }
    }

    fn not_following(&self, id: i32) -> AppError {
        let resource_type = match self {
            FollowTarget::Author => "author follow",
            FollowTarget::Venue => "venue follow",
        };
        AppError::NotFound { resource_type: resource_type.to_string(), id: id.to_string() }
    }
}

fn feed_conditions(user_id: i32) -> Conditions {
    let mut conditions = Conditions::new();
    let user = conditions.bind(user_id);
    conditions.push(format!(
        "(EXISTS (SELECT 1 FROM paper_authors fpa \
          JOIN user_follows_authors ufa ON ufa.author_id = fpa.author_id \
          WHERE fpa.paper_id = p.paper_id AND ufa.user_id = {user}) \
         OR EXISTS (SELECT 1 FROM user_follows_venues ufv \
          WHERE ufv.venue_id = p.venue_id AND ufv.user_id = {user}))"
    ));
    conditions
}

impl Repository {
    async fn follow(&self, user_id: i32, target: FollowTarget, id: i32) -> Result<FollowOutcome> {
        let sql = format!(
            "INSERT INTO {table} (user_id, {column}) VALUES ($1, $2) \
             ON CONFLICT (user_id, {column}) DO NOTHING \
             RETURNING user_id",
            table = target.table(),
            column = target.column(),
        );

        // A returned row means the insert happened; a conflict returns nothing.
        let inserted = self
            .write_conn()
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                [user_id.into(), id.into()],
            ))
            .await
        .map_err(|e| match AppError::from(e) {
            err if err.is_foreign_key_violation() => target.not_found(id),
            err => err,
        })?;

        let outcome = match inserted {
            Some(_) => FollowOutcome::Followed,
            None => FollowOutcome::AlreadyFollowing,
        };
        tracing::info!(user_id, target = ?target, id, outcome = ?outcome, "Follow requested");
        Ok(outcome)
    }

    async fn unfollow(&self, user_id: i32, target: FollowTarget, id: i32) -> Result<()> {
        let rows_affected = match target {
            FollowTarget::Author => {
                AuthorFollowEntity::delete_by_id((user_id, id))
                    .exec(self.write_conn())
                    .await?
                    .rows_affected
            }
            FollowTarget::Venue => {
                VenueFollowEntity::delete_by_id((user_id, id))
                    .exec(self.write_conn())
                    .await?
                    .rows_affected
            }
        };

        if rows_affected == 0 {
            return Err(target.not_following(id));
        }
        Ok(())
    }

    pub async fn follow_author(&self, user_id: i32, author_id: i32) -> Result<FollowOutcome> {
        self.follow(user_id, FollowTarget::Author, author_id).await
    }

    pub async fn unfollow_author(&self, user_id: i32, author_id: i32) -> Result<()> {
        self.unfollow(user_id, FollowTarget::Author, author_id).await
    }

    pub async fn follow_venue(&self, user_id: i32, venue_id: i32) -> Result<FollowOutcome> {
        self.follow(user_id, FollowTarget::Venue, venue_id).await
    }

    pub async fn unfollow_venue(&self, user_id: i32, venue_id: i32) -> Result<()> {
        self.unfollow(user_id, FollowTarget::Venue, venue_id).await
    }

    pub async fn is_following_author(&self, user_id: i32, author_id: i32) -> Result<bool> {
        let follow = AuthorFollowEntity::find_by_id((user_id, author_id))
            .one(self.read_conn())
            .await?;
        Ok(follow.is_some())
    }

    pub async fn is_following_venue(&self, user_id: i32, venue_id: i32) -> Result<bool> {
        let follow = VenueFollowEntity::find_by_id((user_id, venue_id))
            .one(self.read_conn())
            .await?;
        Ok(follow.is_some())
    }

    /// Followed authors, most recently followed first
    pub async fn followed_authors(&self, user_id: i32) -> Result<Vec<FollowedAuthor>> {
        FollowedAuthor::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT a.author_id, a.name, a.affiliation, a.h_index, a.citation_count,
                   ufa.followed_at,
                   (SELECT COUNT(*) FROM paper_authors pa WHERE pa.author_id = a.author_id) AS paper_count
            FROM user_follows_authors ufa
            JOIN authors a ON a.author_id = ufa.author_id
            WHERE ufa.user_id = $1
            ORDER BY ufa.followed_at DESC, a.author_id ASC
            "#,
            [user_id.into()],
        ))
        .all(self.read_conn())
        .await
        .map_err(Into::into)
    }

    /// Followed venues, most recently followed first
    pub async fn followed_venues(&self, user_id: i32) -> Result<Vec<FollowedVenue>> {
        FollowedVenue::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT v.venue_id, v.name, v.short_name, v.type AS venue_type, v.impact_factor,
                   ufv.followed_at,
                   (SELECT COUNT(*) FROM papers p WHERE p.venue_id = v.venue_id) AS paper_count
            FROM user_follows_venues ufv
            JOIN venues v ON v.venue_id = ufv.venue_id
            WHERE ufv.user_id = $1
            ORDER BY ufv.followed_at DESC, v.venue_id ASC
            "#,
            [user_id.into()],
        ))
        .all(self.read_conn())
        .await
        .map_err(Into::into)
    }

    /// Papers by followed authors or in followed venues, newest first.
    /// A paper matching both appears once, tagged "author".
    pub async fn feed(&self, user_id: i32, page: PageRequest) -> Result<Paginated<FeedItem>> {
        let mut conditions = feed_conditions(user_id);
        let where_sql = conditions.where_sql();

        let count = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!("SELECT COUNT(*) AS total FROM papers p {where_sql}"),
            conditions.values().to_vec(),
        );

        let limit = conditions.bind(page.limit() as i64);
        let offset = conditions.bind(page.offset() as i64);

        let data = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                r#"
                SELECT p.paper_id, p.title, p.abstract AS abstract_text, p.year,
                       p.citation_count, p.created_at,
                       v.name AS venue_name,
                       {PAPER_AUTHOR_NAMES_JSON} AS authors,
                       CASE WHEN EXISTS (
                           SELECT 1 FROM paper_authors tpa
                           JOIN user_follows_authors tfa ON tfa.author_id = tpa.author_id
                           WHERE tpa.paper_id = p.paper_id AND tfa.user_id = $1
                       ) THEN 'author' ELSE 'venue' END AS follow_type
                FROM papers p
                LEFT JOIN venues v ON v.venue_id = p.venue_id
                {where_sql}
                ORDER BY p.created_at DESC, p.paper_id DESC
                LIMIT {limit} OFFSET {offset}
                "#
            ),
            conditions.values().to_vec(),
        );

        self.fetch_page(count, data, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use sea_orm::Value;
    use std::collections::BTreeMap;

    fn returned() -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("user_id", Value::from(1))])
    }

    #[tokio::test]
    async fn test_follow_twice_reports_already_following() {
        let db = mock()
            .append_query_results([vec![returned()]])
            .append_query_results([Vec::<BTreeMap<&'static str, Value>>::new()]);
        let repo = repo(db);

        assert_eq!(repo.follow_author(1, 5).await.unwrap(), FollowOutcome::Followed);
        assert_eq!(repo.follow_author(1, 5).await.unwrap(), FollowOutcome::AlreadyFollowing);
    }

    #[test]
    fn test_follow_targets() {
        assert_eq!(FollowTarget::Venue.table(), "user_follows_venues");
        assert_eq!(FollowTarget::Author.column(), "author_id");
        assert!(matches!(FollowTarget::Venue.not_found(2), AppError::VenueNotFound { .. }));
    }

    #[test]
    fn test_feed_binds_user_once() {
        let conditions = feed_conditions(42);
        assert_eq!(conditions.values(), &[Value::from(42)]);
        let sql = conditions.where_sql();
        assert_eq!(sql.matches("$1").count(), 2);
        assert!(!sql.contains("$2"));
    }
}
