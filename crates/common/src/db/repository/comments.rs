//! Paper comments and reply threads

use sea_orm::{
    ActiveModelTrait, DbBackend, EntityTrait, FromQueryResult, Set, Statement, TransactionTrait,
};

use super::Repository;
use crate::db::comment_tree::assemble_thread;
use crate::db::models::*;
use crate::db::views::{CommentView, ThreadedComment, UserComment};
use crate::errors::{AppError, Result};

/// Most recent comments shown on a user's own profile
const USER_COMMENT_LIMIT: i64 = 50;

#[derive(Debug, Clone)]
pub struct NewComment {
    pub paper_id: i32,
    pub parent_comment_id: Option<i32>,
    pub comment_text: String,
}

impl Repository {
    /// Every comment on a paper, in thread order with depths
    pub async fn comment_thread(&self, paper_id: i32) -> Result<Vec<ThreadedComment>> {
        let comments = CommentView::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT c.comment_id, c.user_id, c.paper_id, c.parent_comment_id,
                   c.comment_text, c.created_at, c.updated_at,
                   u.name AS user_name
            FROM comments c
            JOIN users u ON u.user_id = c.user_id
            WHERE c.paper_id = $1
            ORDER BY c.created_at ASC, c.comment_id ASC
            "#,
            [paper_id.into()],
        ))
        .all(self.read_conn())
        .await?;

        Ok(assemble_thread(comments))
    }

    /// Create a comment or reply. The paper and parent checks and the insert
    /// share one transaction; a reply must stay on its parent's paper.
    pub async fn create_comment(&self, author: &User, input: NewComment) -> Result<CommentView> {
        let txn = self.write_conn().begin().await?;

        if PaperEntity::find_by_id(input.paper_id).one(&txn).await?.is_none() {
            return Err(AppError::PaperNotFound { id: input.paper_id.to_string() });
        }

        if let Some(parent_id) = input.parent_comment_id {
            let parent = CommentEntity::find_by_id(parent_id)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::CommentNotFound { id: parent_id.to_string() })?;

            if parent.paper_id != input.paper_id {
                return Err(AppError::validation(
                    "parent_comment_id",
                    "Parent comment belongs to a different paper",
                ));
            }
        }

        let now = chrono::Utc::now().fixed_offset();
        let comment = CommentActiveModel {
            user_id: Set(author.user_id),
            paper_id: Set(input.paper_id),
            parent_comment_id: Set(input.parent_comment_id),
            comment_text: Set(input.comment_text),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(
            comment_id = comment.comment_id,
            paper_id = comment.paper_id,
            user_id = author.user_id,
            "Comment created"
        );

        Ok(with_author(comment, author))
    }

    /// Replace the text of a comment owned by `user`
    pub async fn update_comment(
        &self,
        user: &User,
        comment_id: i32,
        text: String,
    ) -> Result<CommentView> {
        let existing = self.owned_comment(comment_id, user, false).await?;

        let mut comment: CommentActiveModel = existing.into();
        comment.comment_text = Set(text);
        comment.updated_at = Set(chrono::Utc::now().fixed_offset());

        let updated = comment.update(self.write_conn()).await?;
        Ok(with_author(updated, user))
    }

    /// Delete a comment owned by `user` (admins may delete any). Replies go
    /// with it through the cascade.
    pub async fn delete_comment(&self, user: &User, comment_id: i32) -> Result<()> {
        let existing = self.owned_comment(comment_id, user, user.is_admin()).await?;

        CommentEntity::delete_by_id(existing.comment_id)
            .exec(self.write_conn())
            .await?;

        tracing::info!(comment_id, user_id = user.user_id, "Comment deleted");
        Ok(())
    }

    /// The user's latest comments with the title of each paper
    pub async fn user_comments(&self, user_id: i32) -> Result<Vec<UserComment>> {
        UserComment::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT c.comment_id, c.paper_id, c.parent_comment_id, c.comment_text,
                   c.created_at, c.updated_at, p.title AS paper_title
            FROM comments c
            JOIN papers p ON p.paper_id = c.paper_id
            WHERE c.user_id = $1
            ORDER BY c.created_at DESC, c.comment_id DESC
            LIMIT $2
            "#,
            [user_id.into(), USER_COMMENT_LIMIT.into()],
        ))
        .all(self.read_conn())
        .await
        .map_err(Into::into)
    }

    async fn owned_comment(&self, comment_id: i32, user: &User, any_owner: bool) -> Result<Comment> {
        let comment = CommentEntity::find_by_id(comment_id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::CommentNotFound { id: comment_id.to_string() })?;

        if !any_owner && comment.user_id != user.user_id {
            return Err(AppError::Forbidden {
                message: "Comment belongs to another user".to_string(),
            });
        }

        Ok(comment)
    }
}

fn with_author(comment: Comment, author: &User) -> CommentView {
    CommentView {
        comment_id: comment.comment_id,
        user_id: comment.user_id,
        paper_id: comment.paper_id,
        parent_comment_id: comment.parent_comment_id,
        comment_text: comment.comment_text,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
        user_name: author.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn user() -> User {
        User {
            user_id: 1,
            name: "Reader".into(),
            email: "reader@example.com".into(),
            password_hash: "x".into(),
            role: "user".into(),
            is_verified: false,
            created_at: chrono::Utc::now().fixed_offset(),
            last_login: None,
        }
    }

    fn paper(paper_id: i32) -> Paper {
        Paper {
            paper_id,
            title: format!("Paper {paper_id}"),
            abstract_text: None,
            year: Some(2021),
            doi: None,
            pdf_url: None,
            pages: None,
            venue_id: None,
            citation_count: 0,
            created_at: chrono::Utc::now().fixed_offset(),
        }
    }

    fn comment(comment_id: i32, paper_id: i32) -> Comment {
        let now = chrono::Utc::now().fixed_offset();
        Comment {
            comment_id,
            user_id: 2,
            paper_id,
            parent_comment_id: None,
            comment_text: "root".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_reply_on_other_paper_rejected_before_insert() {
        // Only the paper and parent lookups have results; reaching the
        // insert would surface as a database error instead.
        let db = mock()
            .append_query_results([vec![paper(1)]])
            .append_query_results([vec![comment(10, 2)]]);

        let err = repo(db)
            .create_comment(
                &user(),
                NewComment {
                    paper_id: 1,
                    parent_comment_id: Some(10),
                    comment_text: "reply".into(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_comment_on_missing_paper() {
        let db = mock().append_query_results([Vec::<Paper>::new()]);
        let err = repo(db)
            .create_comment(
                &user(),
                NewComment { paper_id: 5, parent_comment_id: None, comment_text: "hi".into() },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PaperNotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_someone_elses_comment_is_forbidden() {
        let db = mock().append_query_results([vec![comment(10, 1)]]);
        let err = repo(db).update_comment(&user(), 10, "edited".into()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_comment() {
        let db = mock().append_query_results([Vec::<Comment>::new()]);
        let err = repo(db).delete_comment(&user(), 99).await.unwrap_err();
        assert!(matches!(err, AppError::CommentNotFound { .. }));
    }
}
