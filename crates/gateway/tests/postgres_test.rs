//! End-to-end scenarios against a real PostgreSQL database.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`. Every test
//! inserts its own rows, so they can share one database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::IntoResponse,
};
use scholardemon_common::{
    auth::Role,
    config::AppConfig,
    db::{
        models::*,
        query::{PaperFilter, PaperSort},
        repository::{CitationDirection, FollowOutcome, LibraryUpsert, NewComment, NewUser},
        PageRequest,
    },
    AppError, DbPool, Repository,
};
use scholardemon_gateway::{create_router, AppState};
use sea_orm::{ActiveModelTrait, Set};
use tower::ServiceExt;

async fn pool() -> DbPool {
    let mut config = AppConfig::default();
    config.database.url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    config.database.min_connections = 1;

    let pool = DbPool::connect(&config.database).await.unwrap();
    pool.migrate().await.unwrap();
    pool
}

fn unique(label: &str) -> String {
    format!("{label}-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn paper(pool: &DbPool, title: &str, citation_count: i32) -> Paper {
    PaperActiveModel {
        title: Set(unique(title)),
        year: Set(Some(2020)),
        citation_count: Set(citation_count),
        created_at: Set(chrono::Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(pool.write())
    .await
    .unwrap()
}

async fn keyword(pool: &DbPool, papers: &[&Paper]) {
    let keyword = KeywordActiveModel {
        keyword: Set(unique("kw")),
        ..Default::default()
    }
    .insert(pool.write())
    .await
    .unwrap();

    for paper in papers {
        PaperKeywordActiveModel {
            paper_id: Set(paper.paper_id),
            keyword_id: Set(keyword.keyword_id),
        }
        .insert(pool.write())
        .await
        .unwrap();
    }
}

async fn cite(pool: &DbPool, citing: &Paper, cited: &Paper) {
    CitationActiveModel {
        citing_paper_id: Set(citing.paper_id),
        cited_paper_id: Set(cited.paper_id),
        citation_context: Set(None),
        created_at: Set(chrono::Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(pool.write())
    .await
    .unwrap();
}

async fn user(repo: &Repository) -> User {
    repo.register(NewUser {
        name: "Tester".into(),
        email: format!("{}@example.com", unique("user")),
        password: "integration".into(),
        role: Role::User,
    })
    .await
    .unwrap()
}

#[tokio::test]
#[ignore]
async fn test_library_save_twice_updates() {
    let pool = pool().await;
    let repo = Repository::new(pool.clone());
    let user = user(&repo).await;
    let paper = paper(&pool, "library", 1).await;

    let save = |rating| LibraryUpsert { paper_id: paper.paper_id, user_notes: None, rating: Some(rating) };

    let (_, created) = repo.upsert_library_entry(user.user_id, save(2)).await.unwrap();
    assert!(created);
    let (entry, created) = repo.upsert_library_entry(user.user_id, save(4)).await.unwrap();
    assert!(!created);
    assert_eq!(entry.rating, Some(4));

    let library = repo
        .library(user.user_id, Default::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(library.pagination.total, 1);
}

#[tokio::test]
#[ignore]
async fn test_follow_twice() {
    let pool = pool().await;
    let repo = Repository::new(pool.clone());
    let user = user(&repo).await;
    let author = AuthorActiveModel {
        name: Set(unique("author")),
        h_index: Set(0),
        citation_count: Set(0),
        created_at: Set(chrono::Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(pool.write())
    .await
    .unwrap();

    assert_eq!(repo.follow_author(user.user_id, author.author_id).await.unwrap(), FollowOutcome::Followed);
    assert_eq!(
        repo.follow_author(user.user_id, author.author_id).await.unwrap(),
        FollowOutcome::AlreadyFollowing
    );
    assert!(matches!(
        repo.follow_author(user.user_id, i32::MAX).await,
        Err(AppError::AuthorNotFound { .. })
    ));
}

#[tokio::test]
#[ignore]
async fn test_reply_on_other_paper_inserts_nothing() {
    let pool = pool().await;
    let repo = Repository::new(pool.clone());
    let user = user(&repo).await;
    let first = paper(&pool, "first", 0).await;
    let second = paper(&pool, "second", 0).await;

    let root = repo
        .create_comment(&user, NewComment { paper_id: first.paper_id, parent_comment_id: None, comment_text: "root".into() })
        .await
        .unwrap();

    let err = repo
        .create_comment(
            &user,
            NewComment {
                paper_id: second.paper_id,
                parent_comment_id: Some(root.comment_id),
                comment_text: "misplaced".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
    assert!(repo.comment_thread(second.paper_id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_citation_directions_and_recommendation_rank() {
    let pool = pool().await;
    let repo = Repository::new(pool.clone());
    let a = paper(&pool, "A", 10).await;
    let b = paper(&pool, "B", 1).await;
    let c = paper(&pool, "C", 500).await;

    cite(&pool, &a, &b).await;
    keyword(&pool, &[&a, &c]).await;
    keyword(&pool, &[&a, &c]).await;

    let cited = repo.citations(a.paper_id, CitationDirection::Cited).await.unwrap();
    let citing = repo.citations(a.paper_id, CitationDirection::Citing).await.unwrap();
    assert_eq!(cited.citations.iter().map(|e| e.paper_id).collect::<Vec<_>>(), vec![b.paper_id]);
    assert!(citing.citations.is_empty());

    let recommended: Vec<i32> = repo
        .recommendations(a.paper_id, 10)
        .await
        .unwrap()
        .iter()
        .map(|r| r.paper_id)
        .collect();
    assert!(!recommended.contains(&a.paper_id));
    let pos = |id| recommended.iter().position(|p| *p == id).unwrap();
    assert!(pos(b.paper_id) < pos(c.paper_id));
}

#[tokio::test]
#[ignore]
async fn test_empty_search_equals_listing() {
    let pool = pool().await;
    let repo = Repository::new(pool.clone());
    let page = PageRequest::new(Some(1), Some(5)).unwrap();

    let empty = PaperFilter { q: Some("   ".into()), ..Default::default() };
    let searched = repo.search_papers(&empty, PaperSort::Title, page).await.unwrap();
    let listed = repo.search_papers(&PaperFilter::default(), PaperSort::Title, page).await.unwrap();

    assert_eq!(searched.pagination, listed.pagination);
    let ids = |rows: &[scholardemon_common::db::views::PaperSummary]| {
        rows.iter().map(|p| p.paper_id).collect::<Vec<_>>()
    };
    assert_eq!(ids(&searched.data), ids(&listed.data));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_registration_conflicts() {
    let pool = pool().await;
    let app = create_router(AppState::new(AppConfig::default(), pool, None));
    let email = format!("{}@example.com", unique("dup"));

    let register = || {
        Request::builder()
            .method("POST")
            .uri("/api/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "name": "Dup", "email": email, "password": "secret1" }).to_string(),
            ))
            .unwrap()
    };

    let first = app.clone().oneshot(register()).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.oneshot(register()).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_unmapped_foreign_key_violation_is_bad_request() {
    let pool = pool().await;

    let err = CitationActiveModel {
        citing_paper_id: Set(i32::MAX),
        cited_paper_id: Set(i32::MAX - 1),
        citation_context: Set(None),
        created_at: Set(chrono::Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(pool.write())
    .await
    .unwrap_err();

    let err = AppError::from(err);
    assert!(err.is_foreign_key_violation());

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
