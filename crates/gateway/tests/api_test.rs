//! Router tests against a mock database

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use scholardemon_common::{config::AppConfig, db::models::User, DbPool};
use scholardemon_gateway::{create_router, AppState};
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use serde_json::Value as Json;
use std::collections::BTreeMap;
use tower::ServiceExt;

fn app(db: MockDatabase) -> Router {
    let pool = DbPool::from_connection(db.into_connection());
    create_router(AppState::new(AppConfig::default(), pool, None))
}

fn mock() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn now() -> Value {
    chrono::Utc::now().fixed_offset().into()
}

fn count_row(total: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("total", Value::BigInt(Some(total)))])
}

fn paper_row(paper_id: i32, title: &str) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([
        ("paper_id", paper_id.into()),
        ("title", title.to_string().into()),
        ("abstract_text", Some("We study joins.".to_string()).into()),
        ("year", Some(2019).into()),
        ("doi", Option::<String>::None.into()),
        ("pdf_url", Option::<String>::None.into()),
        ("citation_count", 42.into()),
        ("created_at", now()),
        ("venue_name", Some("SIGMOD".to_string()).into()),
        ("venue_type", Some("conference".to_string()).into()),
        ("authors", serde_json::json!([{"author_id": 3, "name": "Edgar", "order": 1}]).into()),
        ("keywords", serde_json::json!(["query optimization"]).into()),
    ])
}

fn registered_user() -> User {
    User {
        user_id: 11,
        name: "Barbara".into(),
        email: "barbara@example.com".into(),
        password_hash: "$argon2id$stored".into(),
        role: "user".into(),
        is_verified: false,
        created_at: chrono::Utc::now().fixed_offset(),
        last_login: None,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Json {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(mock()).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_list_papers_envelope() {
    let db = mock()
        .append_query_results([vec![count_row(41)]])
        .append_query_results([vec![paper_row(1, "Access Path Selection")]]);

    let response = app(db).oneshot(get("/api/papers?page=3&limit=20")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["pagination"]["page"], 3);
    assert_eq!(body["pagination"]["total"], 41);
    assert_eq!(body["pagination"]["pages"], 3);
    assert_eq!(body["data"][0]["abstract"], "We study joins.");
    assert_eq!(body["data"][0]["authors"][0]["name"], "Edgar");
}

#[tokio::test]
async fn test_page_zero_rejected() {
    let response = app(mock()).oneshot(get("/api/papers?page=0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "page");
}

#[tokio::test]
async fn test_limit_over_maximum_rejected() {
    let response = app(mock()).oneshot(get("/api/papers/search?limit=101")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_sort_rejected() {
    let response = app(mock()).oneshot(get("/api/papers?sort=popularity")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_citation_type_rejected() {
    let response = app(mock())
        .oneshot(get("/api/papers/1/citations?type=both"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_id_rejected() {
    let response = app(mock()).oneshot(get("/api/papers/abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_library_requires_token() {
    let response = app(mock()).oneshot(get("/api/library")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_library_rejects_bad_token() {
    let request = Request::builder()
        .uri("/api/library")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let response = app(mock()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_search_with_bad_token_is_anonymous() {
    let db = mock()
        .append_query_results([vec![count_row(1)]])
        .append_query_results([vec![paper_row(5, "Join Ordering")]]);

    let request = Request::builder()
        .uri("/api/papers/search?q=join")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let response = app(db).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"][0]["paper_id"], 5);
}

#[tokio::test]
async fn test_register_returns_token() {
    let db = mock().append_query_results([vec![registered_user()]]);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({
                "name": "Barbara",
                "email": "barbara@example.com",
                "password": "liskov-substitution"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app(db).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["user_id"], 11);
    assert_eq!(body["user"]["email"], "barbara@example.com");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_validates_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "name": "B", "email": "nope", "password": "x" }).to_string(),
        ))
        .unwrap();

    let response = app(mock()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_disabled() {
    let response = app(mock()).oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let response = app(mock()).oneshot(get("/api/no-such-thing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert!(body["error"]["message"].as_str().unwrap().contains("/api/no-such-thing"));
}
