//! ScholarDemon API Gateway
//!
//! REST surface over the paper discovery model:
//! - Paper, author and citation browsing
//! - Personal libraries, follows and the follow feed
//! - Threaded comments
//! - Account registration and bearer-token authentication
//! - Request tracing, request ids and Prometheus metrics

pub mod handlers;
pub mod middleware;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use scholardemon_common::{auth::JwtManager, config::AppConfig, db::DbPool, Repository};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub jwt: Arc<JwtManager>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool, metrics: Option<PrometheusHandle>) -> Self {
        let jwt = JwtManager::new(&config.auth.jwt_secret, config.auth.jwt_expiration_secs);
        Self {
            config: Arc::new(config),
            db,
            jwt: Arc::new(jwt),
            metrics,
        }
    }

    pub fn repo(&self) -> Repository {
        Repository::new(self.db.clone())
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.client_url);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let api_routes = Router::new()
        .merge(paper_routes())
        .merge(author_routes())
        .merge(library_routes())
        .merge(comment_routes())
        .merge(follow_routes())
        .merge(auth_routes())
        .route_layer(axum::middleware::from_fn(middleware::metrics::track_metrics));

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))
        .nest("/api", api_routes)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}

fn paper_routes() -> Router<AppState> {
    use handlers::{citations, comments, papers};

    Router::new()
        .route("/papers", get(papers::list_papers))
        .route("/papers/search", get(papers::search_papers))
        .route("/papers/{id}", get(papers::get_paper))
        .route("/papers/{id}/citations", get(citations::get_citations))
        .route("/papers/{id}/recommendations", get(papers::recommendations))
        .route("/papers/{id}/comments", get(comments::paper_comments))
}

fn author_routes() -> Router<AppState> {
    use handlers::authors;

    Router::new()
        .route("/authors", get(authors::list_authors))
        .route("/authors/search", get(authors::search_authors))
        .route("/authors/{id}", get(authors::get_author))
        .route("/authors/{id}/papers", get(authors::author_papers))
        .route("/authors/{id}/co-authors", get(authors::co_authors))
}

fn library_routes() -> Router<AppState> {
    use handlers::library;

    Router::new()
        .route("/library", get(library::list_library).post(library::save_paper))
        .route("/library/stats", get(library::stats))
        .route("/library/check/{paper_id}", get(library::check))
        .route(
            "/library/{paper_id}",
            axum::routing::patch(library::update_entry).delete(library::remove_entry),
        )
}

fn comment_routes() -> Router<AppState> {
    use handlers::comments;

    Router::new()
        .route("/comments", post(comments::create_comment))
        .route("/comments/paper/{paper_id}", get(comments::paper_comments))
        .route("/comments/user/me", get(comments::my_comments))
        .route(
            "/comments/{id}",
            axum::routing::patch(comments::update_comment).delete(comments::delete_comment),
        )
}

fn follow_routes() -> Router<AppState> {
    use handlers::follows;

    Router::new()
        .route("/follows/authors", get(follows::followed_authors))
        .route(
            "/follows/authors/{id}",
            post(follows::follow_author).delete(follows::unfollow_author),
        )
        .route("/follows/authors/{id}/check", get(follows::check_author))
        .route("/follows/venues", get(follows::followed_venues))
        .route(
            "/follows/venues/{id}",
            post(follows::follow_venue).delete(follows::unfollow_venue),
        )
        .route("/follows/venues/{id}/check", get(follows::check_venue))
        .route("/follows/feed", get(follows::feed))
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me).patch(auth::update_me))
        .route("/auth/change-password", post(auth::change_password))
        .route("/auth/me/search-history", get(auth::search_history))
}

/// CORS restricted to the browser client's origin
fn cors_layer(client_url: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match client_url.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin).allow_credentials(true),
        Err(_) => {
            tracing::warn!(client_url, "Client URL is not a valid origin, allowing any origin");
            cors.allow_origin(Any)
        }
    }
}
