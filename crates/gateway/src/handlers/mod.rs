//! API handlers module

pub mod auth;
pub mod authors;
pub mod citations;
pub mod comments;
pub mod follows;
pub mod health;
pub mod library;
pub mod papers;

use axum::http::Uri;
use scholardemon_common::{
    db::PageRequest,
    errors::{AppError, Result},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// `page` and `limit` query parameters
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn page_request(&self) -> Result<PageRequest> {
        PageRequest::new(self.page, self.limit)
    }
}

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Fallback for paths no route matches
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound {
        resource_type: "route".to_string(),
        id: uri.path().to_string(),
    }
}
