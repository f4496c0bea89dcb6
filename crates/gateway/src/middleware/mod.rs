//! Request extractors and middleware

pub mod auth;
pub mod extract;
pub mod metrics;

pub use auth::{AuthUser, OptionalUser};
pub use extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
