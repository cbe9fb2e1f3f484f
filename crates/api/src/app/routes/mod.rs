use std::str::FromStr;

use axum::{
    Router,
    extract::{Path, rejection::PathRejection},
};

pub mod authors;
pub mod posts;
pub mod system;

/// Router for the `/api` resource endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/api/authors", authors::router())
        .nest("/api/posts", posts::router())
}

/// Decode the `:id` segment. A segment that is not valid UTF-8 or not an
/// integer cannot name a record, so callers answer with the resource's 404.
pub(crate) fn parse_path_id<T: FromStr>(path: Result<Path<String>, PathRejection>) -> Option<T> {
    let Path(raw) = path.ok()?;
    raw.parse().ok()
}
