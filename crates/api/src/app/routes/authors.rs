use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use bitacora_core::{AuthorId, NewAuthor};

use crate::app::dto;
use crate::app::errors::{self, Resource};
use crate::app::routes::parse_path_id;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_author).get(list_authors))
        .route("/:id", get(get_author).patch(update_author).delete(delete_author))
}

pub async fn create_author(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateAuthorRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.authors.create_author(NewAuthor { name: body.name }).await {
        Ok(author) => (StatusCode::CREATED, Json(dto::author_to_json(&author))).into_response(),
        Err(e) => errors::store_error_to_response(e, Resource::Author),
    }
}

pub async fn list_authors(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.authors.find_all_authors().await {
        Ok(authors) => {
            let items = authors.iter().map(dto::author_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::store_error_to_response(e, Resource::Author),
    }
}

pub async fn get_author(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let Some(author_id) = parse_path_id::<AuthorId>(path) else {
        return errors::not_found(Resource::Author);
    };

    match services.authors.find_author(author_id).await {
        Ok(Some(author)) => (StatusCode::OK, Json(dto::author_to_json(&author))).into_response(),
        Ok(None) => errors::not_found(Resource::Author),
        Err(e) => errors::store_error_to_response(e, Resource::Author),
    }
}

pub async fn update_author(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<dto::UpdateAuthorRequest>, JsonRejection>,
) -> axum::response::Response {
    let Some(author_id) = parse_path_id::<AuthorId>(path) else {
        return errors::not_found(Resource::Author);
    };

    let mut author = match services.authors.find_author(author_id).await {
        Ok(Some(author)) => author,
        Ok(None) => return errors::not_found(Resource::Author),
        Err(e) => return errors::store_error_to_response(e, Resource::Author),
    };

    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    author.rename(body.name, Utc::now());

    match services.authors.save_author(&author).await {
        Ok(saved) => (StatusCode::OK, Json(dto::author_to_json(&saved))).into_response(),
        Err(e) => errors::store_error_to_response(e, Resource::Author),
    }
}

pub async fn delete_author(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let Some(author_id) = parse_path_id::<AuthorId>(path) else {
        return errors::not_found(Resource::Author);
    };

    match services.authors.find_author(author_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::not_found(Resource::Author),
        Err(e) => return errors::store_error_to_response(e, Resource::Author),
    }

    // Posts written by this author are left in place.
    match services.authors.destroy_author(author_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": Resource::Author.deleted_message() })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e, Resource::Author),
    }
}
