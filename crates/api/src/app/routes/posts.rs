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

use bitacora_core::{AuthorId, NewPost, PostId};

use crate::app::dto;
use crate::app::errors::{self, Resource};
use crate::app::routes::parse_path_id;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_post).get(list_posts))
        .route("/:id", get(get_post).patch(update_post).delete(delete_post))
}

/// `authorId` is stored as given, even if no such author exists.
pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreatePostRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let new = NewPost {
        title: body.title,
        content: body.content,
        author_id: AuthorId::new(body.author_id),
    };

    match services.posts.create_post(new).await {
        Ok(post) => (StatusCode::CREATED, Json(dto::post_to_json(&post))).into_response(),
        Err(e) => errors::store_error_to_response(e, Resource::Post),
    }
}

pub async fn list_posts(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.posts.find_all_posts().await {
        Ok(posts) => {
            let items = posts.iter().map(dto::post_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::store_error_to_response(e, Resource::Post),
    }
}

pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let Some(post_id) = parse_path_id::<PostId>(path) else {
        return errors::not_found(Resource::Post);
    };

    match services.posts.find_post(post_id).await {
        Ok(Some(post)) => (StatusCode::OK, Json(dto::post_to_json(&post))).into_response(),
        Ok(None) => errors::not_found(Resource::Post),
        Err(e) => errors::store_error_to_response(e, Resource::Post),
    }
}

pub async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<dto::UpdatePostRequest>, JsonRejection>,
) -> axum::response::Response {
    let Some(post_id) = parse_path_id::<PostId>(path) else {
        return errors::not_found(Resource::Post);
    };

    let mut post = match services.posts.find_post(post_id).await {
        Ok(Some(post)) => post,
        Ok(None) => return errors::not_found(Resource::Post),
        Err(e) => return errors::store_error_to_response(e, Resource::Post),
    };

    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    post.revise(body.title, body.content, Utc::now());

    match services.posts.save_post(&post).await {
        Ok(saved) => (StatusCode::OK, Json(dto::post_to_json(&saved))).into_response(),
        Err(e) => errors::store_error_to_response(e, Resource::Post),
    }
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let Some(post_id) = parse_path_id::<PostId>(path) else {
        return errors::not_found(Resource::Post);
    };

    match services.posts.find_post(post_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::not_found(Resource::Post),
        Err(e) => return errors::store_error_to_response(e, Resource::Post),
    }

    match services.posts.destroy_post(post_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": Resource::Post.deleted_message() })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e, Resource::Post),
    }
}
