use serde::Deserialize;
use serde_json::{Value, json};

use bitacora_core::{Author, Post};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateAuthorRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAuthorRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub author_id: i64,
}

/// `authorId` is not part of the schema; if sent, it is ignored.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn author_to_json(author: &Author) -> Value {
    json!({
        "id": author.id.get(),
        "name": author.name,
        "createdAt": author.created_at,
        "updatedAt": author.updated_at,
    })
}

pub fn post_to_json(post: &Post) -> Value {
    json!({
        "id": post.id.get(),
        "title": post.title,
        "content": post.content,
        "authorId": post.author_id.get(),
        "createdAt": post.created_at,
        "updatedAt": post.updated_at,
    })
}
