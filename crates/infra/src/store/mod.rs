//! Record stores for authors and posts.
//!
//! Handlers only see the `AuthorStore` / `PostStore` traits; the backend is
//! picked once at startup and injected into the router.

use async_trait::async_trait;
use thiserror::Error;

use bitacora_core::{Author, AuthorId, NewAuthor, NewPost, Post, PostId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// Absence on lookup is not an error (`Ok(None)`); `RecordMissing` is only
/// returned when a save/destroy targets a row that no longer exists.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    RecordMissing,

    #[error("store backend failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn create_author(&self, new: NewAuthor) -> StoreResult<Author>;

    /// All authors, ascending by id.
    async fn find_all_authors(&self) -> StoreResult<Vec<Author>>;

    async fn find_author(&self, id: AuthorId) -> StoreResult<Option<Author>>;

    /// Persist every mutable column of `author` and return the stored row.
    async fn save_author(&self, author: &Author) -> StoreResult<Author>;

    async fn destroy_author(&self, id: AuthorId) -> StoreResult<()>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, new: NewPost) -> StoreResult<Post>;

    /// All posts, ascending by id.
    async fn find_all_posts(&self) -> StoreResult<Vec<Post>>;

    async fn find_post(&self, id: PostId) -> StoreResult<Option<Post>>;

    async fn save_post(&self, post: &Post) -> StoreResult<Post>;

    async fn destroy_post(&self, id: PostId) -> StoreResult<()>;
}
