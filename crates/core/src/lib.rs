//! `bitacora-core`: domain records shared by the store and the HTTP layer.
//!
//! This crate contains **pure domain** types (no infrastructure concerns).

pub mod author;
pub mod entity;
pub mod error;
pub mod id;
pub mod post;

pub use author::{Author, NewAuthor};
pub use entity::Entity;
pub use error::DomainError;
pub use id::{AuthorId, PostId};
pub use post::{NewPost, Post};
