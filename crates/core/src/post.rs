use chrono::{DateTime, Utc};

use crate::entity::Entity;
use crate::id::{AuthorId, PostId};

/// Fields accepted when creating a post.
///
/// `author_id` is stored as given; nothing checks that the author exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: AuthorId,
}

/// A persisted post record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: AuthorId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn from_new(id: PostId, new: NewPost, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            content: new.content,
            author_id: new.author_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite title and content. The owning author is fixed at creation.
    pub fn revise(&mut self, title: String, content: String, now: DateTime<Utc>) {
        self.title = title;
        self.content = content;
        self.updated_at = now;
    }
}

impl Entity for Post {
    type Id = PostId;

    fn id(&self) -> PostId {
        self.id
    }
}
