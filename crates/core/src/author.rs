use chrono::{DateTime, Utc};

use crate::entity::Entity;
use crate::id::AuthorId;

/// Fields accepted when creating an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
}

/// A persisted author record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    /// Materialize a freshly created record once the store has assigned its id.
    pub fn from_new(id: AuthorId, new: NewAuthor, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the name. Empty names are accepted.
    pub fn rename(&mut self, name: String, now: DateTime<Utc>) {
        self.name = name;
        self.updated_at = now;
    }
}

impl Entity for Author {
    type Id = AuthorId;

    fn id(&self) -> AuthorId {
        self.id
    }
}
