use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use bitacora_core::{Author, AuthorId, Entity, NewAuthor, NewPost, Post, PostId};

use super::{AuthorStore, PostStore, StoreError, StoreResult};

/// One table: rows ordered by id plus the last id handed out.
#[derive(Debug)]
struct Table<E: Entity> {
    inner: RwLock<TableState<E>>,
}

#[derive(Debug)]
struct TableState<E: Entity> {
    rows: BTreeMap<E::Id, E>,
    last_id: i64,
}

impl<E> Table<E>
where
    E: Entity + Clone,
    E::Id: From<i64>,
{
    fn new() -> Self {
        Self {
            inner: RwLock::new(TableState {
                rows: BTreeMap::new(),
                last_id: 0,
            }),
        }
    }

    /// Ids start at 1 and are never reused, even after deletes.
    fn insert_with(&self, build: impl FnOnce(E::Id) -> E) -> StoreResult<E> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        state.last_id += 1;
        let row = build(E::Id::from(state.last_id));
        state.rows.insert(row.id(), row.clone());
        Ok(row)
    }

    fn all(&self) -> StoreResult<Vec<E>> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        Ok(state.rows.values().cloned().collect())
    }

    fn get(&self, id: E::Id) -> StoreResult<Option<E>> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        Ok(state.rows.get(&id).cloned())
    }

    fn replace(&self, row: &E) -> StoreResult<E> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        match state.rows.get_mut(&row.id()) {
            Some(slot) => {
                *slot = row.clone();
                Ok(row.clone())
            }
            None => Err(StoreError::RecordMissing),
        }
    }

    fn remove(&self, id: E::Id) -> StoreResult<()> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        state
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::RecordMissing)
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory table lock poisoned".to_string())
}

/// In-memory store for tests/dev. Contents are lost when the process exits.
#[derive(Debug)]
pub struct InMemoryStore {
    authors: Table<Author>,
    posts: Table<Post>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            authors: Table::new(),
            posts: Table::new(),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthorStore for InMemoryStore {
    async fn create_author(&self, new: NewAuthor) -> StoreResult<Author> {
        let now = Utc::now();
        self.authors.insert_with(|id| Author::from_new(id, new, now))
    }

    async fn find_all_authors(&self) -> StoreResult<Vec<Author>> {
        self.authors.all()
    }

    async fn find_author(&self, id: AuthorId) -> StoreResult<Option<Author>> {
        self.authors.get(id)
    }

    async fn save_author(&self, author: &Author) -> StoreResult<Author> {
        self.authors.replace(author)
    }

    async fn destroy_author(&self, id: AuthorId) -> StoreResult<()> {
        // Posts referencing this author are left in place.
        self.authors.remove(id)
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn create_post(&self, new: NewPost) -> StoreResult<Post> {
        let now = Utc::now();
        self.posts.insert_with(|id| Post::from_new(id, new, now))
    }

    async fn find_all_posts(&self) -> StoreResult<Vec<Post>> {
        self.posts.all()
    }

    async fn find_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        self.posts.get(id)
    }

    async fn save_post(&self, post: &Post) -> StoreResult<Post> {
        self.posts.replace(post)
    }

    async fn destroy_post(&self, id: PostId) -> StoreResult<()> {
        self.posts.remove(id)
    }
}
