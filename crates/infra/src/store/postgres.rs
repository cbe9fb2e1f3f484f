//! Postgres-backed record store.
//!
//! ## Schema
//!
//! `ensure_schema` creates the `authors` and `posts` tables when they are absent.
//! `posts.author_id` carries no foreign key: posts may name authors that do not
//! exist, and deleting an author leaves its posts in place.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database (any code) | `Backend` |
//! | PoolClosed / PoolTimedOut | `Backend` |
//! | Io / Tls / Protocol / other | `Backend` |
//!
//! Missing rows are detected from `RETURNING` / `rows_affected`, never from
//! `RowNotFound`.
//!
//! ## Timestamps
//!
//! Both `created_at` and `updated_at` come from the database clock (`NOW()`);
//! the `updated_at` carried by a record passed to `save_*` is ignored.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use bitacora_core::{Author, AuthorId, NewAuthor, NewPost, Post, PostId};

use super::{AuthorStore, PostStore, StoreError, StoreResult};

const SCHEMA_LOCK_KEY: i64 = 0x6269_7463_6163_6f72;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        author_id BIGINT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS posts_author_id_idx ON posts (author_id)",
];

/// Postgres-backed store for authors and posts.
///
/// Cloning is cheap; `PgPool` is reference-counted internally.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    ///
    /// Runs under a transaction-scoped advisory lock so concurrent callers do not
    /// race on `CREATE TABLE IF NOT EXISTS`.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SCHEMA_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))
    }
}

#[async_trait]
impl AuthorStore for PostgresStore {
    #[instrument(skip(self, new), err)]
    async fn create_author(&self, new: NewAuthor) -> StoreResult<Author> {
        let row = sqlx::query(
            r#"
            INSERT INTO authors (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_author", e))?;

        author_from_row(&row).map_err(|e| map_sqlx_error("create_author", e))
    }

    #[instrument(skip(self), err)]
    async fn find_all_authors(&self) -> StoreResult<Vec<Author>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, created_at, updated_at
            FROM authors
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_all_authors", e))?;

        rows.iter()
            .map(author_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("find_all_authors", e))
    }

    #[instrument(skip(self), fields(author_id = %id), err)]
    async fn find_author(&self, id: AuthorId) -> StoreResult<Option<Author>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, created_at, updated_at
            FROM authors
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_author", e))?;

        row.as_ref()
            .map(author_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_author", e))
    }

    #[instrument(skip(self, author), fields(author_id = %author.id), err)]
    async fn save_author(&self, author: &Author) -> StoreResult<Author> {
        let row = sqlx::query(
            r#"
            UPDATE authors
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(author.id.get())
        .bind(&author.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_author", e))?
        .ok_or(StoreError::RecordMissing)?;

        author_from_row(&row).map_err(|e| map_sqlx_error("save_author", e))
    }

    #[instrument(skip(self), fields(author_id = %id), err)]
    async fn destroy_author(&self, id: AuthorId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("destroy_author", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RecordMissing);
        }
        Ok(())
    }
}

#[async_trait]
impl PostStore for PostgresStore {
    #[instrument(skip(self, new), fields(author_id = %new.author_id), err)]
    async fn create_post(&self, new: NewPost) -> StoreResult<Post> {
        let row = sqlx::query(
            r#"
            INSERT INTO posts (title, content, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, author_id, created_at, updated_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.author_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_post", e))?;

        post_from_row(&row).map_err(|e| map_sqlx_error("create_post", e))
    }

    #[instrument(skip(self), err)]
    async fn find_all_posts(&self) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, author_id, created_at, updated_at
            FROM posts
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_all_posts", e))?;

        rows.iter()
            .map(post_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("find_all_posts", e))
    }

    #[instrument(skip(self), fields(post_id = %id), err)]
    async fn find_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, content, author_id, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_post", e))?;

        row.as_ref()
            .map(post_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_post", e))
    }

    /// `author_id` is deliberately not part of the UPDATE.
    #[instrument(skip(self, post), fields(post_id = %post.id), err)]
    async fn save_post(&self, post: &Post) -> StoreResult<Post> {
        let row = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, content = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, content, author_id, created_at, updated_at
            "#,
        )
        .bind(post.id.get())
        .bind(&post.title)
        .bind(&post.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_post", e))?
        .ok_or(StoreError::RecordMissing)?;

        post_from_row(&row).map_err(|e| map_sqlx_error("save_post", e))
    }

    #[instrument(skip(self), fields(post_id = %id), err)]
    async fn destroy_post(&self, id: PostId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("destroy_post", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RecordMissing);
        }
        Ok(())
    }
}

fn author_from_row(row: &PgRow) -> Result<Author, sqlx::Error> {
    Ok(Author {
        id: AuthorId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn post_from_row(row: &PgRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        id: PostId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author_id: AuthorId::new(row.try_get("author_id")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Map SQLx errors to `StoreError`, keeping the operation name for the logs.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            StoreError::Backend(format!(
                "database error in {} (code {}): {}",
                operation,
                code,
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Backend(format!("connection pool timed out in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
