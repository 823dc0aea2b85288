//! Post storage contract and its SQLite implementation.
//!
//! Handlers only ever see [`SharedRepository`]; which implementation sits
//! behind it is decided once, when the Rocket instance is built.

use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{DbPool, DbPoolExt};
use crate::error::RepoError;

pub type PostId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub created_at: String,
}

pub trait PostRepository: Send + Sync {
    /// Persists a new post and returns its id. The slug is derived here.
    fn store(&self, title: &str, description: &str) -> Result<PostId, RepoError>;
    /// All posts, newest first.
    fn list_all(&self) -> Result<Vec<Post>, RepoError>;
    fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;
}

/// The process-wide repository binding handed to `create_rocket`.
pub type SharedRepository = Arc<dyn PostRepository>;

pub fn slugify(s: &str) -> String {
    let slug = s
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

pub struct SqlitePostRepository {
    pool: DbPool,
}

impl SqlitePostRepository {
    /// Wraps an already initialized connection (see `db::initialize`).
    pub fn new(conn: Connection) -> Self {
        Self {
            pool: DbPool::new(conn),
        }
    }

    fn unique_slug(conn: &Connection, title: &str) -> Result<String, RepoError> {
        let base = slugify(title);
        let mut candidate = base.clone();
        let mut n = 2;
        loop {
            let taken: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM posts WHERE slug = ?1)",
                [&candidate],
                |r| r.get(0),
            )?;
            if !taken {
                return Ok(candidate);
            }
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
    }
}

fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl PostRepository for SqlitePostRepository {
    fn store(&self, title: &str, description: &str) -> Result<PostId, RepoError> {
        let conn = self.pool.conn();
        let slug = Self::unique_slug(&conn, title)?;
        let created_at = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO posts (title, slug, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![title, slug, description, created_at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        let conn = self.pool.conn();
        let mut stmt = conn.prepare(
            "SELECT id, title, slug, description, created_at FROM posts ORDER BY id DESC",
        )?;
        let posts = stmt
            .query_map([], row_to_post)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(posts)
    }

    fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let conn = self.pool.conn();
        let post = conn
            .query_row(
                "SELECT id, title, slug, description, created_at FROM posts WHERE slug = ?1",
                [slug],
                row_to_post,
            )
            .optional()?;
        Ok(post)
    }
}
