/// PostgreSQL storage engine
///
/// Mechanical mapping of the storage contract onto relational queries;
/// serialization of concurrent writers is the database's job. String ids
/// cross the API while the tables use BIGSERIAL keys, so ids are cast to
/// text on the way out and parsed on the way in (a non-numeric id cannot
/// match any row).
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::error::{ForumError, Result};
use crate::models::{Comment, NewComment, NewPost, NewUser, Post, UpdatePostInput, User};
use crate::storage::{Storage, StorageTx};

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_id(id: &str) -> Option<i64> {
    id.parse().ok()
}

fn user_not_found() -> ForumError {
    ForumError::NotFound("user with this id does not exist".to_string())
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get::<i64, _>("id").to_string(),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn post_from_row(row: &PgRow) -> Post {
    Post {
        id: row.get::<i64, _>("id").to_string(),
        user_id: row.get::<i64, _>("user_id").to_string(),
        title: row.get("title"),
        content: row.get("content"),
        comments_enabled: row.get("comments_enabled"),
        comments: Vec::new(),
    }
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get::<i64, _>("id").to_string(),
        post_id: row.get::<i64, _>("post_id").to_string(),
        parent_id: row
            .get::<Option<i64>, _>("parent_id")
            .map(|id| id.to_string()),
        user_id: row.get::<i64, _>("user_id").to_string(),
        content: row.get("content"),
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn begin(&self) -> Result<Box<dyn StorageTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx: Some(tx) }))
    }

    async fn user_by_id(&self, id: &str) -> Result<User> {
        let id = parse_id(id).ok_or_else(user_not_found)?;
        let row = sqlx::query(
            "SELECT id, username, password_hash, first_name, last_name, created_at, updated_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| user_from_row(&r)).ok_or_else(user_not_found)
    }

    async fn user_by_username(&self, username: &str) -> Result<User> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, first_name, last_name, created_at, updated_at \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| user_from_row(&r)).ok_or_else(|| {
            ForumError::NotFound("user with this username does not exist".to_string())
        })
    }

    async fn users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, username, password_hash, first_name, last_name, created_at, updated_at \
             FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn posts_by_user(&self, user_id: &str) -> Result<Vec<Post>> {
        let Some(user_id) = parse_id(user_id) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT id, user_id, title, content, comments_enabled \
             FROM posts WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn posts(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<Post>> {
        let rows = sqlx::query(
            "SELECT id, user_id, title, content, comments_enabled \
             FROM posts ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn post(&self, id: &str) -> Result<Option<Post>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query(
            "SELECT id, user_id, title, content, comments_enabled FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| post_from_row(&r)))
    }

    async fn comments(
        &self,
        post_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Comment>> {
        let Some(post_id) = parse_id(post_id) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT id, post_id, parent_id, user_id, content \
             FROM comments WHERE post_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn create_post(&self, owner_id: &str, post: NewPost) -> Result<Post> {
        let owner_id = parse_id(owner_id).ok_or_else(user_not_found)?;
        let row = sqlx::query(
            "INSERT INTO posts (user_id, title, content) VALUES ($1, $2, $3) \
             RETURNING id, user_id, title, content, comments_enabled",
        )
        .bind(owner_id)
        .bind(&post.title)
        .bind(&post.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(post_from_row(&row))
    }

    async fn update_post(&self, upd: UpdatePostInput) -> Result<Post> {
        let post_id = parse_id(&upd.post_id).ok_or_else(ForumError::post_not_found)?;
        let row = sqlx::query(
            "UPDATE posts SET comments_enabled = $1 WHERE id = $2 \
             RETURNING id, user_id, title, content, comments_enabled",
        )
        .bind(upd.enable_comments)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| post_from_row(&r))
            .ok_or_else(ForumError::post_not_found)
    }

    async fn add_comment(&self, author_id: &str, comment: NewComment) -> Result<Comment> {
        let author_id = parse_id(author_id).ok_or_else(user_not_found)?;
        let post_id = parse_id(&comment.post_id).ok_or_else(ForumError::post_not_found)?;
        let parent_id = comment.parent_id.as_deref().and_then(parse_id);

        let row = sqlx::query(
            "INSERT INTO comments (post_id, parent_id, user_id, content) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, post_id, parent_id, user_id, content",
        )
        .bind(post_id)
        .bind(parent_id)
        .bind(author_id)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment_from_row(&row))
    }
}

/// Transaction wrapper around a pooled sqlx transaction.
///
/// `commit` consumes the inner transaction; `rollback` on an
/// already-finished wrapper is a no-op, per the storage contract.
struct PgTx {
    tx: Option<Transaction<'static, Postgres>>,
}

#[async_trait]
impl StorageTx for PgTx {
    async fn create_user(&mut self, user: NewUser) -> Result<User> {
        let tx = self
            .tx
            .as_mut()
            .ok_or_else(|| ForumError::Internal("transaction is no longer active".to_string()))?;

        let row = sqlx::query(
            "INSERT INTO users (username, password_hash, first_name, last_name) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, username, password_hash, first_name, last_name, created_at, updated_at",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(tx.as_mut())
        .await?;

        Ok(user_from_row(&row))
    }

    async fn commit(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}
