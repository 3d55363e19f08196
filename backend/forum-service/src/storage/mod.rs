/// Storage contract for the forum service
///
/// The domain layer depends on this trait only; two engines implement it
/// (PostgreSQL and a file-backed in-memory store) and one is selected at
/// startup. All serialization of shared mutable state belongs to the
/// engines; the domain layer holds no locks.
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Comment, NewComment, NewPost, NewUser, Post, UpdatePostInput, User};

/// Capability set over users, posts, and comments.
///
/// `post` returns `Ok(None)` for an unknown id so callers can distinguish
/// "does not exist" from storage failure; the user lookups return a typed
/// not-found error instead, which propagates through the domain unchanged.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Open a transaction scoping user creation.
    async fn begin(&self) -> Result<Box<dyn StorageTx>>;

    async fn user_by_id(&self, id: &str) -> Result<User>;
    async fn user_by_username(&self, username: &str) -> Result<User>;
    async fn users(&self) -> Result<Vec<User>>;
    async fn posts_by_user(&self, user_id: &str) -> Result<Vec<Post>>;
    async fn posts(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<Post>>;
    async fn post(&self, id: &str) -> Result<Option<Post>>;
    async fn comments(
        &self,
        post_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Comment>>;

    async fn create_post(&self, owner_id: &str, post: NewPost) -> Result<Post>;
    async fn update_post(&self, upd: UpdatePostInput) -> Result<Post>;
    async fn add_comment(&self, author_id: &str, comment: NewComment) -> Result<Comment>;
}

/// All-or-nothing scope for user creation.
///
/// `rollback` must be safe after `commit` (it becomes a no-op) and safe to
/// call any number of times.
#[async_trait]
pub trait StorageTx: Send {
    async fn create_user(&mut self, user: NewUser) -> Result<User>;
    async fn commit(&mut self) -> Result<()>;
    async fn rollback(&mut self) -> Result<()>;
}
