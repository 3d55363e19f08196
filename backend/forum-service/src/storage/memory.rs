/// File-backed in-memory storage engine
///
/// Development/testing substitute for the relational engine. Both
/// collections live in one process-wide state behind a single reader/writer
/// lock, and every successful mutation rewrites the affected collection's
/// JSON snapshot in full before the lock is released. The rewrite is a
/// plain whole-file overwrite, not an append-only log; there is no atomic
/// rename or journaling.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{ForumError, Result};
use crate::models::{Comment, NewComment, NewPost, NewUser, Post, UpdatePostInput, User};
use crate::storage::{Storage, StorageTx};

const USERS_FILE: &str = "users.json";
const POSTS_FILE: &str = "posts.json";

/// Users and posts guarded jointly; comments are nested per post.
#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    posts: Vec<Post>,
}

struct Inner {
    base_path: PathBuf,
    state: RwLock<State>,
}

#[derive(Clone)]
pub struct MemoryStorage {
    inner: Arc<Inner>,
}

impl MemoryStorage {
    /// Load both snapshot files fully into memory.
    ///
    /// A missing or malformed file is fatal: the engine never starts
    /// partially initialized.
    pub fn load(base_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();

        let users: Vec<User> = read_snapshot(&base_path.join(USERS_FILE))?;
        let posts: Vec<Post> = read_snapshot(&base_path.join(POSTS_FILE))?;

        Ok(Self {
            inner: Arc::new(Inner {
                base_path,
                state: RwLock::new(State { users, posts }),
            }),
        })
    }
}

fn read_snapshot<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read snapshot file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("cannot parse snapshot file {}", path.display()))
}

/// Monotonic id scheme: last element's id + 1, or "1" for an empty
/// collection. Only correct because writes are serialized by the lock.
fn next_id(last: Option<&str>) -> String {
    let last: u64 = last.and_then(|id| id.parse().ok()).unwrap_or(0);
    (last + 1).to_string()
}

fn paginate<T: Clone>(items: &[T], limit: Option<i64>, offset: Option<i64>) -> Vec<T> {
    let offset = offset.unwrap_or(0).max(0) as usize;
    let limit = limit.map_or(usize::MAX, |l| l.max(0) as usize);
    items.iter().skip(offset).take(limit).cloned().collect()
}

impl Inner {
    /// Synchronous whole-file rewrite of one collection's snapshot. Called
    /// with the write lock held so the file always matches memory.
    fn persist<T: serde::Serialize>(&self, file_name: &str, records: &[T]) -> Result<()> {
        let path = self.base_path.join(file_name);
        let encoded = serde_json::to_vec_pretty(records)
            .map_err(|e| ForumError::Internal(e.to_string()))?;
        std::fs::write(&path, encoded).map_err(|e| {
            tracing::error!("cannot rewrite snapshot {}: {}", path.display(), e);
            ForumError::Internal(e.to_string())
        })
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn begin(&self) -> Result<Box<dyn StorageTx>> {
        Ok(Box::new(MemoryTx {
            inner: Arc::clone(&self.inner),
        }))
    }

    async fn user_by_id(&self, id: &str) -> Result<User> {
        let state = self.inner.state.read().await;
        state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| ForumError::NotFound("user with this id does not exist".to_string()))
    }

    async fn user_by_username(&self, username: &str) -> Result<User> {
        let state = self.inner.state.read().await;
        state
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| {
                ForumError::NotFound("user with this username does not exist".to_string())
            })
    }

    async fn users(&self) -> Result<Vec<User>> {
        Ok(self.inner.state.read().await.users.clone())
    }

    async fn posts_by_user(&self, user_id: &str) -> Result<Vec<Post>> {
        let state = self.inner.state.read().await;
        Ok(state
            .posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn posts(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<Post>> {
        let state = self.inner.state.read().await;
        Ok(paginate(&state.posts, limit, offset))
    }

    async fn post(&self, id: &str) -> Result<Option<Post>> {
        let state = self.inner.state.read().await;
        Ok(state.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn comments(
        &self,
        post_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Comment>> {
        let state = self.inner.state.read().await;
        let post = state
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .ok_or_else(ForumError::post_not_found)?;
        Ok(paginate(&post.comments, limit, offset))
    }

    async fn create_post(&self, owner_id: &str, post: NewPost) -> Result<Post> {
        let mut state = self.inner.state.write().await;
        let post = Post {
            id: next_id(state.posts.last().map(|p| p.id.as_str())),
            user_id: owner_id.to_string(),
            title: post.title,
            content: post.content,
            comments_enabled: true,
            comments: Vec::new(),
        };
        state.posts.push(post.clone());
        self.inner.persist(POSTS_FILE, &state.posts)?;
        Ok(post)
    }

    async fn update_post(&self, upd: UpdatePostInput) -> Result<Post> {
        let mut state = self.inner.state.write().await;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == upd.post_id)
            .ok_or_else(ForumError::post_not_found)?;
        post.comments_enabled = upd.enable_comments;
        let updated = post.clone();
        self.inner.persist(POSTS_FILE, &state.posts)?;
        Ok(updated)
    }

    async fn add_comment(&self, author_id: &str, comment: NewComment) -> Result<Comment> {
        let mut state = self.inner.state.write().await;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == comment.post_id)
            .ok_or_else(ForumError::post_not_found)?;
        let comment = Comment {
            id: next_id(post.comments.last().map(|c| c.id.as_str())),
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            user_id: author_id.to_string(),
            content: comment.content,
        };
        post.comments.push(comment.clone());
        self.inner.persist(POSTS_FILE, &state.posts)?;
        Ok(comment)
    }
}

/// Trivial transaction: the write lock already serializes the whole
/// mutation, so creation applies immediately and commit/rollback are no-ops
/// (rollback stays a no-op after commit, as the contract requires).
struct MemoryTx {
    inner: Arc<Inner>,
}

#[async_trait]
impl StorageTx for MemoryTx {
    async fn create_user(&mut self, user: NewUser) -> Result<User> {
        let mut state = self.inner.state.write().await;
        let now = Utc::now();
        let user = User {
            id: next_id(state.users.last().map(|u| u.id.as_str())),
            username: user.username,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        self.inner.persist(USERS_FILE, &state.users)?;
        Ok(user)
    }

    async fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed_empty() -> (TempDir, MemoryStorage) {
        let dir = TempDir::new().expect("should create temp dir");
        std::fs::write(dir.path().join(USERS_FILE), "[]").expect("should seed users.json");
        std::fs::write(dir.path().join(POSTS_FILE), "[]").expect("should seed posts.json");
        let storage = MemoryStorage::load(dir.path()).expect("should load storage");
        (dir, storage)
    }

    async fn create_user(storage: &MemoryStorage, username: &str) -> User {
        let mut tx = storage.begin().await.expect("should begin");
        let user = tx
            .create_user(NewUser {
                username: username.to_string(),
                password_hash: "$argon2id$fake".to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
            })
            .await
            .expect("should create user");
        tx.commit().await.expect("should commit");
        user
    }

    #[test]
    fn test_load_fails_on_missing_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(USERS_FILE), "[]").unwrap();
        // posts.json missing

        assert!(MemoryStorage::load(dir.path()).is_err());
    }

    #[test]
    fn test_load_fails_on_malformed_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(USERS_FILE), "[]").unwrap();
        std::fs::write(dir.path().join(POSTS_FILE), "{ not json").unwrap();

        assert!(MemoryStorage::load(dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_ids_are_sequential_strings() {
        let (_dir, storage) = seed_empty();

        assert_eq!(create_user(&storage, "first").await.id, "1");
        assert_eq!(create_user(&storage, "second").await.id, "2");

        let owner = storage.user_by_username("first").await.unwrap();
        let post = storage
            .create_post(
                &owner.id,
                NewPost {
                    title: "Hi".to_string(),
                    content: "Body".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(post.id, "1");
        assert!(post.comments_enabled);
    }

    #[tokio::test]
    async fn test_comment_ids_are_per_post() {
        let (_dir, storage) = seed_empty();
        let owner = create_user(&storage, "owner").await;

        for _ in 0..2 {
            storage
                .create_post(
                    &owner.id,
                    NewPost {
                        title: "Hi".to_string(),
                        content: "Body".to_string(),
                    },
                )
                .await
                .unwrap();
        }

        let first = storage
            .add_comment(
                &owner.id,
                NewComment {
                    post_id: "2".to_string(),
                    parent_id: None,
                    content: "hello".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(first.id, "1");
        assert_eq!(first.post_id, "2");
    }

    #[tokio::test]
    async fn test_unknown_post_is_none_but_unknown_user_is_not_found() {
        let (_dir, storage) = seed_empty();

        assert!(storage.post("99").await.unwrap().is_none());
        assert!(matches!(
            storage.user_by_id("99").await,
            Err(ForumError::NotFound(_))
        ));
        assert!(matches!(
            storage.comments("99", None, None).await,
            Err(ForumError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_posts_pagination() {
        let (_dir, storage) = seed_empty();
        let owner = create_user(&storage, "owner").await;

        for i in 0..5 {
            storage
                .create_post(
                    &owner.id,
                    NewPost {
                        title: format!("post {}", i),
                        content: "Body".to_string(),
                    },
                )
                .await
                .unwrap();
        }

        let page = storage.posts(Some(2), Some(1)).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "2");
        assert_eq!(page[1].id, "3");

        let all = storage.posts(None, None).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_mutations_survive_reload() {
        let (dir, storage) = seed_empty();
        let owner = create_user(&storage, "owner").await;
        let post = storage
            .create_post(
                &owner.id,
                NewPost {
                    title: "Hi".to_string(),
                    content: "Body".to_string(),
                },
            )
            .await
            .unwrap();
        storage
            .add_comment(
                &owner.id,
                NewComment {
                    post_id: post.id.clone(),
                    parent_id: None,
                    content: "hello".to_string(),
                },
            )
            .await
            .unwrap();
        storage
            .update_post(UpdatePostInput {
                post_id: post.id.clone(),
                enable_comments: false,
            })
            .await
            .unwrap();

        let reloaded = MemoryStorage::load(dir.path()).expect("should reload");
        let user = reloaded.user_by_username("owner").await.unwrap();
        assert_eq!(user.id, owner.id);

        let post = reloaded.post(&post.id).await.unwrap().expect("post exists");
        assert!(!post.comments_enabled);
        assert_eq!(post.comments.len(), 1);
        assert_eq!(post.comments[0].content, "hello");
    }
}
