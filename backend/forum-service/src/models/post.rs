use serde::{Deserialize, Serialize};

/// Post model
///
/// Comments are embedded so the in-memory engine can snapshot a post
/// together with its thread; the relational engine leaves the vector empty
/// and serves comments from their own table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub comments_enabled: bool,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Comment model - attributed to a user, optionally threaded under a parent
/// comment of the same post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub user_id: String,
    pub content: String,
}

/// Fields for a new post; the owner is the authenticated caller.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

/// Comments-enabled transition request for a post.
#[derive(Debug, Clone)]
pub struct UpdatePostInput {
    pub post_id: String,
    pub enable_comments: bool,
}

/// Fields for a new comment; the author is the authenticated caller.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: String,
    pub parent_id: Option<String>,
    pub content: String,
}
