//! Post and comment schema and resolvers

use std::sync::Arc;

use async_graphql::{ComplexObject, Context, Object, Result as GraphQLResult, SimpleObject};

use crate::domain::Domain;
use crate::middleware::CurrentUser;
use crate::models;
use crate::storage::Storage;

use super::user::User;

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub comments_enabled: bool,
    #[graphql(skip)]
    pub user_id: String,
}

impl From<models::Post> for Post {
    fn from(post: models::Post) -> Self {
        Post {
            id: post.id,
            title: post.title,
            content: post.content,
            comments_enabled: post.comments_enabled,
            user_id: post.user_id,
        }
    }
}

#[ComplexObject]
impl Post {
    /// Owner of the post
    async fn user(&self, ctx: &Context<'_>) -> GraphQLResult<User> {
        let storage = ctx.data::<Arc<dyn Storage>>()?;
        Ok(storage.user_by_id(&self.user_id).await?.into())
    }

    /// Comments on the post, oldest first
    async fn comments(
        &self,
        ctx: &Context<'_>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> GraphQLResult<Vec<Comment>> {
        let storage = ctx.data::<Arc<dyn Storage>>()?;
        let comments = storage.comments(&self.id, limit, offset).await?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub content: String,
    #[graphql(skip)]
    pub user_id: String,
}

impl From<models::Comment> for Comment {
    fn from(comment: models::Comment) -> Self {
        Comment {
            id: comment.id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            content: comment.content,
            user_id: comment.user_id,
        }
    }
}

#[ComplexObject]
impl Comment {
    /// Author of the comment
    async fn user(&self, ctx: &Context<'_>) -> GraphQLResult<User> {
        let storage = ctx.data::<Arc<dyn Storage>>()?;
        Ok(storage.user_by_id(&self.user_id).await?.into())
    }
}

/// The identity resolved for this request, if any. Actions decide
/// themselves whether to require one.
fn current_user<'a>(ctx: &'a Context<'_>) -> Option<&'a models::User> {
    ctx.data_opt::<CurrentUser>().map(|current| &current.0)
}

#[derive(Default)]
pub struct ContentQuery;

#[Object]
impl ContentQuery {
    async fn posts(
        &self,
        ctx: &Context<'_>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> GraphQLResult<Vec<Post>> {
        let storage = ctx.data::<Arc<dyn Storage>>()?;
        let posts = storage.posts(limit, offset).await?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    async fn post(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<Option<Post>> {
        let storage = ctx.data::<Arc<dyn Storage>>()?;
        Ok(storage.post(&id).await?.map(Post::from))
    }

    async fn comments(
        &self,
        ctx: &Context<'_>,
        post_id: String,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> GraphQLResult<Vec<Comment>> {
        let storage = ctx.data::<Arc<dyn Storage>>()?;
        let comments = storage.comments(&post_id, limit, offset).await?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }
}

#[derive(Default)]
pub struct ContentMutation;

#[Object]
impl ContentMutation {
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        title: String,
        content: String,
    ) -> GraphQLResult<Post> {
        let domain = ctx.data::<Arc<Domain>>()?;
        let post = domain
            .create_post(current_user(ctx), models::NewPost { title, content })
            .await?;
        Ok(post.into())
    }

    async fn update_post(
        &self,
        ctx: &Context<'_>,
        post_id: String,
        enable_comments: bool,
    ) -> GraphQLResult<Post> {
        let domain = ctx.data::<Arc<Domain>>()?;
        let post = domain
            .update_post(
                current_user(ctx),
                models::UpdatePostInput {
                    post_id,
                    enable_comments,
                },
            )
            .await?;
        Ok(post.into())
    }

    async fn add_comment(
        &self,
        ctx: &Context<'_>,
        post_id: String,
        content: String,
        parent_id: Option<String>,
    ) -> GraphQLResult<Comment> {
        let domain = ctx.data::<Arc<Domain>>()?;
        let comment = domain
            .add_comment(
                current_user(ctx),
                models::NewComment {
                    post_id,
                    parent_id,
                    content,
                },
            )
            .await?;
        Ok(comment.into())
    }
}
