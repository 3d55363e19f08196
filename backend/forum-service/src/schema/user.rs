//! User schema and resolvers

use std::sync::Arc;

use async_graphql::{ComplexObject, Context, Object, Result as GraphQLResult, SimpleObject};

use crate::models;
use crate::storage::Storage;

use super::content::Post;

/// Public view of a user; the password hash never crosses the API.
#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct User {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<models::User> for User {
    fn from(user: models::User) -> Self {
        User {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[ComplexObject]
impl User {
    /// Posts owned by this user
    async fn posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<Post>> {
        let storage = ctx.data::<Arc<dyn Storage>>()?;
        let posts = storage.posts_by_user(&self.id).await?;
        Ok(posts.into_iter().map(Post::from).collect())
    }
}

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    async fn users(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<User>> {
        let storage = ctx.data::<Arc<dyn Storage>>()?;
        let users = storage.users().await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn user(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<User> {
        let storage = ctx.data::<Arc<dyn Storage>>()?;
        Ok(storage.user_by_id(&id).await?.into())
    }
}
