//! Authentication schema and resolvers

use std::sync::Arc;

use async_graphql::{Context, Object, Result as GraphQLResult, SimpleObject};

use crate::domain::Domain;
use crate::models;

use super::user::User;

#[derive(SimpleObject, Clone, Debug)]
pub struct AuthToken {
    pub access_token: String,
    /// RFC 3339 expiry timestamp
    pub expires_at: String,
}

#[derive(SimpleObject, Clone, Debug)]
pub struct AuthPayload {
    pub token: AuthToken,
    pub user: User,
}

impl From<models::AuthResponse> for AuthPayload {
    fn from(response: models::AuthResponse) -> Self {
        AuthPayload {
            token: AuthToken {
                access_token: response.token.access_token,
                expires_at: response.token.expires_at.to_rfc3339(),
            },
            user: response.user.into(),
        }
    }
}

#[derive(Default)]
pub struct AuthMutation;

#[Object]
impl AuthMutation {
    async fn login(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> GraphQLResult<AuthPayload> {
        let domain = ctx.data::<Arc<Domain>>()?;
        let response = domain
            .login(models::LoginInput { username, password })
            .await?;
        Ok(response.into())
    }

    async fn register(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
        confirm_password: String,
        first_name: String,
        last_name: String,
    ) -> GraphQLResult<AuthPayload> {
        let domain = ctx.data::<Arc<Domain>>()?;
        let response = domain
            .register(models::RegisterInput {
                username,
                password,
                confirm_password,
                first_name,
                last_name,
            })
            .await?;
        Ok(response.into())
    }
}
