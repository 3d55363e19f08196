use tracing::error;
use validator::Validate;

use auth_core::{hash_password, verify_password};

use crate::error::{ForumError, Result};
use crate::models::{AuthResponse, LoginInput, NewUser, RegisterInput};

use super::Domain;

impl Domain {
    /// Authenticate a user and issue a bearer token.
    ///
    /// An unknown username and a wrong password produce the identical
    /// `BadCredentials` error so the endpoint cannot be used to probe for
    /// registered usernames.
    pub async fn login(&self, input: LoginInput) -> Result<AuthResponse> {
        input.validate()?;

        let user = match self.storage.user_by_username(&input.username).await {
            Ok(user) => user,
            Err(ForumError::NotFound(_)) => return Err(ForumError::BadCredentials),
            Err(err) => return Err(err),
        };

        match verify_password(&input.password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => return Err(ForumError::BadCredentials),
            Err(err) => {
                error!("password verification failed for user {}: {}", user.id, err);
                return Err(ForumError::Internal(err.to_string()));
            }
        }

        let token = self.tokens.issue(&user.id).map_err(|err| {
            error!("token issuance failed for user {}: {}", user.id, err);
            ForumError::Internal(err.to_string())
        })?;

        Ok(AuthResponse { token, user })
    }

    /// Create a user account and log it in.
    ///
    /// The username check is optimistic; the unique constraint (or the
    /// write lock, for the in-memory engine) backs it under races. User
    /// creation runs in a scoped transaction committed before the token is
    /// issued, so an issuance failure leaves a registered user behind while
    /// the caller still receives an error.
    pub async fn register(&self, input: RegisterInput) -> Result<AuthResponse> {
        input.validate()?;

        match self.storage.user_by_username(&input.username).await {
            Ok(_) => return Err(ForumError::UsernameTaken),
            Err(ForumError::NotFound(_)) => {}
            Err(err) => return Err(err),
        }

        let password_hash = hash_password(&input.password).map_err(|err| {
            error!("cannot hash password during registration: {}", err);
            ForumError::Internal(err.to_string())
        })?;

        let mut tx = self.storage.begin().await?;

        let user = match tx
            .create_user(NewUser {
                username: input.username,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
            })
            .await
        {
            Ok(user) => user,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!("rollback failed after user creation error: {}", rollback_err);
                }
                return Err(err);
            }
        };

        tx.commit().await.map_err(|err| {
            error!("commit failed during registration: {}", err);
            ForumError::Internal(err.to_string())
        })?;

        let token = self.tokens.issue(&user.id).map_err(|err| {
            error!("token issuance failed after registration commit: {}", err);
            ForumError::Internal(err.to_string())
        })?;

        Ok(AuthResponse { token, user })
    }
}
