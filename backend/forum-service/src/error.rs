/// Error types for the forum service
///
/// Each variant carries the stable message a client is allowed to see;
/// database and internal failures keep their detail for server logs only.
use thiserror::Error;

/// Result type for forum-service operations
pub type Result<T> = std::result::Result<T, ForumError>;

#[derive(Debug, Error)]
pub enum ForumError {
    /// Same error for unknown username and wrong password, so the login
    /// endpoint cannot be used to enumerate usernames.
    #[error("invalid username or password")]
    BadCredentials,

    #[error("username is already in use")]
    UsernameTaken,

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("unauthorized")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("comments disabled for this post")]
    CommentsDisabled,

    #[error("too big comment")]
    ContentTooLarge,

    #[error("comments already enabled")]
    CommentsAlreadyEnabled,

    #[error("comments already disabled")]
    CommentsAlreadyDisabled,

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ForumError {
    /// Not-found error for a post id, with the message clients rely on.
    pub fn post_not_found() -> Self {
        ForumError::NotFound("post with this id does not exist".to_string())
    }

    /// The message a client is allowed to see for this error.
    pub fn client_message(&self) -> String {
        match self {
            ForumError::Database(_) | ForumError::Internal(_) => {
                "something went wrong".to_string()
            }
            other => other.to_string(),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, ForumError::Database(_) | ForumError::Internal(_))
    }
}

// Conversions from external error types
impl From<sqlx::Error> for ForumError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("database error: {}", err);
        ForumError::Database(err.to_string())
    }
}

impl From<auth_core::AuthError> for ForumError {
    fn from(err: auth_core::AuthError) -> Self {
        ForumError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ForumError {
    fn from(err: validator::ValidationErrors) -> Self {
        ForumError::Validation(err.to_string())
    }
}

impl From<ForumError> for async_graphql::Error {
    fn from(err: ForumError) -> Self {
        if err.is_internal() {
            tracing::error!("internal error reached the API boundary: {}", err);
        }
        async_graphql::Error::new(err.client_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_detail_is_sanitized_for_clients() {
        let err = ForumError::Internal("signing key unavailable".to_string());
        assert_eq!(err.client_message(), "something went wrong");

        let err = ForumError::Database("connection refused".to_string());
        assert_eq!(err.client_message(), "something went wrong");
    }

    #[test]
    fn test_domain_errors_keep_their_stable_messages() {
        assert_eq!(
            ForumError::BadCredentials.client_message(),
            "invalid username or password"
        );
        assert_eq!(
            ForumError::post_not_found().client_message(),
            "post with this id does not exist"
        );
        assert_eq!(
            ForumError::CommentsDisabled.client_message(),
            "comments disabled for this post"
        );
    }
}
