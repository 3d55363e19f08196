use auth_core::AuthToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User model - core identity entity
///
/// The id is assigned once by storage and never changes; usernames are
/// unique across all users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to persist a new user; id and timestamps are assigned by
/// storage.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Registration request
#[derive(Debug, Clone, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 2, message = "username must be at least 2 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login request
#[derive(Debug, Clone, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Successful authentication: the issued token plus the user record.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub token: AuthToken,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_register_input() -> RegisterInput {
        RegisterInput {
            username: "alice".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            first_name: "A".to_string(),
            last_name: "Liu".to_string(),
        }
    }

    #[test]
    fn test_valid_register_input_passes() {
        assert!(valid_register_input().validate().is_ok());
    }

    #[test]
    fn test_short_username_is_rejected() {
        let mut input = valid_register_input();
        input.username = "a".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_short_password_is_rejected() {
        let mut input = valid_register_input();
        input.password = "five5".to_string();
        input.confirm_password = "five5".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_mismatched_confirmation_is_rejected() {
        let mut input = valid_register_input();
        input.confirm_password = "secret2".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_empty_login_fields_are_rejected() {
        let input = LoginInput {
            username: String::new(),
            password: "secret1".to_string(),
        };
        assert!(input.validate().is_err());
    }
}
