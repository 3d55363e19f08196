/// Shared authentication primitives for the forum backend.
///
/// - `password`: Argon2id password hashing and verification
/// - `token`: JWT bearer token issuance and resolution (HS256)
pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{AuthToken, Claims, TokenService};

use thiserror::Error;

/// Errors surfaced by the credential and token primitives.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}
