/// JWT bearer token issuance and resolution using HS256
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::AuthError;

const TOKEN_VALIDITY_DAYS: i64 = 7;

/// Claims carried by a forum access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

/// An issued bearer token plus its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and resolves bearer tokens signed with a process-wide secret.
///
/// Constructed once from configuration and shared by cloning; there is no
/// ambient key lookup at call time, which keeps token behavior deterministic
/// under injected test secrets.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl TokenService {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
        }
    }

    /// Issue a signed token for `user_id`, valid for seven days.
    pub fn issue(&self, user_id: &str) -> Result<AuthToken, AuthError> {
        let now = Utc::now();
        let expires_at = now + Duration::days(TOKEN_VALIDITY_DAYS);

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(AuthToken {
            access_token,
            expires_at,
        })
    }

    /// Resolve a raw token to the user id it was issued for.
    ///
    /// Returns `None` for malformed, expired, or wrong-issuer tokens; callers
    /// treat a missing identity as "proceed unauthenticated", never as an
    /// error.
    pub fn resolve(&self, raw_token: &str) -> Option<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);

        match decode::<Claims>(raw_token, &self.decoding_key, &validation) {
            Ok(data) => Some(data.claims.sub),
            Err(e) => {
                tracing::debug!("token resolution failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret-key", "forum")
    }

    #[test]
    fn test_issue_token_shape() {
        let token = service().issue("1").expect("should issue token");

        assert!(!token.access_token.is_empty());
        // JWT tokens have 3 parts separated by dots
        assert_eq!(token.access_token.matches('.').count(), 2);
        assert!(token.expires_at > Utc::now() + Duration::days(6));
    }

    #[test]
    fn test_issue_and_resolve_round_trips_subject() {
        let tokens = service();
        let token = tokens.issue("42").expect("should issue token");

        assert_eq!(tokens.resolve(&token.access_token).as_deref(), Some("42"));
    }

    #[test]
    fn test_resolve_malformed_token_is_none() {
        assert_eq!(service().resolve("not.a.token"), None);
        assert_eq!(service().resolve(""), None);
    }

    #[test]
    fn test_resolve_with_wrong_secret_is_none() {
        let token = service().issue("1").expect("should issue token");
        let other = TokenService::new("another-secret", "forum");

        assert_eq!(other.resolve(&token.access_token), None);
    }

    #[test]
    fn test_resolve_with_wrong_issuer_is_none() {
        let token = service().issue("1").expect("should issue token");
        let other = TokenService::new("test-secret-key", "not-forum");

        assert_eq!(other.resolve(&token.access_token), None);
    }

    #[test]
    fn test_resolve_expired_token_is_none() {
        let tokens = service();
        let now = Utc::now();
        // Expired well past the default validation leeway
        let claims = Claims {
            sub: "1".to_string(),
            iat: (now - Duration::hours(3)).timestamp(),
            exp: (now - Duration::hours(2)).timestamp(),
            iss: "forum".to_string(),
        };
        let raw = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .expect("should encode");

        assert_eq!(tokens.resolve(&raw), None);
    }
}
