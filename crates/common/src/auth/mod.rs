//! Authentication and authorization utilities
//!
//! Provides:
//! - Role model for the API (reader / admin)
//! - JWT token generation and validation
//! - Argon2 password hashing
//!
//! Role checks happen at the API layer before a workflow is invoked; the
//! workflows themselves never reach into ambient session state.

use crate::errors::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Reader,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reader" => Some(Role::Reader),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Role at token issue time
    pub role: Role,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl JwtClaims {
    /// Parse the subject back into a user ID
    pub fn user_id(&self) -> Result<i64> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }
}

/// JWT token manager
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager with the given secret
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs: expiration_secs as i64,
        }
    }

    /// Generate a new JWT token
    pub fn generate_token(&self, user_id: i64, role: Role) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiration_secs);

        let claims = JwtClaims {
            sub: user_id.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AppError::Internal {
            message: format!("Failed to generate token: {}", e),
        })
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::InvalidToken,
            })
    }
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal {
            message: format!("Failed to hash password: {}", e),
        })
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

/// Extract a bearer token from an Authorization header value
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("abc.def"), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test_secret", 3600);

        let token = manager.generate_token(42, Role::Admin).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let manager = JwtManager::new("test_secret", 3600);
        let other = JwtManager::new("other_secret", 3600);

        let token = other.generate_token(1, Role::Reader).unwrap();
        assert!(matches!(
            manager.validate_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("reader"), Some(Role::Reader));
        assert_eq!(Role::parse("moderator"), None);
    }
}
