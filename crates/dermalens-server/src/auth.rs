//! JWT issuing/validation, password hashing, and the authenticated-user
//! extractor used by every analysis endpoint.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::error::AppError;
use crate::ServerState;

/// JWT claims stored in the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub username: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT token service (HS256).
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_minutes: i64,
}

impl JwtService {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_minutes,
        }
    }

    pub fn generate_token(&self, user_id: &str, username: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: (now + Duration::minutes(self.ttl_minutes)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    /// Extracts the token from an Authorization header value.
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// Hashes a password with argon2 and a fresh salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Verifies a password against a stored argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Current user context extracted from JWT claims.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
        }
    }
}

impl FromRequestParts<Arc<ServerState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServerState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("authentication required".into()))?;

        let token = JwtService::extract_from_header(auth_header)
            .ok_or_else(|| AppError::Unauthorized("invalid authorization header".into()))?;

        match state.jwt.validate_token(token) {
            Ok(claims) => Ok(CurrentUser::from(claims)),
            Err(e) => {
                warn!(uri = %parts.uri, "auth failed: {e}");
                let message = match e {
                    JwtError::ExpiredToken => "token expired",
                    _ => "invalid token",
                };
                Err(AppError::Unauthorized(message.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip() {
        let service = JwtService::new("test-secret", 60);
        let token = service.generate_token("user-1", "ada").unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "ada");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = JwtService::new("test-secret", 60);
        assert!(matches!(
            service.validate_token("not.a.token"),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let service = JwtService::new("test-secret", 60);
        let other = JwtService::new("other-secret", 60);
        let token = other.generate_token("user-1", "ada").unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong-password", &hash));
        assert!(!verify_password("hunter2hunter2", "not-a-hash"));
    }
}
