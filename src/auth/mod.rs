use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(id: Uuid, role: Role, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            id,
            role,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    MissingToken(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

/// HS256 signing material, built once from config and shared through `AppState`
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    expiry_hours: u64,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("expiry_hours", &self.expiry_hours)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            expiry_hours,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    pub fn issue(&self, id: Uuid, role: Role) -> Result<String, AuthError> {
        self.sign(&Claims::new(id, role, self.expiry_hours))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Checks signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

/// Extract JWT token from Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| AuthError::MissingToken("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MissingToken("Invalid Authorization header format".to_string()))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err(AuthError::MissingToken("Empty JWT token".to_string())),
        None => Err(AuthError::MissingToken(
            "Authorization header must use Bearer token format".to_string(),
        )),
    }
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(password, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn issued_token_verifies_with_same_keys() {
        let keys = JwtKeys::new("test-secret", 1);
        let id = Uuid::new_v4();
        let token = keys.issue(id, Role::Admin).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.id, id);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = JwtKeys::new("one", 1).issue(Uuid::new_v4(), Role::User).unwrap();
        assert!(matches!(
            JwtKeys::new("two", 1).verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JwtKeys::new("test-secret", 1);
        let past = Utc::now() - Duration::hours(3);
        let claims = Claims {
            id: Uuid::new_v4(),
            role: Role::User,
            exp: (past + Duration::hours(1)).timestamp(),
            iat: past.timestamp(),
        };
        let token = keys.sign(&claims).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn bearer_header_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2", 4).unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }
}
