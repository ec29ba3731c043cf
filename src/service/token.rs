//! Signed bearer tokens.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::model::UserId;

/// Token issuance or validation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token could not be signed.
    #[error("could not generate token: {0}")]
    Issue(String),
    /// The token is malformed, forged or expired.
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Issues and validates subject-bearing tokens.
pub trait TokenService: Send + Sync {
    /// Issue a token for `subject`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Issue`] if signing fails.
    fn issue(&self, subject: UserId) -> Result<String, TokenError>;

    /// Validate `token` and return its subject.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for any token that does not verify.
    fn validate(&self, token: &str) -> Result<UserId, TokenError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: UserId,
    exp: i64,
}

/// HS256 JWTs with a fixed lifetime.
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtService {
    /// Sign with `secret`; tokens expire `ttl` after issue.
    #[must_use]
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

impl TokenService for JwtService {
    fn issue(&self, subject: UserId) -> Result<String, TokenError> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: subject,
            exp: Utc::now().timestamp().saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Issue(e.to_string()))
    }

    fn validate(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        Ok(data.claims.sub)
    }
}
