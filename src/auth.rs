use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;

const NOT_LOGGED_IN: &str = "Not logged in. Please log in and try again.";

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: ClaimedUserId,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

/// Issuers encode the user id either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimedUserId {
    Number(i64),
    Text(String),
}

impl ClaimedUserId {
    pub fn parse(&self) -> Option<i64> {
        match self {
            ClaimedUserId::Number(id) => Some(*id),
            ClaimedUserId::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl Claims {
    /// The instant the user's logout time must precede for the session to be live.
    pub fn session_cutoff(&self, skew_secs: i64) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat.checked_add(skew_secs)?, 0)
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Verifies a raw token and returns its claims.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// HS256 verification with a shared secret. Expired tokens are rejected.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Identity attached to a request once its session has been confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// The caller's user id, if the auth middleware resolved one.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Option<i64>);

impl CurrentUser {
    /// Anonymous callers get a 403.
    pub fn require(self) -> Result<i64, ApiError> {
        self.0.ok_or_else(|| ApiError::forbidden(NOT_LOGGED_IN))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(
            parts.extensions.get::<AuthUser>().map(|user| user.user_id),
        ))
    }
}
