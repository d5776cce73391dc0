use crate::utils::jwt::decode_jwt_claims;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use service_core::error::AppError;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no access token in session")]
    MissingToken,
    #[error("malformed access token: {0}")]
    Malformed(String),
    #[error("access token expired")]
    Expired,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

/// Session storage holding the access token between login and logout.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<Secret<String>>;
}

/// Process-local token store; `set` on login, `clear` on logout.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<Secret<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Secret::new(token.into()));
    }

    pub fn clear(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<Secret<String>> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Caller identity passed explicitly to everything that talks to the API.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    access_token: Secret<String>,
}

impl AuthContext {
    /// The one place a token is turned into an identity.
    ///
    /// A missing token is always an error; callers redirect to login.
    pub fn from_store(store: &dyn TokenStore, now: DateTime<Utc>) -> Result<Self, AuthError> {
        let token = store.access_token().ok_or(AuthError::MissingToken)?;
        Self::from_token(token, now)
    }

    pub fn from_token(token: Secret<String>, now: DateTime<Utc>) -> Result<Self, AuthError> {
        if token.expose_secret().trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let claims = decode_jwt_claims(token.expose_secret())?;

        if claims.is_expired_at(now.timestamp()) {
            tracing::info!("Access token expired");
            return Err(AuthError::Expired);
        }

        let user_id = claims
            .subject()
            .map(str::to_string)
            .ok_or_else(|| AuthError::Malformed("token carries no user id".to_string()))?;

        Ok(Self {
            user_id,
            email: claims.email,
            role: claims.role,
            access_token: token,
        })
    }

    pub fn access_token(&self) -> &Secret<String> {
        &self.access_token
    }

    pub fn bearer(&self) -> &str {
        self.access_token.expose_secret()
    }
}
