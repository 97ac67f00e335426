use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use std::rc::Rc;
use thiserror::Error;

use super::store::Subscription;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailExists,

    #[error("Password should be at least 6 characters")]
    WeakPassword,

    #[error("Too many attempts, try again later")]
    TooManyAttempts,

    #[error("Your session has expired, please log in again")]
    SessionExpired,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Authentication error: {0}")]
    Provider(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Request(err.to_string())
    }
}

impl AuthError {
    /// Maps an Identity Toolkit error message (e.g. `"WEAK_PASSWORD : Password
    /// should be at least 6 characters"`) to a typed error.
    pub fn from_provider_message(message: &str) -> Self {
        let code = message.split(':').next().unwrap_or_default().trim();
        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_EMAIL" | "USER_DISABLED" => AuthError::InvalidCredentials,
            "EMAIL_EXISTS" => AuthError::EmailExists,
            "WEAK_PASSWORD" => AuthError::WeakPassword,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
            "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => {
                AuthError::SessionExpired
            }
            _ => AuthError::Provider(message.to_string()),
        }
    }
}

/// Signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn token_expires_soon(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - chrono::Duration::seconds(60) <= now,
            None => false,
        }
    }
}

pub type SessionCallback = Rc<dyn Fn(Option<AuthUser>)>;

pub trait AuthProvider {
    fn sign_in(&self, email: String, password: String)
        -> LocalBoxFuture<'_, Result<AuthUser, AuthError>>;

    fn sign_up(&self, email: String, password: String)
        -> LocalBoxFuture<'_, Result<AuthUser, AuthError>>;

    fn sign_out(&self) -> LocalBoxFuture<'_, Result<(), AuthError>>;

    /// Resolves any persisted session, then notifies listeners. Listeners
    /// registered before this completes receive nothing until it does.
    fn restore_session(&self) -> LocalBoxFuture<'_, ()>;

    /// Registers `callback` for every session change. Once the session has been
    /// restored, the current user is delivered immediately on registration.
    fn on_session_change(&self, callback: SessionCallback) -> Subscription;
}

/// Source of bearer tokens for store requests.
pub trait TokenSource {
    fn id_token(&self) -> LocalBoxFuture<'_, Option<String>>;
}
