//! Email/password authentication against the Firebase Identity Toolkit REST API.

use chrono::{Duration, Utc};
use futures_util::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info, warn};

use super::auth::{AuthError, AuthProvider, AuthUser, SessionCallback, TokenSource};
use super::store::Subscription;
use super::HTTP_CLIENT;
use crate::db::{clear_session, load_session, save_session, PersistedSession};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

fn expiry_from(expires_in: Option<&str>) -> Option<chrono::DateTime<Utc>> {
    let seconds = expires_in.and_then(|s| s.parse::<i64>().ok())?;
    Some(Utc::now() + Duration::seconds(seconds))
}

async fn provider_error(response: reqwest::Response) -> AuthError {
    let status = response.status();
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => AuthError::from_provider_message(&envelope.error.message),
        Err(_) => AuthError::Provider(format!("HTTP {}", status.as_u16())),
    }
}

#[derive(Default)]
struct AuthState {
    user: Option<AuthUser>,
    listeners: BTreeMap<u64, SessionCallback>,
    next_listener: u64,
    restored: bool,
}

pub struct FirebaseAuth {
    api_key: String,
    state: Rc<RefCell<AuthState>>,
    refreshing: Cell<bool>,
}

impl FirebaseAuth {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            state: Rc::new(RefCell::new(AuthState::default())),
            refreshing: Cell::new(false),
        }
    }

    fn set_user(&self, user: Option<AuthUser>) {
        match &user {
            Some(user) => {
                let persisted = PersistedSession {
                    uid: user.uid.clone(),
                    email: user.email.clone(),
                    refresh_token: user.refresh_token.clone(),
                };
                if let Err(_e) = save_session(&persisted) {
                    warn!("Failed to persist session");
                }
            }
            None => clear_session(),
        }
        self.state.borrow_mut().user = user;
        self.notify();
    }

    fn notify(&self) {
        let (user, listeners): (Option<AuthUser>, Vec<SessionCallback>) = {
            let state = self.state.borrow();
            (state.user.clone(), state.listeners.values().cloned().collect())
        };
        for listener in listeners {
            listener(user.clone());
        }
    }

    async fn password_call(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let url = format!("{IDENTITY_TOOLKIT_URL}/accounts:{endpoint}?key={}", self.api_key);
        let response = HTTP_CLIENT
            .post(&url)
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let body: PasswordResponse = response.json().await?;
        Ok(AuthUser {
            uid: body.local_id,
            email: body.email,
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: expiry_from(body.expires_in.as_deref()),
        })
    }

    async fn refresh(&self, email: String, refresh_token: String) -> Result<AuthUser, AuthError> {
        let url = format!("{SECURE_TOKEN_URL}?key={}", self.api_key);
        let response = HTTP_CLIENT
            .post(&url)
            .json(&RefreshRequest {
                grant_type: "refresh_token",
                refresh_token: &refresh_token,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let body: RefreshResponse = response.json().await?;
        Ok(AuthUser {
            uid: body.user_id,
            email,
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: expiry_from(body.expires_in.as_deref()),
        })
    }

    async fn fresh_token(&self) -> Option<String> {
        let user = self.state.borrow().user.clone()?;
        if !user.token_expires_soon(Utc::now()) || self.refreshing.get() {
            return Some(user.id_token);
        }

        self.refreshing.set(true);
        let refreshed = self.refresh(user.email.clone(), user.refresh_token.clone()).await;
        self.refreshing.set(false);

        match refreshed {
            Ok(user) => {
                debug!(uid = %user.uid, "Refreshed ID token");
                let token = user.id_token.clone();
                // Token rotation is not a session change; skip listeners.
                self.state.borrow_mut().user = Some(user);
                Some(token)
            }
            Err(err) => {
                warn!(error = %err, "ID token refresh failed, signing out");
                self.set_user(None);
                None
            }
        }
    }
}

impl AuthProvider for FirebaseAuth {
    fn sign_in(
        &self,
        email: String,
        password: String,
    ) -> LocalBoxFuture<'_, Result<AuthUser, AuthError>> {
        async move {
            let user = self
                .password_call("signInWithPassword", &email, &password)
                .await?;
            info!(uid = %user.uid, "Signed in");
            self.set_user(Some(user.clone()));
            Ok(user)
        }
        .boxed_local()
    }

    fn sign_up(
        &self,
        email: String,
        password: String,
    ) -> LocalBoxFuture<'_, Result<AuthUser, AuthError>> {
        async move {
            let user = self.password_call("signUp", &email, &password).await?;
            info!(uid = %user.uid, "Account created");
            self.set_user(Some(user.clone()));
            Ok(user)
        }
        .boxed_local()
    }

    fn sign_out(&self) -> LocalBoxFuture<'_, Result<(), AuthError>> {
        async move {
            info!("Signed out");
            self.set_user(None);
            Ok(())
        }
        .boxed_local()
    }

    fn restore_session(&self) -> LocalBoxFuture<'_, ()> {
        async move {
            if self.state.borrow().restored {
                return;
            }

            let restored = match load_session() {
                Some(saved) => match self.refresh(saved.email.clone(), saved.refresh_token).await {
                    Ok(user) => {
                        info!(uid = %user.uid, "Restored session");
                        Some(user)
                    }
                    Err(err) => {
                        warn!(error = %err, "Could not restore saved session");
                        None
                    }
                },
                None => None,
            };

            self.state.borrow_mut().restored = true;
            self.set_user(restored);
        }
        .boxed_local()
    }

    fn on_session_change(&self, callback: SessionCallback) -> Subscription {
        let (id, initial) = {
            let mut state = self.state.borrow_mut();
            state.next_listener += 1;
            let id = state.next_listener;
            state.listeners.insert(id, callback.clone());
            (id, state.restored.then(|| state.user.clone()))
        };
        if let Some(user) = initial {
            callback(user);
        }

        let weak = Rc::downgrade(&self.state);
        Subscription::new(Rc::new(Cell::new(true)), move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().listeners.remove(&id);
            }
        })
    }
}

impl TokenSource for FirebaseAuth {
    fn id_token(&self) -> LocalBoxFuture<'_, Option<String>> {
        self.fresh_token().boxed_local()
    }
}
