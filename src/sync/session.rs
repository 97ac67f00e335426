use chrono::Utc;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, warn};

use crate::api::auth::{AuthError, AuthProvider, AuthUser};
use crate::api::store::{DocumentStore, Subscription};
use crate::api::{path, DirectoryUser};
use crate::forms::Credentials;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub uid: String,
    pub email: String,
}

impl From<&AuthUser> for SessionUser {
    fn from(user: &AuthUser) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<SessionUser>,
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Projects the auth provider's notifications onto a [`SessionState`].
///
/// `loading` stays true until the provider's first delivery. Dropping the
/// observer unregisters it.
pub struct SessionObserver {
    state: Rc<RefCell<SessionState>>,
    _registration: Subscription,
}

impl SessionObserver {
    pub fn attach(auth: &dyn AuthProvider, on_change: impl Fn(&SessionState) + 'static) -> Self {
        let state = Rc::new(RefCell::new(SessionState::default()));
        let shared = state.clone();
        let registration = auth.on_session_change(Rc::new(move |user: Option<AuthUser>| {
            let next = SessionState {
                user: user.as_ref().map(SessionUser::from),
                loading: false,
            };
            if *shared.borrow() == next {
                return;
            }
            *shared.borrow_mut() = next.clone();
            on_change(&next);
        }));

        Self {
            state,
            _registration: registration,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }
}

/// Signs up and writes the user's directory entry so others can add them as a
/// contributor. A failed directory write is logged; the account still exists.
pub async fn create_account(
    auth: &dyn AuthProvider,
    store: &dyn DocumentStore,
    credentials: Credentials,
) -> Result<SessionUser, AuthError> {
    let user = auth
        .sign_up(credentials.email.clone(), credentials.password)
        .await?;

    let entry = DirectoryUser {
        uid: user.uid.clone(),
        email: user.email.clone(),
        name: credentials.name.unwrap_or_default(),
    };
    match store.set(path::user(&user.uid), entry.into_fields(Utc::now())).await {
        Ok(()) => info!(uid = %user.uid, "Registered user in directory"),
        Err(err) => warn!(uid = %user.uid, error = %err, "Failed to write directory entry"),
    }

    Ok(SessionUser::from(&user))
}

pub async fn sign_in(
    auth: &dyn AuthProvider,
    credentials: Credentials,
) -> Result<SessionUser, AuthError> {
    let user = auth.sign_in(credentials.email, credentials.password).await?;
    Ok(SessionUser::from(&user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::{MemoryAuth, MemoryStore};
    use std::cell::Cell;

    fn credentials(email: &str) -> Credentials {
        Credentials {
            name: Some("Ann".to_string()),
            email: email.to_string(),
            password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn loading_clears_on_first_delivery() {
        let auth = MemoryAuth::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let observer = SessionObserver::attach(&auth, move |state| sink.borrow_mut().push(state.clone()));

        assert!(observer.state().loading);
        auth.restore_session().await;

        let state = observer.state();
        assert!(!state.loading);
        assert_eq!(state.user, None);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[tokio::test]
    async fn sign_up_registers_directory_entry_and_updates_session() {
        let auth = MemoryAuth::new();
        let store = MemoryStore::new();
        auth.restore_session().await;
        let observer = SessionObserver::attach(&auth, |_| {});

        let user = create_account(&auth, &store, credentials("ann@x.com")).await.unwrap();

        assert_eq!(observer.state().user, Some(user.clone()));
        let entry = store.document(&path::user(&user.uid)).unwrap();
        assert_eq!(entry.str_field("email"), Some("ann@x.com"));
        assert_eq!(entry.str_field("name"), Some("Ann"));
    }

    #[tokio::test]
    async fn sign_out_clears_user() {
        let auth = MemoryAuth::new();
        let store = MemoryStore::new();
        auth.restore_session().await;
        create_account(&auth, &store, credentials("ann@x.com")).await.unwrap();
        let observer = SessionObserver::attach(&auth, |_| {});
        assert!(observer.state().user.is_some());

        auth.sign_out().await.unwrap();
        assert_eq!(observer.state().user, None);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = MemoryAuth::new();
        let store = MemoryStore::new();
        create_account(&auth, &store, credentials("ann@x.com")).await.unwrap();

        let mut bad = credentials("ann@x.com");
        bad.password = "nope".to_string();
        assert_eq!(sign_in(&auth, bad).await, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn dropped_observer_stops_receiving() {
        let auth = MemoryAuth::new();
        let store = MemoryStore::new();
        auth.restore_session().await;
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let observer = SessionObserver::attach(&auth, move |_| counter.set(counter.get() + 1));
        assert_eq!(calls.get(), 1);
        drop(observer);

        create_account(&auth, &store, credentials("ann@x.com")).await.unwrap();
        assert_eq!(calls.get(), 1);
    }
}
