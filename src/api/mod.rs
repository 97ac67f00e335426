//! Remote service surface: the document store, the auth provider, and the
//! data model stored in them.

pub mod auth;
pub mod firebase;
pub mod firestore;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod path;
pub mod store;
pub mod value;

use once_cell::sync::Lazy;
use std::rc::Rc;

pub use auth::{AuthError, AuthProvider, AuthUser};
pub use models::*;
pub use store::{DocumentStore, StoreError};

use crate::config::AppConfig;
use firebase::FirebaseAuth;
use firestore::FirestoreStore;

pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Handles to the hosted services, shared through the component tree.
#[derive(Clone)]
pub struct Backend {
    pub store: Rc<dyn DocumentStore>,
    pub auth: Rc<dyn AuthProvider>,
}

impl Backend {
    pub fn connect(config: &AppConfig) -> Self {
        let auth = Rc::new(FirebaseAuth::new(config.api_key.clone()));
        let store = FirestoreStore::new(
            config.project_id.clone(),
            config.poll_interval_ms,
            auth.clone(),
        );
        Self {
            store: Rc::new(store),
            auth,
        }
    }
}

impl PartialEq for Backend {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store) && Rc::ptr_eq(&self.auth, &other.auth)
    }
}
