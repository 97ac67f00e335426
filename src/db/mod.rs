//! Local persistence for the signed-in session.
//!
//! The browser keeps it in `LocalStorage`; native builds keep it for the life of
//! the process only.

use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use gloo_storage::{errors::StorageError, LocalStorage, Storage};

#[cfg(target_arch = "wasm32")]
const SESSION_KEY: &str = "music_collaborator.session";

/// What survives a page reload. The ID token is not stored; it is re-minted from
/// the refresh token on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub uid: String,
    pub email: String,
    pub refresh_token: String,
}

#[cfg(not(target_arch = "wasm32"))]
static NATIVE_SESSION: once_cell::sync::Lazy<std::sync::Mutex<Option<PersistedSession>>> =
    once_cell::sync::Lazy::new(|| std::sync::Mutex::new(None));

#[cfg(target_arch = "wasm32")]
pub fn save_session(session: &PersistedSession) -> Result<(), StorageError> {
    LocalStorage::set(SESSION_KEY, session)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_session(session: &PersistedSession) -> Result<(), std::convert::Infallible> {
    let mut slot = NATIVE_SESSION.lock().unwrap_or_else(|e| e.into_inner());
    *slot = Some(session.clone());
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn load_session() -> Option<PersistedSession> {
    LocalStorage::get(SESSION_KEY).ok()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_session() -> Option<PersistedSession> {
    NATIVE_SESSION
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

#[cfg(target_arch = "wasm32")]
pub fn clear_session() {
    LocalStorage::delete(SESSION_KEY);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn clear_session() {
    *NATIVE_SESSION.lock().unwrap_or_else(|e| e.into_inner()) = None;
}
