//! Client-side state kept in step with the document store: the session, the
//! playlist list, one playlist's live mirrors, and playback.

pub mod collection;
pub mod detail;
pub mod sequencer;
pub mod session;
pub mod subscription;

use thiserror::Error;

use crate::api::StoreError;

pub use collection::PlaylistCollection;
pub use detail::PlaylistDetail;
pub use sequencer::{MediaElement, Sequencer};
pub use session::{SessionObserver, SessionState, SessionUser};
pub use subscription::{PlaylistEvent, PlaylistSubscription};

/// Why a user-initiated write did not happen.
#[derive(Debug, Error)]
pub enum MutationError {
    /// Rejected before any remote call.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Something went wrong: {0}")]
    Remote(#[from] StoreError),
}

impl MutationError {
    pub fn is_validation(&self) -> bool {
        matches!(self, MutationError::Validation(_))
    }
}
