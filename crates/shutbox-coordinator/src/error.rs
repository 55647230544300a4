//! Error types for the coordination layer.

use shutbox_game::{ErrorKind, GameError};
use shutbox_protocol::SessionId;

use crate::StoreError;

/// Errors returned by [`SessionCoordinator`](crate::SessionCoordinator)
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// The rules engine refused the action. State is unchanged.
    #[error(transparent)]
    Game(#[from] GameError),

    /// No session with this id is registered.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// The session's actor has stopped or its mailbox is closed.
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),

    /// The durable store failed; the transition was not committed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoordinatorError {
    /// Classifies this error into the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Game(err) => err.kind(),
            Self::SessionNotFound(_) => ErrorKind::NotFound,
            Self::Unavailable(_) | Self::Store(_) => ErrorKind::Unavailable,
        }
    }
}
