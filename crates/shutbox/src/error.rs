//! Unified error type for Shutbox.

use shutbox_coordinator::{CoordinatorError, StoreError};
use shutbox_game::{ErrorKind, GameError};
use shutbox_protocol::ProtocolError;

/// Top-level error that wraps every crate-specific error.
///
/// Applications using the `shutbox` crate can return this one type and
/// let `?` convert the layer errors.
#[derive(Debug, thiserror::Error)]
pub enum ShutboxError {
    /// Encoding or decoding a snapshot failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rules violation raised by calling the engine directly.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A coordinator operation failed.
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    /// A store call made outside the coordinator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ShutboxError {
    /// Classifies this error into the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Protocol(ProtocolError::Decode(_)) => ErrorKind::Validation,
            Self::Protocol(ProtocolError::Encode(_)) | Self::Store(_) => ErrorKind::Unavailable,
            Self::Game(err) => err.kind(),
            Self::Coordinator(err) => err.kind(),
        }
    }
}
