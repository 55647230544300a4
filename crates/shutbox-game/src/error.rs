//! Error types for the rules engine.

use shutbox_protocol::UserId;

use crate::{RoundPhase, SessionStatus};

/// The four rejection classes a caller can receive.
///
/// Every [`GameError`] maps onto exactly one of these through
/// [`GameError::kind`], so a presentation layer can pick a status code or
/// message style without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed creation or action parameters.
    Validation,
    /// The referenced session or player does not exist.
    NotFound,
    /// The request is well formed but the current phase or role forbids it.
    Conflict,
    /// The proposed tiles are not a legal move for the current dice.
    InvariantViolation,
    /// The session's actor or its store failed. Never produced by the
    /// rules engine itself, only by the layers wrapping it.
    Unavailable,
}

/// Why the engine refused a request.
///
/// None of these are fatal to the session: a rejected request leaves the
/// state exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Session names must be between the configured bounds after trimming.
    #[error("session name must be {min}-{max} characters, got {len}")]
    InvalidName { len: usize, min: usize, max: usize },

    #[error("max tiles must be 10 or 12, got {0}")]
    InvalidTileCount(u8),

    #[error("max players must be between 1 and 12, got {0}")]
    InvalidPlayerLimit(u8),

    /// The tile selection is empty, repeats a value, or names a tile that
    /// cannot exist in this session.
    #[error("malformed tile selection: {0}")]
    MalformedSelection(String),

    /// The acting user has no player record in this session.
    #[error("user {0} is not in this session")]
    PlayerNotFound(UserId),

    #[error("session is full ({0} players)")]
    SessionFull(u8),

    #[error("user {0} has already joined this session")]
    AlreadyJoined(UserId),

    /// Only the session creator may start, roll, or advance rounds.
    #[error("user {0} is not the session creator")]
    NotCreator(UserId),

    #[error("session is {actual}, expected {expected}")]
    WrongStatus {
        expected: SessionStatus,
        actual: SessionStatus,
    },

    #[error("round phase is {actual}, expected {expected}")]
    WrongPhase {
        expected: RoundPhase,
        actual: RoundPhase,
    },

    /// The player already flipped or passed since the last roll.
    #[error("user {0} has already acted this turn")]
    AlreadySubmitted(UserId),

    /// The player passed earlier in this round.
    #[error("user {0} is out for this round")]
    PlayerOut(UserId),

    /// The strict pass policy refuses a pass while a legal flip exists.
    #[error("cannot pass: a move totalling {target} is available")]
    PassRefused { target: u32 },

    /// The tiles are held and well formed but don't make a legal move.
    #[error("tiles {proposed:?} are not a legal move for a roll of {target}")]
    IllegalMove { proposed: Vec<u8>, target: u32 },

    #[error("session has no players")]
    NoPlayers,
}

impl GameError {
    /// Classifies this error into the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName { .. }
            | Self::InvalidTileCount(_)
            | Self::InvalidPlayerLimit(_)
            | Self::MalformedSelection(_) => ErrorKind::Validation,
            Self::PlayerNotFound(_) => ErrorKind::NotFound,
            Self::SessionFull(_)
            | Self::AlreadyJoined(_)
            | Self::NotCreator(_)
            | Self::WrongStatus { .. }
            | Self::WrongPhase { .. }
            | Self::AlreadySubmitted(_)
            | Self::PlayerOut(_)
            | Self::PassRefused { .. }
            | Self::NoPlayers => ErrorKind::Conflict,
            Self::IllegalMove { .. } => ErrorKind::InvariantViolation,
        }
    }
}
