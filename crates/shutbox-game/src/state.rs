//! Session and player records, and the two state machines' states.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use shutbox_protocol::{PlayerId, SessionId, UserId};

use crate::GameError;
use crate::validator::tile_sum;

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a session.
///
/// Transitions are strictly ordered and never reverse:
///
/// ```text
/// Waiting → Playing → Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Waiting,
    Playing,
    Finished,
}

impl SessionStatus {
    /// Returns `true` if players may still join or leave.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` until a winner has been declared.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Finished)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// RoundPhase
// ---------------------------------------------------------------------------

/// Where the current round stands.
///
/// ```text
///            roll               all acted
/// Rolling ─────────→ Flipping ────────────→ Rolling
///                       │
///                       │ box shut / all out
///                       ▼
///                   RoundEnd ──(advance)──→ Rolling
///                       │
///                       │ score limit reached
///                       ▼
///                   Finished
/// ```
///
/// `Waiting` only exists before the first round starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Waiting,
    Rolling,
    Flipping,
    RoundEnd,
    Finished,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Rolling => write!(f, "rolling"),
            Self::Flipping => write!(f, "flipping"),
            Self::RoundEnd => write!(f, "round_end"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One participant in one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub session_id: SessionId,
    pub user_id: UserId,
    /// Open tiles, a subset of `1..=max_tiles`.
    pub tiles_remaining: BTreeSet<u8>,
    /// Cumulative score across finished rounds. Lower is better.
    pub score: u32,
    /// Score for the current round, fixed when the player passes or the
    /// round resolves.
    pub round_score: u32,
    /// Set once the player passes; stays set until the next round.
    pub is_out: bool,
    /// Set once the player flips or passes after the latest roll.
    pub has_submitted: bool,
}

impl Player {
    pub(crate) fn new(id: PlayerId, session_id: SessionId, user_id: UserId, max_tiles: u8) -> Self {
        Self {
            id,
            session_id,
            user_id,
            tiles_remaining: full_box(max_tiles),
            score: 0,
            round_score: 0,
            is_out: false,
            has_submitted: false,
        }
    }

    /// Returns `true` once the player has no open tiles.
    pub fn has_shut_box(&self) -> bool {
        self.tiles_remaining.is_empty()
    }

    /// Sum of the player's open tiles.
    pub fn tiles_total(&self) -> u32 {
        tile_sum(&self.tiles_remaining)
    }

    /// Restores a full box and clears every per-round flag.
    pub(crate) fn reset_for_round(&mut self, max_tiles: u8) {
        self.tiles_remaining = full_box(max_tiles);
        self.round_score = 0;
        self.is_out = false;
        self.has_submitted = false;
    }
}

pub(crate) fn full_box(max_tiles: u8) -> BTreeSet<u8> {
    (1..=max_tiles).collect()
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The complete state of one game: settings, lifecycle, the current
/// round, and every player in join order.
///
/// This is the unit of exclusive access. The coordinator clones it,
/// applies one transition, persists the clone, and only then swaps it
/// in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub max_tiles: u8,
    pub max_players: u8,
    pub created_by: UserId,
    pub status: SessionStatus,
    pub round_phase: RoundPhase,
    /// 0 before the game starts; 1 for the first round.
    pub current_round: u32,
    /// Die faces of the latest roll; 0 means not rolled this turn.
    pub dice1: u8,
    pub dice2: u8,
    pub winner_id: Option<PlayerId>,
    pub players: Vec<Player>,
}

impl Session {
    /// Sum of the current dice.
    pub fn dice_total(&self) -> u32 {
        u32::from(self.dice1) + u32::from(self.dice2)
    }

    pub fn is_creator(&self, user: UserId) -> bool {
        self.created_by == user
    }

    pub fn player_by_user(&self, user: UserId) -> Option<&Player> {
        self.players.iter().find(|p| p.user_id == user)
    }

    pub fn winner(&self) -> Option<&Player> {
        let winner = self.winner_id?;
        self.players.iter().find(|p| p.id == winner)
    }

    pub(crate) fn player_index(&self, user: UserId) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.user_id == user)
            .ok_or(GameError::PlayerNotFound(user))
    }

    pub(crate) fn require_status(&self, expected: SessionStatus) -> Result<(), GameError> {
        if self.status != expected {
            return Err(GameError::WrongStatus {
                expected,
                actual: self.status,
            });
        }
        Ok(())
    }

    pub(crate) fn require_phase(&self, expected: RoundPhase) -> Result<(), GameError> {
        if self.round_phase != expected {
            return Err(GameError::WrongPhase {
                expected,
                actual: self.round_phase,
            });
        }
        Ok(())
    }

    pub(crate) fn require_creator(&self, user: UserId) -> Result<(), GameError> {
        if !self.is_creator(user) {
            return Err(GameError::NotCreator(user));
        }
        Ok(())
    }
}
