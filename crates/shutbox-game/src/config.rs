//! Rules configuration and creation limits.

use serde::{Deserialize, Serialize};

/// Shortest allowed session name, counted in characters after trimming.
pub const MIN_NAME_LEN: usize = 3;

/// Longest allowed session name, counted in characters after trimming.
pub const MAX_NAME_LEN: usize = 100;

/// Box sizes a session may be created with.
pub const ALLOWED_TILE_COUNTS: [u8; 2] = [10, 12];

/// Upper bound for a session's `max_players`.
pub const MAX_PLAYERS_LIMIT: u8 = 12;

// ---------------------------------------------------------------------------
// PassPolicy
// ---------------------------------------------------------------------------

/// When a player is allowed to pass (drop out of the round).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassPolicy {
    /// A player may pass at any time during flipping, even if a legal
    /// flip exists.
    #[default]
    Voluntary,
    /// A player may pass only when no subset of their tiles matches the
    /// dice total.
    WhenBlocked,
}

// ---------------------------------------------------------------------------
// TieBreak
// ---------------------------------------------------------------------------

/// How the winner is chosen when several players share the lowest total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The tied player who joined the session first wins.
    #[default]
    JoinOrder,
    /// The tied player with the lowest score in the final round wins;
    /// join order settles any remaining tie.
    LastRoundScore,
}

// ---------------------------------------------------------------------------
// RulesConfig
// ---------------------------------------------------------------------------

/// Game rules shared by every session a coordinator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub pass_policy: PassPolicy,
    pub tie_break: TieBreak,
    /// The game ends once any player's cumulative score reaches this.
    pub score_limit: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            pass_policy: PassPolicy::Voluntary,
            tie_break: TieBreak::JoinOrder,
            score_limit: 100,
        }
    }
}
