//! Player requests and the single entry point that routes them.

use serde::{Deserialize, Serialize};
use shutbox_protocol::{PlayerId, UserId};

use crate::{DiceSource, GameError, RulesConfig, Session};

/// One mutating request against a session, made by some user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Join a waiting session. The caller allocates the new player's id.
    Join { player_id: PlayerId },
    Leave,
    Start,
    Roll,
    Flip { tiles: Vec<u8> },
    Pass,
    AdvanceRound,
}

impl Action {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave => "leave",
            Self::Start => "start",
            Self::Roll => "roll",
            Self::Flip { .. } => "flip",
            Self::Pass => "pass",
            Self::AdvanceRound => "advance_round",
        }
    }
}

/// What became of the session after an accepted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The session continues with its new state.
    Updated,
    /// The creator left a waiting session; it no longer exists.
    Disbanded,
}

impl Session {
    /// Applies one action by `actor`.
    ///
    /// On `Err` nothing has changed. Round and game end are evaluated
    /// inside the same call, so one accepted action is one complete
    /// transition.
    pub fn apply<D: DiceSource + ?Sized>(
        &mut self,
        actor: UserId,
        action: Action,
        dice: &mut D,
        rules: &RulesConfig,
    ) -> Result<Outcome, GameError> {
        match action {
            Action::Join { player_id } => self.join(actor, player_id)?,
            Action::Leave => return self.leave(actor),
            Action::Start => self.start(actor)?,
            Action::Roll => self.roll(actor, dice)?,
            Action::Flip { tiles } => self.flip(actor, &tiles, rules)?,
            Action::Pass => self.pass(actor, rules)?,
            Action::AdvanceRound => self.advance_round(actor)?,
        }
        Ok(Outcome::Updated)
    }
}
