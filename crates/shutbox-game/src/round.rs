//! The round state machine: rolling, flipping, passing, and turn-end
//! detection.
//!
//! Turn completion is evaluated after every flip or pass, never on a
//! timer, using the state that action just produced.

use shutbox_protocol::UserId;

use crate::validator::{check_selection, feasible, validate};
use crate::{DiceSource, GameError, PassPolicy, Player, RoundPhase, RulesConfig, Session};

impl Session {
    /// Rolls both dice and opens the flipping phase.
    ///
    /// Only the creator rolls. Every player still in the round gets a
    /// fresh turn.
    pub fn roll<D: DiceSource + ?Sized>(
        &mut self,
        user: UserId,
        dice: &mut D,
    ) -> Result<(), GameError> {
        self.require_phase(RoundPhase::Rolling)?;
        self.require_creator(user)?;

        self.dice1 = dice.roll_die();
        self.dice2 = dice.roll_die();
        debug_assert!((1..=6).contains(&self.dice1) && (1..=6).contains(&self.dice2));

        // Out players keep `has_submitted` so that `is_out` implies it.
        for player in self.players.iter_mut().filter(|p| !p.is_out) {
            player.has_submitted = false;
        }
        self.round_phase = RoundPhase::Flipping;

        tracing::debug!(
            session_id = %self.id,
            round = self.current_round,
            dice1 = self.dice1,
            dice2 = self.dice2,
            "dice rolled"
        );
        Ok(())
    }

    /// Shuts the proposed tiles for `user` if they sum to the dice total.
    ///
    /// Emptying the box ends the round for everyone at once.
    pub fn flip(
        &mut self,
        user: UserId,
        proposed: &[u8],
        rules: &RulesConfig,
    ) -> Result<(), GameError> {
        self.require_phase(RoundPhase::Flipping)?;
        let index = self.player_index(user)?;
        ensure_can_act(&self.players[index])?;
        check_selection(proposed, self.max_tiles)?;

        let target = self.dice_total();
        let player = &mut self.players[index];
        if !validate(&player.tiles_remaining, proposed, target) {
            return Err(GameError::IllegalMove {
                proposed: proposed.to_vec(),
                target,
            });
        }

        for tile in proposed {
            player.tiles_remaining.remove(tile);
        }
        player.has_submitted = true;

        if player.has_shut_box() {
            player.round_score = 0;
            tracing::info!(session_id = %self.id, %user, round = self.current_round, "box shut");
        } else {
            tracing::debug!(session_id = %self.id, %user, ?proposed, "tiles flipped");
        }

        self.evaluate_turn(rules);
        Ok(())
    }

    /// Drops `user` out of the round, fixing their round score at the sum
    /// of the tiles they still hold.
    pub fn pass(&mut self, user: UserId, rules: &RulesConfig) -> Result<(), GameError> {
        self.require_phase(RoundPhase::Flipping)?;
        let index = self.player_index(user)?;
        ensure_can_act(&self.players[index])?;

        let target = self.dice_total();
        let player = &mut self.players[index];
        if rules.pass_policy == PassPolicy::WhenBlocked
            && feasible(&player.tiles_remaining, target)
        {
            return Err(GameError::PassRefused { target });
        }

        player.is_out = true;
        player.has_submitted = true;
        player.round_score = player.tiles_total();
        tracing::debug!(
            session_id = %self.id,
            %user,
            round_score = player.round_score,
            "player passed"
        );

        self.evaluate_turn(rules);
        Ok(())
    }

    /// Starts the next round after a round has been scored.
    pub fn advance_round(&mut self, user: UserId) -> Result<(), GameError> {
        self.require_phase(RoundPhase::RoundEnd)?;
        self.require_creator(user)?;

        let max_tiles = self.max_tiles;
        for player in &mut self.players {
            player.reset_for_round(max_tiles);
        }
        self.dice1 = 0;
        self.dice2 = 0;
        self.current_round += 1;
        self.round_phase = RoundPhase::Rolling;

        tracing::info!(session_id = %self.id, round = self.current_round, "round started");
        Ok(())
    }

    /// Decides what follows the action that was just applied:
    /// end the round, return to rolling, or keep waiting for others.
    fn evaluate_turn(&mut self, rules: &RulesConfig) {
        let box_shut = self.players.iter().any(Player::has_shut_box);
        let all_out = self.players.iter().all(|p| p.is_out);
        if box_shut || all_out {
            self.resolve_round(rules);
            return;
        }

        let turn_done = self
            .players
            .iter()
            .filter(|p| !p.is_out)
            .all(|p| p.has_submitted);
        if turn_done {
            for player in self.players.iter_mut().filter(|p| !p.is_out) {
                player.has_submitted = false;
            }
            self.dice1 = 0;
            self.dice2 = 0;
            self.round_phase = RoundPhase::Rolling;
        }
    }
}

fn ensure_can_act(player: &Player) -> Result<(), GameError> {
    if player.is_out {
        return Err(GameError::PlayerOut(player.user_id));
    }
    if player.has_submitted {
        return Err(GameError::AlreadySubmitted(player.user_id));
    }
    Ok(())
}
