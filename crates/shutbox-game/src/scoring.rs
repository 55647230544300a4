//! Round scoring, game termination, and winner selection.

use shutbox_protocol::PlayerId;

use crate::{Player, RoundPhase, RulesConfig, Session, SessionStatus, TieBreak};

impl Session {
    /// Scores the round that just ended and either finishes the game or
    /// parks it in `RoundEnd` until the creator advances.
    pub(crate) fn resolve_round(&mut self, rules: &RulesConfig) {
        for player in &mut self.players {
            // Passed players fixed their score already; everyone else is
            // charged for what they still hold (0 for a shut box).
            if !player.is_out {
                player.round_score = player.tiles_total();
            }
            player.score += player.round_score;
        }

        let max_score = self.players.iter().map(|p| p.score).max().unwrap_or(0);
        if max_score >= rules.score_limit {
            self.status = SessionStatus::Finished;
            self.round_phase = RoundPhase::Finished;
            self.winner_id = select_winner(&self.players, rules.tie_break);
            tracing::info!(
                session_id = %self.id,
                round = self.current_round,
                max_score,
                winner = ?self.winner_id,
                "game finished"
            );
        } else {
            self.round_phase = RoundPhase::RoundEnd;
            tracing::info!(
                session_id = %self.id,
                round = self.current_round,
                max_score,
                "round ended"
            );
        }
    }

    /// Players ordered from best (lowest cumulative score) to worst.
    pub fn standings(&self) -> Vec<&Player> {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by_key(|p| p.score);
        ranked
    }
}

/// The player with the lowest cumulative score, ties settled by `tie_break`.
///
/// `players` is in join order, and `min_by_key` keeps the first of equal
/// minima, which is what makes `JoinOrder` work.
pub(crate) fn select_winner(players: &[Player], tie_break: TieBreak) -> Option<PlayerId> {
    let best = match tie_break {
        TieBreak::JoinOrder => players.iter().min_by_key(|p| p.score),
        TieBreak::LastRoundScore => players.iter().min_by_key(|p| (p.score, p.round_score)),
    };
    best.map(|p| p.id)
}
