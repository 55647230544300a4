//! Session lifecycle: creation, membership, and starting the game.

use serde::{Deserialize, Serialize};
use shutbox_protocol::{PlayerId, SessionId, UserId};

use crate::{
    ALLOWED_TILE_COUNTS, GameError, MAX_NAME_LEN, MAX_PLAYERS_LIMIT, MIN_NAME_LEN, Outcome, Player,
    RoundPhase, Session, SessionStatus,
};

/// Parameters for creating a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSession {
    pub name: String,
    pub max_tiles: u8,
    pub max_players: u8,
}

impl NewSession {
    /// Checks the parameters and returns the trimmed name.
    fn validate(&self) -> Result<&str, GameError> {
        let name = self.name.trim();
        let len = name.chars().count();
        if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
            return Err(GameError::InvalidName {
                len,
                min: MIN_NAME_LEN,
                max: MAX_NAME_LEN,
            });
        }
        if !ALLOWED_TILE_COUNTS.contains(&self.max_tiles) {
            return Err(GameError::InvalidTileCount(self.max_tiles));
        }
        if !(1..=MAX_PLAYERS_LIMIT).contains(&self.max_players) {
            return Err(GameError::InvalidPlayerLimit(self.max_players));
        }
        Ok(name)
    }
}

impl Session {
    /// Creates a session in `Waiting` with the creator as its first player.
    pub fn create(
        id: SessionId,
        params: &NewSession,
        creator: UserId,
        creator_player: PlayerId,
    ) -> Result<Self, GameError> {
        let name = params.validate()?;
        Ok(Self {
            id,
            name: name.to_owned(),
            max_tiles: params.max_tiles,
            max_players: params.max_players,
            created_by: creator,
            status: SessionStatus::Waiting,
            round_phase: RoundPhase::Waiting,
            current_round: 0,
            dice1: 0,
            dice2: 0,
            winner_id: None,
            players: vec![Player::new(creator_player, id, creator, params.max_tiles)],
        })
    }

    /// Adds `user` as a new player with a full box.
    pub fn join(&mut self, user: UserId, player_id: PlayerId) -> Result<(), GameError> {
        self.require_status(SessionStatus::Waiting)?;
        if self.player_by_user(user).is_some() {
            return Err(GameError::AlreadyJoined(user));
        }
        if self.players.len() >= usize::from(self.max_players) {
            return Err(GameError::SessionFull(self.max_players));
        }
        self.players
            .push(Player::new(player_id, self.id, user, self.max_tiles));
        Ok(())
    }

    /// Removes `user` from a waiting session.
    ///
    /// When the creator leaves, the whole session is torn down and
    /// [`Outcome::Disbanded`] is returned; the caller must discard it.
    pub fn leave(&mut self, user: UserId) -> Result<Outcome, GameError> {
        self.require_status(SessionStatus::Waiting)?;
        let index = self.player_index(user)?;
        if self.is_creator(user) {
            self.players.clear();
            return Ok(Outcome::Disbanded);
        }
        self.players.remove(index);
        Ok(Outcome::Updated)
    }

    /// Moves a waiting session into its first round.
    pub fn start(&mut self, user: UserId) -> Result<(), GameError> {
        self.require_creator(user)?;
        self.require_status(SessionStatus::Waiting)?;
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }

        self.status = SessionStatus::Playing;
        self.round_phase = RoundPhase::Rolling;
        self.current_round = 1;
        self.dice1 = 0;
        self.dice2 = 0;
        let max_tiles = self.max_tiles;
        for player in &mut self.players {
            player.reset_for_round(max_tiles);
        }
        Ok(())
    }
}
