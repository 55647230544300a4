//! Session coordinator: creates sessions, routes actions to their
//! actors, and answers read-only queries from published snapshots.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use shutbox_game::validator::find_move;
use shutbox_game::{
    Action, DiceSource, GameError, NewSession, RoundPhase, SeededDice, Session, SessionStatus,
    ThreadDice,
};
use shutbox_protocol::{PlayerId, SessionId, UserId};
use tokio::sync::RwLock;

use crate::actor::{Committed, spawn_session};
use crate::{CoordinatorConfig, CoordinatorError, SessionHandle, SessionStore};

/// A lightweight listing entry (not the full game state).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub name: String,
    pub status: SessionStatus,
    pub created_by: UserId,
    pub player_count: usize,
    pub max_players: u8,
    pub max_tiles: u8,
}

impl SessionSummary {
    fn of(session: &Session) -> Self {
        Self {
            session_id: session.id,
            name: session.name.clone(),
            status: session.status,
            created_by: session.created_by,
            player_count: session.players.len(),
            max_players: session.max_players,
            max_tiles: session.max_tiles,
        }
    }
}

/// Result of a leave request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The player was removed; here is the session without them.
    Left(Session),
    /// The creator left, so the session and all its players are gone.
    Disbanded,
}

/// Runs every session as its own actor and exposes the game's operations
/// as atomic calls keyed by session id.
///
/// Only unfinished sessions keep a running actor. The commit that ends a
/// game also retires its actor; the finished session stays readable
/// through [`view`](Self::view), served from the store, and any further
/// action is rejected as the actor would have rejected it.
///
/// The coordinator is `Sync`: share it behind an `Arc` between request
/// handlers. The registry lock is only held long enough to look up or
/// insert a handle, never while an actor is working.
pub struct SessionCoordinator<S: SessionStore> {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    store: Arc<S>,
    config: CoordinatorConfig,
    next_session_id: AtomicU64,
    next_player_id: AtomicU64,
}

impl<S: SessionStore> SessionCoordinator<S> {
    pub fn new(store: S, config: CoordinatorConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            store: Arc::new(store),
            config,
            next_session_id: AtomicU64::new(1),
            next_player_id: AtomicU64::new(1),
        }
    }

    /// The store every session actor persists to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a session with the configured dice and joins its creator.
    pub async fn create(
        &self,
        creator: UserId,
        params: NewSession,
    ) -> Result<Session, CoordinatorError> {
        let session_id = self.allocate_session_id();
        let dice: Box<dyn DiceSource> = match self.config.dice_seed {
            Some(seed) => Box::new(SeededDice::new(session_seed(seed, session_id))),
            None => Box::new(ThreadDice),
        };
        self.register(session_id, creator, params, dice).await
    }

    /// Creates a session that rolls from `dice` instead of the configured
    /// source.
    pub async fn create_with_dice(
        &self,
        creator: UserId,
        params: NewSession,
        dice: Box<dyn DiceSource>,
    ) -> Result<Session, CoordinatorError> {
        let session_id = self.allocate_session_id();
        self.register(session_id, creator, params, dice).await
    }

    async fn register(
        &self,
        session_id: SessionId,
        creator: UserId,
        params: NewSession,
        dice: Box<dyn DiceSource>,
    ) -> Result<Session, CoordinatorError> {
        let session = Session::create(session_id, &params, creator, self.allocate_player_id())?;
        self.store.save(&session).await?;

        let handle = self.spawn(session.clone(), dice);
        self.sessions.write().await.insert(session_id, handle);
        tracing::info!(
            %session_id,
            %creator,
            name = %session.name,
            max_tiles = session.max_tiles,
            max_players = session.max_players,
            "session created"
        );
        Ok(session)
    }

    fn spawn(&self, session: Session, dice: Box<dyn DiceSource>) -> SessionHandle {
        spawn_session(
            session,
            dice,
            self.config.rules,
            Arc::clone(&self.store),
            self.config.channel_size,
        )
    }

    /// Adds `user` to a waiting session.
    pub async fn join(
        &self,
        session_id: SessionId,
        user: UserId,
    ) -> Result<Session, CoordinatorError> {
        let player_id = self.allocate_player_id();
        let session = self
            .update(session_id, user, Action::Join { player_id })
            .await?;
        tracing::info!(%session_id, %user, players = session.players.len(), "player joined");
        Ok(session)
    }

    /// Removes `user` from a waiting session, disbanding it if `user`
    /// created it.
    pub async fn leave(
        &self,
        session_id: SessionId,
        user: UserId,
    ) -> Result<LeaveOutcome, CoordinatorError> {
        match self.dispatch(session_id, user, Action::Leave).await? {
            Committed::Updated(session) => {
                tracing::info!(%session_id, %user, players = session.players.len(), "player left");
                Ok(LeaveOutcome::Left(session))
            }
            Committed::Disbanded => Ok(LeaveOutcome::Disbanded),
        }
    }

    /// Starts round one. Creator only.
    pub async fn start(
        &self,
        session_id: SessionId,
        user: UserId,
    ) -> Result<Session, CoordinatorError> {
        let session = self.update(session_id, user, Action::Start).await?;
        tracing::info!(%session_id, players = session.players.len(), "game started");
        Ok(session)
    }

    /// Rolls the dice for the current turn. Creator only.
    pub async fn roll(
        &self,
        session_id: SessionId,
        user: UserId,
    ) -> Result<Session, CoordinatorError> {
        self.update(session_id, user, Action::Roll).await
    }

    /// Shuts `tiles` for `user` if they match the dice total.
    pub async fn flip(
        &self,
        session_id: SessionId,
        user: UserId,
        tiles: Vec<u8>,
    ) -> Result<Session, CoordinatorError> {
        self.update(session_id, user, Action::Flip { tiles }).await
    }

    /// Drops `user` out of the current round.
    pub async fn pass(
        &self,
        session_id: SessionId,
        user: UserId,
    ) -> Result<Session, CoordinatorError> {
        self.update(session_id, user, Action::Pass).await
    }

    /// Starts the next round after a scored round. Creator only.
    pub async fn advance_round(
        &self,
        session_id: SessionId,
        user: UserId,
    ) -> Result<Session, CoordinatorError> {
        self.update(session_id, user, Action::AdvanceRound).await
    }

    async fn update(
        &self,
        session_id: SessionId,
        user: UserId,
        action: Action,
    ) -> Result<Session, CoordinatorError> {
        match self.dispatch(session_id, user, action).await? {
            Committed::Updated(session) => Ok(session),
            // Only `Leave` disbands, and it doesn't come through here.
            Committed::Disbanded => Err(CoordinatorError::SessionNotFound(session_id)),
        }
    }

    /// Sends one action to the session's actor and drops the registry
    /// entry of an actor that stopped after committing it.
    async fn dispatch(
        &self,
        session_id: SessionId,
        user: UserId,
        action: Action,
    ) -> Result<Committed, CoordinatorError> {
        let handle = match self.handle(session_id).await {
            Ok(handle) => handle,
            Err(err) => {
                let rejection = self.reject_settled(session_id, user, action).await;
                return Err(rejection.unwrap_or(err));
            }
        };

        let committed = match handle.apply(user, action.clone()).await {
            Ok(committed) => committed,
            // The actor may have just retired a finished game.
            Err(err @ CoordinatorError::Unavailable(_)) => {
                let rejection = self.reject_settled(session_id, user, action).await;
                return Err(rejection.unwrap_or(err));
            }
            Err(err) => return Err(err),
        };

        match &committed {
            Committed::Disbanded => self.unregister(&handle).await,
            Committed::Updated(session) if session.status == SessionStatus::Finished => {
                self.unregister(&handle).await;
                tracing::info!(%session_id, "finished session retired");
            }
            Committed::Updated(_) => {}
        }
        Ok(committed)
    }

    /// The stored record of a finished session, if `session_id` is one.
    async fn settled(&self, session_id: SessionId) -> Result<Option<Session>, CoordinatorError> {
        let stored = self.store.load(session_id).await?;
        Ok(stored.filter(|session| session.status == SessionStatus::Finished))
    }

    /// Replays `action` against a finished session's stored record to
    /// produce the rejection its actor would have given. `None` if the
    /// session isn't a finished one.
    async fn reject_settled(
        &self,
        session_id: SessionId,
        user: UserId,
        action: Action,
    ) -> Option<CoordinatorError> {
        let mut session = match self.settled(session_id).await {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(err) => return Some(err),
        };
        let rejection = match session.apply(user, action, &mut ThreadDice, &self.config.rules) {
            Err(err) => err.into(),
            // Every action is refused once the game is over.
            Ok(_) => CoordinatorError::Unavailable(session_id),
        };
        Some(rejection)
    }

    /// Removes `handle` from the registry unless another actor has
    /// taken its place.
    async fn unregister(&self, handle: &SessionHandle) {
        let session_id = handle.session_id();
        let mut sessions = self.sessions.write().await;
        if sessions
            .get(&session_id)
            .is_some_and(|current| current.same_actor(handle))
        {
            sessions.remove(&session_id);
        }
    }

    /// The latest committed state of a session, including finished ones.
    pub async fn view(&self, session_id: SessionId) -> Result<Session, CoordinatorError> {
        match self.handle(session_id).await {
            Ok(handle) => Ok(handle.snapshot()),
            Err(err) => self.settled(session_id).await?.ok_or(err),
        }
    }

    /// Suggests tiles `user` could flip for the current roll.
    ///
    /// `Ok(None)` means there is nothing to suggest: the session is not
    /// in its flipping phase, the player is out or has already acted this
    /// turn, or no subset matches (passing is then the only move).
    pub async fn hint(
        &self,
        session_id: SessionId,
        user: UserId,
    ) -> Result<Option<Vec<u8>>, CoordinatorError> {
        let session = self.view(session_id).await?;
        let player = session
            .player_by_user(user)
            .ok_or(GameError::PlayerNotFound(user))?;
        if session.round_phase != RoundPhase::Flipping || player.is_out || player.has_submitted {
            return Ok(None);
        }
        Ok(find_move(&player.tiles_remaining, session.dice_total()))
    }

    /// Sessions still accepting players, newest first.
    pub async fn list_open(&self) -> Vec<SessionSummary> {
        self.summaries(|session| session.status.is_joinable()).await
    }

    /// Unfinished sessions `user` plays in, newest first.
    pub async fn list_for_user(&self, user: UserId) -> Vec<SessionSummary> {
        self.summaries(|session| {
            session.status.is_open() && session.player_by_user(user).is_some()
        })
        .await
    }

    async fn summaries(&self, keep: impl Fn(&Session) -> bool) -> Vec<SessionSummary> {
        let sessions = self.sessions.read().await;
        let mut found: Vec<SessionSummary> = sessions
            .values()
            .filter_map(|handle| {
                handle.peek(|session| keep(session).then(|| SessionSummary::of(session)))
            })
            .collect();
        found.sort_by(|a, b| b.session_id.cmp(&a.session_id));
        found
    }

    /// Stops a session's actor and waits until it has stopped. Its stored
    /// record is kept and it can be brought back with
    /// [`resume`](Self::resume).
    ///
    /// Actions already queued ahead of the close are committed; the ones
    /// behind it fail with [`CoordinatorError::Unavailable`]. The handle
    /// stays registered until the actor is gone, so a concurrent `resume`
    /// can't start a second actor on the same session.
    pub async fn close(&self, session_id: SessionId) -> Result<(), CoordinatorError> {
        let handle = self.handle(session_id).await?;
        handle.shutdown().await;
        self.unregister(&handle).await;
        tracing::info!(%session_id, "session closed");
        Ok(())
    }

    /// Restarts the actor for a stored session that isn't running, such
    /// as after a process restart or [`close`](Self::close).
    ///
    /// A finished session is returned as stored; it gets no actor.
    pub async fn resume(&self, session_id: SessionId) -> Result<Session, CoordinatorError> {
        if let Ok(handle) = self.handle(session_id).await {
            return Ok(handle.snapshot());
        }

        let session = self
            .store
            .load(session_id)
            .await?
            .ok_or(CoordinatorError::SessionNotFound(session_id))?;
        if session.status == SessionStatus::Finished {
            return Ok(session);
        }

        // Never hand out an id the stored session already uses.
        self.next_session_id
            .fetch_max(session_id.0 + 1, Ordering::Relaxed);
        if let Some(max_player) = session.players.iter().map(|p| p.id.0).max() {
            self.next_player_id
                .fetch_max(max_player + 1, Ordering::Relaxed);
        }

        let dice: Box<dyn DiceSource> = match self.config.dice_seed {
            Some(seed) => Box::new(SeededDice::new(session_seed(seed, session_id))),
            None => Box::new(ThreadDice),
        };

        let mut sessions = self.sessions.write().await;
        // Another caller may have resumed it while we were loading.
        if let Some(existing) = sessions.get(&session_id) {
            return Ok(existing.snapshot());
        }
        let handle = self.spawn(session.clone(), dice);
        sessions.insert(session_id, handle);
        tracing::info!(%session_id, status = %session.status, "session resumed");
        Ok(session)
    }

    /// Returns a clone of a session's handle.
    pub async fn handle(&self, session_id: SessionId) -> Result<SessionHandle, CoordinatorError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(CoordinatorError::SessionNotFound(session_id))
    }

    /// Number of running sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn allocate_session_id(&self) -> SessionId {
        SessionId(self.next_session_id.fetch_add(1, Ordering::Relaxed))
    }

    fn allocate_player_id(&self) -> PlayerId {
        PlayerId(self.next_player_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Spreads one configured seed into distinct per-session seeds.
fn session_seed(seed: u64, session_id: SessionId) -> u64 {
    seed.wrapping_add(session_id.0.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
