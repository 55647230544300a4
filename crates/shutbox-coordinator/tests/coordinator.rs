//! Integration tests for the session coordinator: lifecycle through the
//! actor, atomic rejection, store failures, and concurrent actions.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use shutbox_coordinator::{
    CoordinatorConfig, CoordinatorError, LeaveOutcome, MemoryStore, SessionCoordinator,
    SessionStore, StoreError,
};
use shutbox_game::{
    DiceSource, ErrorKind, GameError, NewSession, RoundPhase, Session, SessionStatus,
};
use shutbox_protocol::{SessionId, UserId};

// =========================================================================
// Helpers
// =========================================================================

struct ScriptedDice(VecDeque<u8>);

impl DiceSource for ScriptedDice {
    fn roll_die(&mut self) -> u8 {
        self.0.pop_front().expect("scripted dice exhausted")
    }
}

fn scripted(faces: &[u8]) -> Box<dyn DiceSource> {
    Box::new(ScriptedDice(faces.iter().copied().collect()))
}

fn uid(id: u64) -> UserId {
    UserId(id)
}

fn params(max_tiles: u8, max_players: u8) -> NewSession {
    NewSession {
        name: "Thursday night".into(),
        max_tiles,
        max_players,
    }
}

fn coordinator() -> SessionCoordinator<MemoryStore> {
    SessionCoordinator::new(MemoryStore::new(), CoordinatorConfig::default())
}

fn game_error(err: CoordinatorError) -> GameError {
    match err {
        CoordinatorError::Game(e) => e,
        other => panic!("expected a game error, got {other:?}"),
    }
}

/// Store that can be switched into failing every write.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl SessionStore for FlakyStore {
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("write refused".into()));
        }
        self.inner.save(session).await
    }

    async fn load(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        self.inner.load(id).await
    }

    async fn delete(&self, id: SessionId) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("write refused".into()));
        }
        self.inner.delete(id).await
    }
}

/// Store whose saves take a while, so commands pile up in the mailbox.
#[derive(Default)]
struct SlowStore {
    inner: MemoryStore,
}

impl SessionStore for SlowStore {
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.inner.save(session).await
    }

    async fn load(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        self.inner.load(id).await
    }

    async fn delete(&self, id: SessionId) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }
}

// =========================================================================
// Creation and membership
// =========================================================================

#[tokio::test]
async fn test_create_registers_and_persists() {
    let coord = coordinator();
    let session = coord.create(uid(1), params(10, 4)).await.unwrap();

    assert_eq!(session.status, SessionStatus::Waiting);
    assert_eq!(session.players.len(), 1);
    assert_eq!(coord.session_count().await, 1);
    assert_eq!(coord.view(session.id).await.unwrap(), session);
    assert_eq!(coord.store().load(session.id).await.unwrap(), Some(session));
}

#[tokio::test]
async fn test_create_with_bad_params_registers_nothing() {
    let coord = coordinator();
    let err = coord.create(uid(1), params(11, 4)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(coord.session_count().await, 0);
    assert!(coord.store().is_empty().await);
}

#[tokio::test]
async fn test_create_returns_unique_ids() {
    let coord = coordinator();
    let a = coord.create(uid(1), params(10, 4)).await.unwrap();
    let b = coord.create(uid(1), params(12, 4)).await.unwrap();
    assert_ne!(a.id, b.id);
    assert_ne!(a.players[0].id, b.players[0].id);
}

#[tokio::test]
async fn test_join_and_full_session() {
    let coord = coordinator();
    let id = coord.create(uid(1), params(10, 2)).await.unwrap().id;

    let session = coord.join(id, uid(2)).await.unwrap();
    assert_eq!(session.players.len(), 2);

    let err = coord.join(id, uid(3)).await.unwrap_err();
    assert_eq!(game_error(err), GameError::SessionFull(2));
    assert_eq!(coord.view(id).await.unwrap().players.len(), 2);
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let coord = coordinator();
    let err = coord.join(SessionId(99), uid(1)).await.unwrap_err();
    assert!(matches!(err, CoordinatorError::SessionNotFound(SessionId(99))));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(coord.view(SessionId(99)).await.is_err());
}

#[tokio::test]
async fn test_non_creator_leave_removes_player() {
    let coord = coordinator();
    let id = coord.create(uid(1), params(10, 4)).await.unwrap().id;
    coord.join(id, uid(2)).await.unwrap();

    let outcome = coord.leave(id, uid(2)).await.unwrap();

    match outcome {
        LeaveOutcome::Left(session) => assert_eq!(session.players.len(), 1),
        other => panic!("expected Left, got {other:?}"),
    }
}

#[tokio::test]
async fn test_creator_leave_tears_down_session() {
    let coord = coordinator();
    let id = coord.create(uid(1), params(10, 4)).await.unwrap().id;
    coord.join(id, uid(2)).await.unwrap();

    assert_eq!(coord.leave(id, uid(1)).await.unwrap(), LeaveOutcome::Disbanded);

    assert_eq!(coord.session_count().await, 0);
    assert!(coord.store().load(id).await.unwrap().is_none());
    assert!(matches!(
        coord.join(id, uid(3)).await,
        Err(CoordinatorError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn test_leave_after_start_rejected() {
    let coord = coordinator();
    let id = coord.create(uid(1), params(10, 4)).await.unwrap().id;
    coord.join(id, uid(2)).await.unwrap();
    coord.start(id, uid(1)).await.unwrap();

    let err = coord.leave(id, uid(2)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(coord.view(id).await.unwrap().players.len(), 2);
}

// =========================================================================
// Playing through the coordinator
// =========================================================================

#[tokio::test]
async fn test_round_flow_through_actor() {
    let coord = coordinator();
    let id = coord
        .create_with_dice(uid(1), params(10, 2), scripted(&[3, 4, 6, 6]))
        .await
        .unwrap()
        .id;
    coord.join(id, uid(2)).await.unwrap();

    let err = coord.start(id, uid(2)).await.unwrap_err();
    assert_eq!(game_error(err), GameError::NotCreator(uid(2)));
    coord.start(id, uid(1)).await.unwrap();

    let session = coord.roll(id, uid(1)).await.unwrap();
    assert_eq!(session.round_phase, RoundPhase::Flipping);
    assert_eq!(session.dice_total(), 7);

    let session = coord.flip(id, uid(1), vec![3, 4]).await.unwrap();
    let expected: BTreeSet<u8> = [1, 2, 5, 6, 7, 8, 9, 10].into_iter().collect();
    assert_eq!(session.player_by_user(uid(1)).unwrap().tiles_remaining, expected);
    assert_eq!(session.round_phase, RoundPhase::Flipping);

    let session = coord.pass(id, uid(2)).await.unwrap();
    assert_eq!(session.round_phase, RoundPhase::Rolling);
    assert_eq!(session.player_by_user(uid(2)).unwrap().round_score, 55);

    // Second turn: only player 1 is still in, and 12 ends the turn for them.
    coord.roll(id, uid(1)).await.unwrap();
    let session = coord.flip(id, uid(1), vec![10, 2]).await.unwrap();
    assert_eq!(session.round_phase, RoundPhase::Rolling);

    // The stored record matches what callers see.
    let stored = coord.store().load(id).await.unwrap().unwrap();
    assert_eq!(stored, coord.view(id).await.unwrap());
}

#[tokio::test]
async fn test_rejected_flip_changes_nothing() {
    let coord = coordinator();
    let id = coord
        .create_with_dice(uid(1), params(10, 1), scripted(&[3, 4]))
        .await
        .unwrap()
        .id;
    coord.start(id, uid(1)).await.unwrap();
    coord.roll(id, uid(1)).await.unwrap();
    let before = coord.view(id).await.unwrap();

    let err = coord.flip(id, uid(1), vec![3, 5]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    assert_eq!(coord.view(id).await.unwrap(), before);
    assert_eq!(coord.store().load(id).await.unwrap(), Some(before));
}

#[tokio::test]
async fn test_game_runs_to_finish_and_advance_is_rejected() {
    let coord = coordinator();
    // Everyone passes every round: 55 points each round, so the second
    // round ends the game at 110.
    let id = coord
        .create_with_dice(uid(1), params(10, 2), scripted(&[1, 1, 1, 1]))
        .await
        .unwrap()
        .id;
    coord.join(id, uid(2)).await.unwrap();
    coord.start(id, uid(1)).await.unwrap();

    for round in 1..=2 {
        coord.roll(id, uid(1)).await.unwrap();
        coord.pass(id, uid(1)).await.unwrap();
        let session = coord.pass(id, uid(2)).await.unwrap();
        if round == 1 {
            assert_eq!(session.round_phase, RoundPhase::RoundEnd);
            coord.advance_round(id, uid(1)).await.unwrap();
        }
    }

    let session = coord.view(id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Finished);
    assert_eq!(session.round_phase, RoundPhase::Finished);
    // Tied on 110; the default tie-break picks the first to join.
    assert_eq!(session.winner().unwrap().user_id, uid(1));

    let err = coord.advance_round(id, uid(1)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_finished_session_retires_its_actor() {
    let coord = coordinator();
    let id = coord
        .create_with_dice(uid(1), params(10, 1), scripted(&[1, 1, 1, 1]))
        .await
        .unwrap()
        .id;
    coord.start(id, uid(1)).await.unwrap();
    coord.roll(id, uid(1)).await.unwrap();
    coord.pass(id, uid(1)).await.unwrap();
    coord.advance_round(id, uid(1)).await.unwrap();
    coord.roll(id, uid(1)).await.unwrap();
    let finished = coord.pass(id, uid(1)).await.unwrap();
    assert_eq!(finished.status, SessionStatus::Finished);

    assert_eq!(coord.session_count().await, 0);
    assert!(coord.handle(id).await.is_err());

    // Still readable, and still refused with the game's own errors.
    assert_eq!(coord.view(id).await.unwrap(), finished);
    assert_eq!(coord.hint(id, uid(1)).await.unwrap(), None);
    let err = coord.roll(id, uid(1)).await.unwrap_err();
    assert!(matches!(game_error(err), GameError::WrongPhase { .. }));
    let err = coord.join(id, uid(2)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(matches!(
        coord.close(id).await,
        Err(CoordinatorError::SessionNotFound(_))
    ));

    // Resuming hands back the record without restarting anything.
    assert_eq!(coord.resume(id).await.unwrap(), finished);
    assert_eq!(coord.session_count().await, 0);
}

#[tokio::test]
async fn test_hint_suggests_legal_tiles() {
    let coord = coordinator();
    let id = coord
        .create_with_dice(uid(1), params(10, 1), scripted(&[5, 6]))
        .await
        .unwrap()
        .id;
    assert_eq!(coord.hint(id, uid(1)).await.unwrap(), None);

    coord.start(id, uid(1)).await.unwrap();
    coord.roll(id, uid(1)).await.unwrap();

    let hint = coord.hint(id, uid(1)).await.unwrap().unwrap();
    assert_eq!(hint.iter().map(|&t| u32::from(t)).sum::<u32>(), 11);
    coord.flip(id, uid(1), hint).await.unwrap();

    let err = coord.hint(id, uid(9)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_no_hint_after_acting_this_turn() {
    let coord = coordinator();
    let id = coord
        .create_with_dice(uid(1), params(10, 2), scripted(&[2, 2]))
        .await
        .unwrap()
        .id;
    coord.join(id, uid(2)).await.unwrap();
    coord.start(id, uid(1)).await.unwrap();
    coord.roll(id, uid(1)).await.unwrap();

    coord.flip(id, uid(1), vec![4]).await.unwrap();

    assert_eq!(coord.hint(id, uid(1)).await.unwrap(), None);
    assert!(coord.hint(id, uid(2)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_seeded_config_is_reproducible() {
    let config = CoordinatorConfig {
        dice_seed: Some(2024),
        ..CoordinatorConfig::default()
    };
    let mut rolls = Vec::new();
    for _ in 0..2 {
        let coord = SessionCoordinator::new(MemoryStore::new(), config.clone());
        let id = coord.create(uid(1), params(12, 1)).await.unwrap().id;
        coord.start(id, uid(1)).await.unwrap();
        let session = coord.roll(id, uid(1)).await.unwrap();
        assert!((1..=6).contains(&session.dice1) && (1..=6).contains(&session.dice2));
        rolls.push((session.dice1, session.dice2));
    }
    assert_eq!(rolls[0], rolls[1]);
}

// =========================================================================
// Listings, close and resume
// =========================================================================

#[tokio::test]
async fn test_list_open_and_list_for_user() {
    let coord = coordinator();
    let a = coord.create(uid(1), params(10, 4)).await.unwrap().id;
    let b = coord.create(uid(2), params(10, 4)).await.unwrap().id;
    coord.join(b, uid(1)).await.unwrap();
    let c = coord.create(uid(3), params(10, 4)).await.unwrap().id;
    coord.start(c, uid(3)).await.unwrap();

    let open: Vec<SessionId> = coord.list_open().await.iter().map(|s| s.session_id).collect();
    assert_eq!(open, vec![b, a]);

    let mine: Vec<SessionId> = coord
        .list_for_user(uid(1))
        .await
        .iter()
        .map(|s| s.session_id)
        .collect();
    assert_eq!(mine, vec![b, a]);

    let theirs = coord.list_for_user(uid(3)).await;
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].status, SessionStatus::Playing);
}

#[tokio::test]
async fn test_close_then_resume_restores_state() {
    let coord = coordinator();
    let id = coord.create(uid(1), params(12, 3)).await.unwrap().id;
    coord.join(id, uid(2)).await.unwrap();
    let before = coord.view(id).await.unwrap();

    coord.close(id).await.unwrap();
    assert!(coord.view(id).await.is_err());
    assert!(matches!(
        coord.close(id).await,
        Err(CoordinatorError::SessionNotFound(_))
    ));

    let resumed = coord.resume(id).await.unwrap();
    assert_eq!(resumed, before);

    // New ids never collide with the resumed session's players.
    let session = coord.join(id, uid(3)).await.unwrap();
    let ids: BTreeSet<_> = session.players.iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_close_keeps_every_acknowledged_join() {
    let coord = Arc::new(SessionCoordinator::new(
        SlowStore::default(),
        CoordinatorConfig::default(),
    ));
    let id = coord.create(uid(1), params(10, 8)).await.unwrap().id;

    let mut joins = Vec::new();
    for user in 2..=4 {
        let coord = Arc::clone(&coord);
        joins.push(tokio::spawn(async move { coord.join(id, uid(user)).await }));
    }
    coord.close(id).await.unwrap();
    coord.resume(id).await.unwrap();

    let mut accepted = 0;
    for join in joins {
        match join.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(err) => assert!(
                matches!(err, CoordinatorError::Unavailable(_)),
                "unexpected error: {err:?}"
            ),
        }
    }

    let session = coord.join(id, uid(5)).await.unwrap();
    assert_eq!(session.players.len(), 2 + accepted);
    assert_eq!(coord.view(id).await.unwrap(), session);
    assert_eq!(coord.store().load(id).await.unwrap(), Some(session));
}

#[tokio::test]
async fn test_resume_unknown_session_is_not_found() {
    let coord = coordinator();
    assert!(matches!(
        coord.resume(SessionId(42)).await,
        Err(CoordinatorError::SessionNotFound(SessionId(42)))
    ));
}

// =========================================================================
// Store failures
// =========================================================================

#[tokio::test]
async fn test_store_failure_rolls_back_transition() {
    let coord = SessionCoordinator::new(FlakyStore::default(), CoordinatorConfig::default());
    let id = coord.create(uid(1), params(10, 4)).await.unwrap().id;
    let before = coord.view(id).await.unwrap();

    coord.store().failing.store(true, Ordering::SeqCst);
    let err = coord.join(id, uid(2)).await.unwrap_err();
    assert!(matches!(err, CoordinatorError::Store(_)));
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(coord.view(id).await.unwrap(), before);

    // A failed teardown keeps the session alive.
    assert!(coord.leave(id, uid(1)).await.is_err());
    assert_eq!(coord.session_count().await, 1);

    coord.store().failing.store(false, Ordering::SeqCst);
    let session = coord.join(id, uid(2)).await.unwrap();
    assert_eq!(session.players.len(), 2);
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_never_overfill() {
    let coord = Arc::new(coordinator());
    let id = coord.create(uid(1), params(10, 4)).await.unwrap().id;

    let mut tasks = Vec::new();
    for user in 2..=11 {
        let coord = Arc::clone(&coord);
        tasks.push(tokio::spawn(async move { coord.join(id, uid(user)).await }));
    }

    let mut accepted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(err) => assert_eq!(game_error(err), GameError::SessionFull(4)),
        }
    }

    assert_eq!(accepted, 3);
    assert_eq!(coord.view(id).await.unwrap().players.len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_flips_in_one_turn_all_accepted() {
    let coord = Arc::new(coordinator());
    let id = coord
        .create_with_dice(uid(1), params(12, 8), scripted(&[6, 6]))
        .await
        .unwrap()
        .id;
    for user in 2..=8 {
        coord.join(id, uid(user)).await.unwrap();
    }
    coord.start(id, uid(1)).await.unwrap();
    coord.roll(id, uid(1)).await.unwrap();

    let mut tasks = Vec::new();
    for user in 1..=8 {
        let coord = Arc::clone(&coord);
        tasks.push(tokio::spawn(async move {
            coord.flip(id, uid(user), vec![12]).await
        }));
    }

    let mut rolling_results = 0;
    for task in tasks {
        let session = task.await.unwrap().unwrap();
        if session.round_phase == RoundPhase::Rolling {
            rolling_results += 1;
        }
    }

    // Exactly the last flip to commit closes the turn.
    assert_eq!(rolling_results, 1);
    let session = coord.view(id).await.unwrap();
    assert_eq!(session.round_phase, RoundPhase::Rolling);
    assert!(session.players.iter().all(|p| !p.tiles_remaining.contains(&12)));
    assert!(session.players.iter().all(|p| !p.has_submitted));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_duplicate_concurrent_submissions_accept_one() {
    let coord = Arc::new(coordinator());
    let id = coord
        .create_with_dice(uid(1), params(10, 2), scripted(&[2, 3]))
        .await
        .unwrap()
        .id;
    coord.join(id, uid(2)).await.unwrap();
    coord.start(id, uid(1)).await.unwrap();
    coord.roll(id, uid(1)).await.unwrap();

    let first = {
        let coord = Arc::clone(&coord);
        tokio::spawn(async move { coord.flip(id, uid(2), vec![5]).await })
    };
    let second = {
        let coord = Arc::clone(&coord);
        tokio::spawn(async move { coord.flip(id, uid(2), vec![4, 1]).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let rejected = results.into_iter().find_map(Result::err).unwrap();
    assert_eq!(game_error(rejected), GameError::AlreadySubmitted(uid(2)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_views_run_alongside_writes() {
    let coord = Arc::new(coordinator());
    let id = coord.create(uid(1), params(10, 12)).await.unwrap().id;

    let writer = {
        let coord = Arc::clone(&coord);
        tokio::spawn(async move {
            for user in 2..=12 {
                coord.join(id, uid(user)).await.unwrap();
            }
        })
    };

    let mut last_seen = 1;
    while !writer.is_finished() {
        let count = coord.view(id).await.unwrap().players.len();
        assert!(count >= last_seen, "snapshots never go backwards");
        last_seen = count;
        tokio::task::yield_now().await;
    }
    writer.await.unwrap();
    assert_eq!(coord.view(id).await.unwrap().players.len(), 12);
}
