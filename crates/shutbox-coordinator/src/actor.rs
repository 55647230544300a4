//! Session actor: an isolated Tokio task that owns one session.
//!
//! The actor is the session's exclusive-access region. Commands arrive on
//! a bounded mpsc channel and are handled one at a time, so two players
//! acting in the same turn are applied in arrival order and the turn-end
//! check after each one sees the state the previous one committed.
//!
//! Reads don't go through the channel at all. After every commit the
//! actor publishes a clone of the session on a `watch` channel, and
//! [`SessionHandle::snapshot`] just clones the latest value.
//!
//! An actor stops after a shutdown request, after its session is
//! disbanded, and after the commit that finishes the game. Once it has
//! stopped its mailbox is closed, so nothing can be applied to the
//! session except by a fresh actor started from the stored record.

use std::sync::Arc;

use shutbox_game::{Action, DiceSource, Outcome, RulesConfig, Session, SessionStatus};
use shutbox_protocol::{SessionId, UserId};
use tokio::sync::{mpsc, oneshot, watch};

use crate::{CoordinatorError, SessionStore};

/// What the actor committed for an accepted action.
#[derive(Debug)]
pub(crate) enum Committed {
    /// The new state, already persisted and published.
    Updated(Session),
    /// The session was deleted; the actor has stopped.
    Disbanded,
}

/// Commands sent to a session actor through its channel.
///
/// `reply` is a oneshot "reply channel": the caller sends the command
/// and waits on it for the result.
pub(crate) enum Command {
    /// Apply one action on behalf of `actor`.
    Apply {
        actor: UserId,
        action: Action,
        reply: oneshot::Sender<Result<Committed, CoordinatorError>>,
    },

    /// Stop the actor, leaving the stored record in place. Commands
    /// queued behind this one are rejected, not applied.
    Shutdown,
}

/// Handle to a running session actor.
///
/// Cheap to clone: an mpsc sender plus a watch receiver. The coordinator
/// holds one per session and hands out clones so no registry lock is
/// held while waiting on an actor.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    sender: mpsc::Sender<Command>,
    snapshot: watch::Receiver<Session>,
}

impl SessionHandle {
    /// Returns the session's id.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Latest committed state, without waiting on the actor.
    pub fn snapshot(&self) -> Session {
        self.snapshot.borrow().clone()
    }

    /// Reads a field of the latest committed state without cloning it.
    pub(crate) fn peek<T>(&self, f: impl FnOnce(&Session) -> T) -> T {
        f(&self.snapshot.borrow())
    }

    pub(crate) async fn apply(
        &self,
        actor: UserId,
        action: Action,
    ) -> Result<Committed, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(Command::Apply {
                actor,
                action,
                reply: reply_tx,
            })
            .await
            .map_err(|_| CoordinatorError::Unavailable(self.session_id))?;
        reply_rx
            .await
            .map_err(|_| CoordinatorError::Unavailable(self.session_id))?
    }

    /// Asks the actor to stop and waits until it has.
    ///
    /// Commands queued ahead of the request are applied and persisted
    /// first. When this returns, the actor will never write to the store
    /// again.
    pub(crate) async fn shutdown(&self) {
        // A failed send means the actor is already stopping.
        let _ = self.sender.send(Command::Shutdown).await;
        self.sender.closed().await;
    }

    /// Whether both handles lead to the same actor.
    pub(crate) fn same_actor(&self, other: &SessionHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct SessionActor<S: SessionStore> {
    session: Session,
    dice: Box<dyn DiceSource>,
    rules: RulesConfig,
    store: Arc<S>,
    published: watch::Sender<Session>,
    receiver: mpsc::Receiver<Command>,
}

impl<S: SessionStore> SessionActor<S> {
    /// Runs the actor loop until shutdown, disbandment, or the end of the
    /// game.
    async fn run(mut self) {
        let session_id = self.session.id;
        tracing::debug!(%session_id, "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                Command::Apply {
                    actor,
                    action,
                    reply,
                } => {
                    let result = self.handle_apply(actor, action).await;
                    let done = match &result {
                        Ok(Committed::Disbanded) => true,
                        Ok(Committed::Updated(session)) => {
                            session.status == SessionStatus::Finished
                        }
                        Err(_) => false,
                    };
                    let _ = reply.send(result);
                    if done {
                        self.reject_queued();
                        break;
                    }
                }
                Command::Shutdown => {
                    tracing::info!(%session_id, "session actor shutting down");
                    self.reject_queued();
                    break;
                }
            }
        }

        tracing::debug!(%session_id, "session actor stopped");
    }

    /// Closes the mailbox and answers everything still in it with
    /// `Unavailable`.
    fn reject_queued(&mut self) {
        let session_id = self.session.id;
        self.receiver.close();
        while let Ok(cmd) = self.receiver.try_recv() {
            if let Command::Apply { reply, .. } = cmd {
                let _ = reply.send(Err(CoordinatorError::Unavailable(session_id)));
            }
        }
    }

    /// Applies the action to a copy, persists the copy, and only then
    /// makes it the current state. Any error leaves `self.session` as it
    /// was.
    async fn handle_apply(
        &mut self,
        actor: UserId,
        action: Action,
    ) -> Result<Committed, CoordinatorError> {
        let session_id = self.session.id;
        let name = action.name();

        let mut next = self.session.clone();
        let outcome = match next.apply(actor, action, self.dice.as_mut(), &self.rules) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::debug!(%session_id, %actor, action = name, error = %err, "action rejected");
                return Err(err.into());
            }
        };

        match outcome {
            Outcome::Disbanded => {
                self.store.delete(session_id).await?;
                tracing::info!(%session_id, %actor, "session disbanded");
                Ok(Committed::Disbanded)
            }
            Outcome::Updated => {
                self.store.save(&next).await?;
                self.session = next;
                self.published.send_replace(self.session.clone());
                tracing::debug!(
                    %session_id,
                    %actor,
                    action = name,
                    phase = %self.session.round_phase,
                    "action committed"
                );
                Ok(Committed::Updated(self.session.clone()))
            }
        }
    }
}

/// Spawns an actor for an already-persisted session and returns its handle.
///
/// `channel_size` bounds the mailbox; when it fills, senders wait.
pub(crate) fn spawn_session<S: SessionStore>(
    session: Session,
    dice: Box<dyn DiceSource>,
    rules: RulesConfig,
    store: Arc<S>,
    channel_size: usize,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let session_id = session.id;
    let (published, snapshot) = watch::channel(session.clone());

    let actor = SessionActor {
        session,
        dice,
        rules,
        store,
        published,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    SessionHandle {
        session_id,
        sender: tx,
        snapshot,
    }
}
