//! # Shutbox
//!
//! A turn-based multiplayer Shut the Box engine.
//!
//! Shutbox is split into layers, re-exported here so applications only
//! depend on this crate:
//!
//! ```text
//! coordinator  one actor per session, store, listings
//!      ↓
//! game         rules: lifecycle, rounds, scoring, move validation
//!      ↓
//! protocol     ids and the snapshot codec
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shutbox::prelude::*;
//!
//! # async fn run() -> Result<(), ShutboxError> {
//! shutbox::telemetry::init();
//!
//! let coordinator = SessionCoordinator::new(MemoryStore::new(), CoordinatorConfig::default());
//! let params = NewSession { name: "Friday".into(), max_tiles: 10, max_players: 4 };
//! let session = coordinator.create(UserId(1), params).await?;
//! coordinator.join(session.id, UserId(2)).await?;
//! coordinator.start(session.id, UserId(1)).await?;
//! coordinator.roll(session.id, UserId(1)).await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod telemetry;

pub use error::ShutboxError;

pub use shutbox_coordinator as coordinator;
pub use shutbox_game as game;
pub use shutbox_protocol as protocol;

/// Everything needed to run sessions, in one import.
pub mod prelude {
    pub use crate::ShutboxError;
    pub use shutbox_coordinator::{
        CoordinatorConfig, CoordinatorError, LeaveOutcome, MemoryStore, SessionCoordinator,
        SessionStore, SessionSummary, StoreError,
    };
    pub use shutbox_game::validator::find_move;
    pub use shutbox_game::{
        Action, DiceSource, ErrorKind, GameError, NewSession, PassPolicy, Player, RoundPhase,
        RulesConfig, SeededDice, Session, SessionStatus, ThreadDice, TieBreak,
    };
    pub use shutbox_protocol::{Codec, JsonCodec, PlayerId, ProtocolError, SessionId, UserId};
}
